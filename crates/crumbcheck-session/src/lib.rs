//! Session lifecycle for crumbcheck.
//!
//! 1. **Store** — [`SessionStore`] decides validity: active iff present.
//! 2. **Cookies** — parsing `Cookie`, rendering `Set-Cookie` ([`cookie`]).
//! 3. **Handshake** — [`validate_handshake`] classifies a presented
//!    credential as absent, stale, or unknown.
//! 4. **Channel** — [`SessionChannel`] handles `set_cookie` /
//!    `clear_cookie` on an open connection.
//!
//! ```text
//! Server (above)   ← HTTP routes and connection handler call in here
//!     ↕
//! Session (this crate)
//!     ↕
//! Protocol (below) ← SessionId, ClientMessage, ServerMessage, CloseReason
//! ```

pub mod cookie;

mod channel;
mod error;
mod handshake;
mod session;
mod store;

pub use channel::SessionChannel;
pub use error::SessionError;
pub use handshake::validate_handshake;
pub use session::{ChannelState, Session};
pub use store::{SESSION_ID_PREFIX, SessionStore, generate_session_id};
