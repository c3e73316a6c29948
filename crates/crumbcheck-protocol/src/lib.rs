//! Wire protocol for crumbcheck.
//!
//! - **Types** ([`SessionId`], [`ClientMessage`], [`ServerMessage`],
//!   [`CloseReason`]) — what travels over the WebSocket.
//! - **HTTP bodies** ([`IssueResponse`], [`ClearResponse`],
//!   [`StatusReport`]) — what the cookie endpoints return.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how those are converted
//!   to and from text.
//!
//! ```text
//! Transport (frames) → Protocol (typed messages) → Session (store)
//! ```

mod codec;
mod error;
mod http;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use http::{ClearResponse, ErrorBody, IssueResponse, StatusReport};
pub use types::{
    ClientMessage, CloseReason, POLICY_VIOLATION, ServerMessage, SessionId,
};
