//! # Crumbcheck
//!
//! Diagnostic server for stale session cookies on WebSocket handshakes.
//!
//! A client obtains a `test-session-id` cookie over HTTP, may be told to
//! clear it, and then opens a WebSocket on the same origin. The handshake
//! tells the three outcomes apart:
//!
//! - no cookie → a fresh session, `connected`
//! - a cookie naming a still-active session → close `1008`, stale
//! - a cookie naming anything else → close `1008`, unknown
//!
//! A stale close means the browser kept sending a cookie it was told to
//! drop.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use crumbcheck::prelude::*;
//!
//! # async fn start() -> Result<(), CrumbError> {
//! let server = CrumbServer::builder().bind("0.0.0.0:3000").build().await?;
//! server.run().await
//! # }
//! ```

#![allow(async_fn_in_trait)]

mod error;
mod handler;
mod routes;
mod server;

pub use error::CrumbError;
pub use server::{CrumbServer, CrumbServerBuilder, DEFAULT_BIND_ADDR};

pub use crumbcheck_protocol as protocol;
pub use crumbcheck_session as session;
pub use crumbcheck_transport as transport;

/// Convenience re-exports for embedding the server.
pub mod prelude {
    pub use crate::{CrumbError, CrumbServer, CrumbServerBuilder, DEFAULT_BIND_ADDR};
    pub use crumbcheck_protocol::{
        ClientMessage, CloseReason, JsonCodec, ServerMessage, SessionId,
    };
    pub use crumbcheck_session::cookie::SESSION_COOKIE_NAME;
    pub use crumbcheck_session::{SessionError, SessionStore};
}
