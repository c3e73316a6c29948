//! `CrumbServer` builder and accept loop.
//!
//! Ties the layers together: every TCP stream is served by hyper with
//! upgrades enabled, plain requests go to the cookie routes, and upgraded
//! streams go to the connection handler.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use crumbcheck_protocol::{Codec, JsonCodec};
use crumbcheck_session::SessionStore;
use crumbcheck_transport::{HttpTransport, Transport};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::Request;
use hyper_util::rt::TokioIo;
use tokio::sync::Mutex;

use crate::CrumbError;
use crate::routes::route;

/// Default listen address; the demo binary overrides it from `PORT`.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

/// Shared server state passed to every request and connection.
///
/// The one `SessionStore` lives behind one mutex; nothing else holds
/// session state.
pub(crate) struct ServerState<C: Codec> {
    pub(crate) sessions: Mutex<SessionStore>,
    pub(crate) codec: C,
}

impl<C: Codec> ServerState<C> {
    pub(crate) fn new(codec: C) -> Self {
        Self {
            sessions: Mutex::new(SessionStore::new()),
            codec,
        }
    }
}

/// Builder for configuring and starting a crumbcheck server.
///
/// # Example
///
/// ```rust,no_run
/// use crumbcheck::prelude::*;
///
/// # async fn start() -> Result<(), CrumbError> {
/// let server = CrumbServer::builder().bind("0.0.0.0:3000").build().await?;
/// server.run().await
/// # }
/// ```
pub struct CrumbServerBuilder {
    bind_addr: String,
}

impl CrumbServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Binds the listener. Uses `JsonCodec` for every payload.
    pub async fn build(self) -> Result<CrumbServer<JsonCodec>, CrumbError> {
        let transport = HttpTransport::bind(&self.bind_addr).await?;
        let state = Arc::new(ServerState::new(JsonCodec));
        Ok(CrumbServer { transport, state })
    }
}

impl Default for CrumbServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound crumbcheck server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct CrumbServer<C: Codec> {
    transport: HttpTransport,
    state: Arc<ServerState<C>>,
}

impl CrumbServer<JsonCodec> {
    /// Creates a new builder.
    pub fn builder() -> CrumbServerBuilder {
        CrumbServerBuilder::new()
    }
}

impl<C: Codec> CrumbServer<C> {
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, CrumbError> {
        Ok(self.transport.local_addr()?)
    }

    /// Runs the accept loop until the process is terminated.
    ///
    /// Each TCP stream gets its own task; a failing stream is logged and
    /// never takes the loop down.
    pub async fn run(mut self) -> Result<(), CrumbError> {
        tracing::info!("crumbcheck server running");

        loop {
            match self.transport.accept().await {
                Ok((stream, peer)) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = serve_stream(stream, state).await {
                            tracing::debug!(
                                %peer,
                                error = %e,
                                "HTTP connection ended with error"
                            );
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}

/// Serves HTTP/1.1 on one stream, allowing it to be upgraded.
async fn serve_stream<C: Codec>(
    stream: tokio::net::TcpStream,
    state: Arc<ServerState<C>>,
) -> Result<(), CrumbError> {
    let service = service_fn(move |req: Request<Incoming>| {
        let state = Arc::clone(&state);
        async move { Ok::<_, Infallible>(route(req, state).await) }
    });

    http1::Builder::new()
        .serve_connection(TokioIo::new(stream), service)
        .with_upgrades()
        .await?;
    Ok(())
}
