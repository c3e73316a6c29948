//! Cookie lab: runs the crumbcheck server for manual stale-cookie testing.
//!
//! Point a browser at the server, call `/set-cookie`, then open a
//! WebSocket to the same origin. A `1008` close with "Session already
//! used" means the browser sent a cookie it should have dropped.

use clap::{Parser, ValueEnum};
use crumbcheck::prelude::*;
use tracing_subscriber::EnvFilter;

/// Stale session cookie diagnostic server
#[derive(Parser, Debug)]
#[command(name = "cookie-lab")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Interface to listen on
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = 3000)]
    port: u16,

    /// Deployment environment; `production` only changes startup guidance
    #[arg(long, env = "NODE_ENV", default_value = "development")]
    environment: String,

    /// Log output format
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Pretty,
    Json,
}

impl Args {
    fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);

    match format {
        LogFormat::Pretty => subscriber.init(),
        LogFormat::Json => subscriber.json().init(),
    }
}

#[tokio::main]
async fn main() -> Result<(), CrumbError> {
    let args = Args::parse();
    init_tracing(args.log_format);

    let server = CrumbServer::builder().bind(&args.bind_addr()).build().await?;
    let addr = server.local_addr()?;

    tracing::info!(%addr, environment = %args.environment, "cookie lab listening");
    tracing::info!("1. GET /set-cookie to receive a {SESSION_COOKIE_NAME} cookie");
    tracing::info!("2. GET /clear-cookie to expire it with Max-Age=0");
    tracing::info!("3. Open a WebSocket to / and watch for a 1008 close");
    tracing::info!("GET /status shows the received cookie and active sessions");
    if args.is_production() {
        tracing::info!(
            "production: serve behind TLS and connect with wss:// so cookies match the page origin"
        );
    } else {
        tracing::info!(url = %format!("ws://localhost:{}", addr.port()), "connect WebSocket clients to");
    }

    tokio::select! {
        result = server.run() => result,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutting down");
            Ok(())
        }
    }
}
