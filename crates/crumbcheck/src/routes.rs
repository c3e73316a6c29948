//! HTTP routes: credential issuance, invalidation, status, and the
//! WebSocket upgrade entry point.
//!
//! Every route is total over well-formed requests. The only error-shaped
//! responses are `404` for unrouted paths and `400` for upgrade requests
//! that cannot be honoured.

use std::sync::Arc;

use crumbcheck_protocol::{
    ClearResponse, Codec, ErrorBody, IssueResponse, StatusReport,
};
use crumbcheck_session::cookie::{SetCookie, cookie_domain, session_cookie};
use crumbcheck_transport::{is_upgrade_request, upgrade};
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{
    CACHE_CONTROL, CONTENT_TYPE, COOKIE, HOST, HeaderMap, SET_COOKIE,
};
use hyper::{Method, Request, Response, StatusCode};
use serde::Serialize;

use crate::handler::handle_connection;
use crate::server::ServerState;

pub(crate) type HttpResponse = Response<Full<Bytes>>;

/// Dispatches one HTTP request.
pub(crate) async fn route<B, C>(
    req: Request<B>,
    state: Arc<ServerState<C>>,
) -> HttpResponse
where
    B: Send + 'static,
    C: Codec,
{
    if is_upgrade_request(&req) {
        return websocket_upgrade(req, state);
    }

    match (req.method(), req.uri().path()) {
        (&Method::GET, "/set-cookie") => {
            issue_cookie(req.headers(), &state).await
        }
        (&Method::GET, "/clear-cookie") => {
            clear_cookie(req.headers(), &state).await
        }
        (&Method::GET, "/status") => status(req.headers(), &state).await,
        (method, path) => {
            tracing::debug!(%method, path, "no route");
            json_response(
                &state.codec,
                StatusCode::NOT_FOUND,
                &ErrorBody {
                    error: "not found".into(),
                    path: path.to_string(),
                },
                None,
            )
        }
    }
}

/// `GET /set-cookie`: creates a session and hands its id to the client.
async fn issue_cookie<C: Codec>(
    headers: &HeaderMap,
    state: &ServerState<C>,
) -> HttpResponse {
    let session_id = state.sessions.lock().await.issue();
    let domain = cookie_domain(header_str(headers, HOST));
    tracing::info!(%session_id, ?domain, "setting cookie via HTTP");

    let cookie = SetCookie::issue(&session_id, domain);
    json_response(
        &state.codec,
        StatusCode::OK,
        &IssueResponse::new(session_id),
        Some(&cookie),
    )
}

/// `GET /clear-cookie`: always tells the client to drop the cookie, and
/// invalidates the session it presented, if any.
async fn clear_cookie<C: Codec>(
    headers: &HeaderMap,
    state: &ServerState<C>,
) -> HttpResponse {
    let domain = cookie_domain(header_str(headers, HOST));
    let presented = session_cookie(cookie_header(headers).as_deref());
    tracing::info!(?presented, "clearing cookie via HTTP with Max-Age=0");

    if let Some(session_id) = &presented {
        state.sessions.lock().await.invalidate(session_id);
    }

    json_response(
        &state.codec,
        StatusCode::OK,
        &ClearResponse::default(),
        Some(&SetCookie::expire(domain)),
    )
}

/// `GET /status`: read-only snapshot for diagnosis.
async fn status<C: Codec>(
    headers: &HeaderMap,
    state: &ServerState<C>,
) -> HttpResponse {
    let raw = cookie_header(headers);
    let report = StatusReport {
        received_cookie: session_cookie(raw.as_deref()),
        active_sessions: state.sessions.lock().await.list_active(),
        all_cookies: raw.unwrap_or_default(),
    };
    json_response(&state.codec, StatusCode::OK, &report, None)
}

/// Answers the upgrade and validates the cookie on the upgraded stream.
///
/// The cookie header is captured here because the upgraded stream no
/// longer carries request metadata.
fn websocket_upgrade<B, C>(
    mut req: Request<B>,
    state: Arc<ServerState<C>>,
) -> HttpResponse
where
    B: Send + 'static,
    C: Codec,
{
    let cookies = cookie_header(req.headers());
    let path = req.uri().path().to_string();

    match upgrade(&mut req) {
        Ok((response, pending)) => {
            tokio::spawn(async move {
                let conn = match pending.finish().await {
                    Ok(conn) => conn,
                    Err(e) => {
                        tracing::debug!(error = %e, "upgrade never completed");
                        return;
                    }
                };
                if let Err(e) = handle_connection(conn, cookies, state).await {
                    tracing::debug!(error = %e, "connection ended with error");
                }
            });
            response
        }
        Err(e) => {
            tracing::debug!(error = %e, path = %path, "rejecting malformed upgrade");
            json_response(
                &state.codec,
                StatusCode::BAD_REQUEST,
                &ErrorBody {
                    error: e.to_string(),
                    path,
                },
                None,
            )
        }
    }
}

fn header_str(headers: &HeaderMap, name: hyper::header::HeaderName) -> Option<&str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// The request's cookies as one string. Multiple `Cookie` headers are
/// joined with `; `.
fn cookie_header(headers: &HeaderMap) -> Option<String> {
    let parts: Vec<&str> = headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .collect();
    (!parts.is_empty()).then(|| parts.join("; "))
}

fn json_response<C: Codec, T: Serialize>(
    codec: &C,
    status: StatusCode,
    body: &T,
    set_cookie: Option<&SetCookie>,
) -> HttpResponse {
    let text = match codec.encode(body) {
        Ok(text) => text,
        Err(e) => {
            tracing::error!(error = %e, "failed to encode response body");
            return internal_error();
        }
    };

    let mut builder = Response::builder()
        .status(status)
        .header(CONTENT_TYPE, "application/json");
    if let Some(cookie) = set_cookie {
        builder = builder
            .header(SET_COOKIE, cookie.to_string())
            .header(CACHE_CONTROL, "no-store");
    }

    builder.body(Full::new(Bytes::from(text))).unwrap_or_else(|e| {
        tracing::error!(error = %e, "failed to build response");
        internal_error()
    })
}

fn internal_error() -> HttpResponse {
    let mut response =
        Response::new(Full::new(Bytes::from_static(b"internal server error")));
    *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    response
}
