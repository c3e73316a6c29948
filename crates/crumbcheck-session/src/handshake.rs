//! Credential validation at connection-establishment time.
//!
//! ```text
//! presented credential?
//!   ├─ none ──────────────→ issue a fresh session      → Ok(id)      [OPEN]
//!   ├─ some, active ──────→ StaleCredential(id)        → close 1008
//!   └─ some, not active ──→ UnknownCredential(id)      → close 1008
//! ```
//!
//! Presenting an active identifier is always refused. Identifiers are
//! single-use per handshake: a client that still sends one after a clear
//! directive is exhibiting the defect under diagnosis.

use crumbcheck_protocol::SessionId;

use crate::{SessionError, SessionStore};

/// Classifies the credential presented during a handshake and applies
/// the resulting transition to the store.
///
/// The caller must hold the store's lock for the whole call, so the
/// existence check and the create cannot interleave with another attempt.
///
/// # Errors
/// - [`SessionError::StaleCredential`] — the identifier is still active.
///   The store is left untouched; the existing session was not caused by
///   this attempt.
/// - [`SessionError::UnknownCredential`] — the identifier was never issued
///   or has been invalidated.
pub fn validate_handshake(
    store: &mut SessionStore,
    presented: Option<&SessionId>,
) -> Result<SessionId, SessionError> {
    match presented {
        None => {
            let id = store.issue();
            tracing::info!(session_id = %id, "clean handshake, no cookie presented");
            Ok(id)
        }
        Some(id) => match store.get(id) {
            Some(session) => {
                let age_secs = session
                    .created_at
                    .elapsed()
                    .map(|age| age.as_secs())
                    .unwrap_or_default();
                tracing::info!(
                    session_id = %id,
                    age_secs,
                    "stale session cookie presented; it should have been cleared"
                );
                Err(SessionError::StaleCredential(id.clone()))
            }
            None => {
                tracing::warn!(session_id = %id, "unknown session cookie presented");
                Err(SessionError::UnknownCredential(id.clone()))
            }
        },
    }
}
