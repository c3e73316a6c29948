//! The session store: the single source of truth for credential validity.
//!
//! # Concurrency note
//!
//! `SessionStore` is a plain `HashMap` and not thread-safe by itself. The
//! server keeps exactly one instance behind a single mutex and runs every
//! check-then-mutate pair (handshake validation, clear) under one lock
//! acquisition, so two attempts can never interleave on the same
//! identifier.

use std::collections::HashMap;

use crumbcheck_protocol::SessionId;
use rand::Rng;

use crate::Session;

/// Prefix shared by every generated identifier.
pub const SESSION_ID_PREFIX: &str = "session-";

/// Length of the random part of an identifier.
const SESSION_ID_SUFFIX_LEN: usize = 9;

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// In-memory registry of active sessions.
///
/// An identifier is active iff it is a key here. A missing identifier was
/// either never issued or already invalidated; the store deliberately
/// keeps no tombstones, so the two cases look the same.
///
/// ```text
/// issue()/create() ──→ [active] ──invalidate()──→ (gone)
/// ```
///
/// Sessions accumulate until invalidated: there is no capacity bound and
/// no TTL.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: HashMap<SessionId, Session>,
}

impl SessionStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a new active session stamped with the current time.
    ///
    /// Identifiers come from [`generate_session_id`], never from callers,
    /// so an existing entry with the same key is simply overwritten.
    pub fn create(&mut self, id: SessionId) {
        tracing::info!(session_id = %id, "session created");
        self.sessions.insert(id.clone(), Session::new(id));
    }

    /// Generates a fresh identifier, registers it, and returns it.
    pub fn issue(&mut self) -> SessionId {
        let id = generate_session_id();
        self.create(id.clone());
        id
    }

    /// Returns `true` if the identifier is currently active.
    pub fn exists(&self, id: &SessionId) -> bool {
        self.sessions.contains_key(id)
    }

    /// Removes the session if present. Invalidating an absent identifier
    /// is a no-op.
    ///
    /// Returns whether a session was actually removed.
    pub fn invalidate(&mut self, id: &SessionId) -> bool {
        let removed = self.sessions.remove(id).is_some();
        if removed {
            tracing::info!(session_id = %id, "session invalidated");
        } else {
            tracing::debug!(session_id = %id, "invalidate: no such session");
        }
        removed
    }

    /// Snapshot of active identifiers, oldest first.
    pub fn list_active(&self) -> Vec<SessionId> {
        let mut sessions: Vec<&Session> = self.sessions.values().collect();
        sessions.sort_by(|a, b| {
            a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id))
        });
        sessions.into_iter().map(|s| s.id.clone()).collect()
    }

    /// Looks up a session record.
    pub fn get(&self, id: &SessionId) -> Option<&Session> {
        self.sessions.get(id)
    }

    /// Returns the number of active sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Returns `true` if there are no active sessions.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

/// Generates an identifier like `session-k3j9x0q2z`: the fixed prefix plus
/// nine base-36 characters (about 46 bits from the thread-local RNG).
///
/// Not a secret. The only requirement is negligible collision probability
/// over the life of the process.
pub fn generate_session_id() -> SessionId {
    let mut rng = rand::rng();
    let suffix: String = (0..SESSION_ID_SUFFIX_LEN)
        .map(|_| BASE36[rng.random_range(0..BASE36.len())] as char)
        .collect();
    SessionId::new(format!("{SESSION_ID_PREFIX}{suffix}"))
}

// =========================================================================
// Tests
// =========================================================================
