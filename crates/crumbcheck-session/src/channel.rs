//! Per-connection message handling after a successful handshake.

use crumbcheck_protocol::{ClientMessage, ServerMessage, SessionId};

use crate::{ChannelState, SessionStore};

/// The session bound to one open connection.
///
/// Each incoming [`ClientMessage`] is a transition plus exactly one reply.
/// Frames that fail to decode never reach this type; the connection
/// handler drops them.
#[derive(Debug, Clone)]
pub struct SessionChannel {
    session_id: SessionId,
    state: ChannelState,
}

impl SessionChannel {
    /// Binds a channel to the session its handshake just created.
    pub fn open(session_id: SessionId) -> Self {
        Self {
            session_id,
            state: ChannelState::Open,
        }
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn state(&self) -> ChannelState {
        self.state
    }

    /// Applies a client message and returns the reply to send.
    ///
    /// - `SetCookie` only acknowledges; the session already exists.
    /// - `ClearCookie` invalidates the session. Repeating it is harmless
    ///   and is acknowledged again.
    pub fn apply(
        &mut self,
        store: &mut SessionStore,
        msg: ClientMessage,
    ) -> ServerMessage {
        match msg {
            ClientMessage::SetCookie => {
                tracing::info!(
                    session_id = %self.session_id,
                    "would set cookie test-session-id"
                );
                ServerMessage::cookie_set(self.session_id.clone())
            }
            ClientMessage::ClearCookie => {
                tracing::info!(
                    session_id = %self.session_id,
                    "would clear cookie with Max-Age=0"
                );
                store.invalidate(&self.session_id);
                self.state = ChannelState::Cleared;
                ServerMessage::cookie_cleared()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate_handshake;

    fn open_channel(store: &mut SessionStore) -> SessionChannel {
        let id = validate_handshake(store, None).expect("clean handshake");
        SessionChannel::open(id)
    }

    #[test]
    fn test_apply_set_cookie_echoes_id_without_mutation() {
        let mut store = SessionStore::new();
        let mut channel = open_channel(&mut store);
        let before = store.list_active();

        let reply = channel.apply(&mut store, ClientMessage::SetCookie);

        assert_eq!(reply, ServerMessage::cookie_set(channel.session_id().clone()));
        assert_eq!(store.list_active(), before);
        assert_eq!(channel.state(), ChannelState::Open);
    }

    #[test]
    fn test_apply_clear_cookie_invalidates_session() {
        let mut store = SessionStore::new();
        let mut channel = open_channel(&mut store);

        let reply = channel.apply(&mut store, ClientMessage::ClearCookie);

        assert_eq!(reply, ServerMessage::cookie_cleared());
        assert!(!store.exists(channel.session_id()));
        assert_eq!(channel.state(), ChannelState::Cleared);
    }

    #[test]
    fn test_apply_clear_cookie_twice_is_idempotent() {
        let mut store = SessionStore::new();
        let other = store.issue();
        let mut channel = open_channel(&mut store);

        channel.apply(&mut store, ClientMessage::ClearCookie);
        let reply = channel.apply(&mut store, ClientMessage::ClearCookie);

        assert_eq!(reply, ServerMessage::cookie_cleared());
        assert_eq!(store.list_active(), vec![other], "only our session goes");
    }

    #[test]
    fn test_cleared_session_is_unknown_at_next_handshake() {
        let mut store = SessionStore::new();
        let mut channel = open_channel(&mut store);
        channel.apply(&mut store, ClientMessage::ClearCookie);

        let result = validate_handshake(&mut store, Some(channel.session_id()));

        assert!(matches!(
            result,
            Err(crate::SessionError::UnknownCredential(_))
        ));
    }

    #[test]
    fn test_open_session_is_stale_at_next_handshake() {
        let mut store = SessionStore::new();
        let channel = open_channel(&mut store);

        let result = validate_handshake(&mut store, Some(channel.session_id()));

        assert!(matches!(
            result,
            Err(crate::SessionError::StaleCredential(_))
        ));
    }
}
