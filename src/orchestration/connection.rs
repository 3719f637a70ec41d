use crate::domain::Address;
use serde::Serialize;
use thiserror::Error;

/// Wallet connection lifecycle for one view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid connection transition {from:?} -> {to:?}")]
pub struct TransitionError {
    pub from: ConnectionState,
    pub to: ConnectionState,
}

impl ConnectionState {
    /// Validate a move to `to`. Disconnecting twice is a no-op.
    pub fn transition(self, to: ConnectionState) -> Result<ConnectionState, TransitionError> {
        use ConnectionState::*;
        match (self, to) {
            (Disconnected, Connecting)
            | (Connecting, Connected)
            | (Connecting, Disconnected)
            | (Connected, Disconnected)
            | (Disconnected, Disconnected) => Ok(to),
            (from, to) => Err(TransitionError { from, to }),
        }
    }

    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionState::Connected)
    }
}

/// Identity of the running session. Any change tears down every task
/// belonging to the previous key before new ones start.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionKey {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    pub state: ConnectionState,
}

impl SessionKey {
    pub fn disconnected() -> Self {
        Self::default()
    }

    pub fn connected(address: Address) -> Self {
        Self {
            address: Some(address),
            state: ConnectionState::Connected,
        }
    }
}
