//! Owns the active session and rebuilds it whenever its key changes.

use super::clock::Clock;
use super::connection::{ConnectionState, SessionKey, TransitionError};
use super::session::{BalanceView, Session, SharedCore, StreamView};
use crate::config::SessionConfig;
use crate::datasource::{ChainDataSource, DataSourceError, TxHash};
use crate::domain::{Address, Amount, AmountParseError};
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no connected session")]
    NotConnected,
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error(transparent)]
    InvalidAmount(#[from] AmountParseError),
    #[error("withdraw amount must be greater than zero")]
    ZeroAmount,
    #[error("withdraw failed: {0}")]
    Withdraw(DataSourceError),
}

/// What to withdraw: an explicit amount, or everything currently shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WithdrawAmount {
    Max,
    Exact(Amount),
}

impl FromStr for WithdrawAmount {
    type Err = AmountParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("max") {
            Ok(WithdrawAmount::Max)
        } else {
            Amount::parse_units(s).map(WithdrawAmount::Exact)
        }
    }
}

/// A withdrawal resolved against a session, detached from the scheduler.
#[derive(Debug)]
pub struct PreparedWithdraw {
    datasource: Arc<dyn ChainDataSource>,
    address: Address,
    amount: Amount,
}

impl PreparedWithdraw {
    pub fn address(&self) -> Address {
        self.address
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    /// A single attempt; failures are returned to the caller.
    pub async fn submit(self) -> Result<TxHash, SessionError> {
        info!("Withdrawing {} for {}", self.amount, self.address);
        self.datasource
            .withdraw(&self.address, self.amount)
            .await
            .map_err(|e| {
                warn!("Withdraw of {} for {} failed: {}", self.amount, self.address, e);
                SessionError::Withdraw(e)
            })
    }
}

/// Session scheduler keyed by `(address, connection state)`.
///
/// At most one session runs at a time. Before a new key takes effect every
/// task of the previous session is aborted and awaited.
#[derive(Debug)]
pub struct Scheduler {
    datasource: Arc<dyn ChainDataSource>,
    clock: Arc<dyn Clock>,
    config: SessionConfig,
    state: ConnectionState,
    session: Option<Session>,
}

impl Scheduler {
    pub fn new(
        datasource: Arc<dyn ChainDataSource>,
        clock: Arc<dyn Clock>,
        config: SessionConfig,
    ) -> Self {
        Self {
            datasource,
            clock,
            config,
            state: ConnectionState::Disconnected,
            session: None,
        }
    }

    pub fn key(&self) -> SessionKey {
        SessionKey {
            address: self.session.as_ref().map(Session::address),
            state: self.state,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Move to the session for `address`, or to no session.
    pub async fn apply(&mut self, address: Option<Address>) -> Result<SessionKey, SessionError> {
        match address {
            Some(address) => self.connect(address).await,
            None => Ok(self.disconnect().await.0),
        }
    }

    /// Connect to `address`. Reconnecting to the current address is a no-op;
    /// a different address tears the current session down first.
    pub async fn connect(&mut self, address: Address) -> Result<SessionKey, SessionError> {
        if self.key() == SessionKey::connected(address) {
            return Ok(self.key());
        }
        if self.state.is_connected() {
            info!("Address changed; rebuilding session for {}", address);
            self.disconnect().await;
        }

        self.state = self.state.transition(ConnectionState::Connecting)?;
        info!("Connecting {}", address);

        let session = Session::start(
            address,
            self.datasource.clone(),
            self.clock.clone(),
            &self.config,
        );
        self.state = self.state.transition(ConnectionState::Connected)?;
        self.session = Some(session);
        Ok(self.key())
    }

    /// Tear down the running session, if any. Returns the new key and the
    /// torn-down session's core.
    pub async fn disconnect(&mut self) -> (SessionKey, Option<SharedCore>) {
        let core = match self.session.take() {
            Some(session) => Some(session.shutdown().await),
            None => None,
        };
        self.state = ConnectionState::Disconnected;
        (self.key(), core)
    }

    pub fn balance(&self) -> Result<BalanceView, SessionError> {
        self.connected_session().map(Session::view)
    }

    pub fn details(&self) -> Result<StreamView, SessionError> {
        self.connected_session().map(Session::details)
    }

    /// Resolve a withdrawal against the connected session without sending it.
    /// The returned request owns everything it needs, so callers can release
    /// any lock on the scheduler before submitting.
    pub fn prepare_withdraw(
        &self,
        request: WithdrawAmount,
    ) -> Result<PreparedWithdraw, SessionError> {
        let session = self.connected_session()?;
        let amount = match request {
            WithdrawAmount::Max => session.estimate(),
            WithdrawAmount::Exact(amount) => amount,
        };
        if amount.is_zero() {
            return Err(SessionError::ZeroAmount);
        }
        Ok(PreparedWithdraw {
            datasource: self.datasource.clone(),
            address: session.address(),
            amount,
        })
    }

    /// Prepare and submit in one step.
    pub async fn withdraw(&self, request: WithdrawAmount) -> Result<TxHash, SessionError> {
        self.prepare_withdraw(request)?.submit().await
    }

    fn connected_session(&self) -> Result<&Session, SessionError> {
        match (&self.session, self.state) {
            (Some(session), ConnectionState::Connected) => Ok(session),
            _ => Err(SessionError::NotConnected),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datasource::MockDataSource;
    use crate::domain::{StreamSnapshot, TimeSecs};
    use crate::orchestration::clock::ManualClock;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn test_prepare_withdraw_resolves_max_to_estimate() {
        let account = Address::from_bytes([0x22; 20]);
        let snapshot =
            StreamSnapshot::new(Amount::from_units(10), 100, TimeSecs::new(1_000), Address::ZERO);
        let ds = Arc::new(
            MockDataSource::new()
                .with_stream(account, snapshot)
                .with_balance(account, Amount::from_units(5)),
        );
        let clock = Arc::new(ManualClock::new(TimeSecs::new(1_050)));
        let mut scheduler = Scheduler::new(ds.clone(), clock, SessionConfig::default());

        assert!(matches!(
            scheduler.prepare_withdraw(WithdrawAmount::Max),
            Err(SessionError::NotConnected)
        ));

        scheduler.connect(account).await.unwrap();
        tokio::time::sleep(Duration::from_millis(150)).await;

        let prepared = scheduler.prepare_withdraw(WithdrawAmount::Max).unwrap();
        assert_eq!(prepared.address(), account);
        assert_eq!(prepared.amount(), Amount::from_units(5));

        // The prepared request outlives the session it came from.
        scheduler.disconnect().await;
        prepared.submit().await.unwrap();
        assert_eq!(ds.withdrawals(), vec![(account, Amount::from_units(5))]);
    }

    #[test]
    fn test_withdraw_amount_parsing() {
        assert_eq!(WithdrawAmount::from_str("max").unwrap(), WithdrawAmount::Max);
        assert_eq!(WithdrawAmount::from_str(" MAX ").unwrap(), WithdrawAmount::Max);
        assert_eq!(
            WithdrawAmount::from_str("1.5").unwrap(),
            WithdrawAmount::Exact(Amount::parse_units("1.5").unwrap())
        );
        assert!(WithdrawAmount::from_str("lots").is_err());
    }
}
