//! Mock data source for testing without network calls.

use super::{ChainDataSource, DataSourceError, TxHash};
use crate::domain::{Address, Amount, StreamSnapshot};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

#[derive(Debug, Default)]
struct MockState {
    streams: HashMap<Address, StreamSnapshot>,
    balances: HashMap<Address, Amount>,
    fail_reads: bool,
    fail_writes: bool,
    withdrawals: Vec<(Address, Amount)>,
}

/// Mock data source that returns predefined, mutable test data.
///
/// Unknown accounts read as the contract would report them: an all-zero
/// stream and a zero balance.
#[derive(Debug, Default)]
pub struct MockDataSource {
    state: Mutex<MockState>,
    stream_reads: AtomicUsize,
    balance_reads: AtomicUsize,
}

impl MockDataSource {
    /// Create a new mock data source with empty data.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a stream for an account.
    pub fn with_stream(self, account: Address, snapshot: StreamSnapshot) -> Self {
        self.set_stream(account, snapshot);
        self
    }

    /// Set the ground-truth balance for an account.
    pub fn with_balance(self, account: Address, amount: Amount) -> Self {
        self.set_balance(account, amount);
        self
    }

    pub fn set_stream(&self, account: Address, snapshot: StreamSnapshot) {
        self.lock().streams.insert(account, snapshot);
    }

    pub fn set_balance(&self, account: Address, amount: Amount) {
        self.lock().balances.insert(account, amount);
    }

    /// Make every read fail with a network error until cleared.
    pub fn set_failing_reads(&self, failing: bool) {
        self.lock().fail_reads = failing;
    }

    pub fn set_failing_writes(&self, failing: bool) {
        self.lock().fail_writes = failing;
    }

    /// Withdrawals submitted so far, in order.
    pub fn withdrawals(&self) -> Vec<(Address, Amount)> {
        self.lock().withdrawals.clone()
    }

    pub fn stream_reads(&self) -> usize {
        self.stream_reads.load(Ordering::SeqCst)
    }

    pub fn balance_reads(&self) -> usize {
        self.balance_reads.load(Ordering::SeqCst)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn read_failure() -> DataSourceError {
        DataSourceError::NetworkError("mock read failure".to_string())
    }
}

#[async_trait]
impl ChainDataSource for MockDataSource {
    async fn fetch_stream(&self, account: &Address) -> Result<StreamSnapshot, DataSourceError> {
        self.stream_reads.fetch_add(1, Ordering::SeqCst);
        let state = self.lock();
        if state.fail_reads {
            return Err(Self::read_failure());
        }
        Ok(state
            .streams
            .get(account)
            .cloned()
            .unwrap_or_else(StreamSnapshot::empty))
    }

    async fn fetch_unlocked_balance(&self, account: &Address) -> Result<Amount, DataSourceError> {
        self.balance_reads.fetch_add(1, Ordering::SeqCst);
        let state = self.lock();
        if state.fail_reads {
            return Err(Self::read_failure());
        }
        Ok(state.balances.get(account).copied().unwrap_or(Amount::ZERO))
    }

    async fn withdraw(&self, account: &Address, amount: Amount) -> Result<TxHash, DataSourceError> {
        let mut state = self.lock();
        if state.fail_writes {
            return Err(DataSourceError::RpcError {
                code: -32000,
                message: "mock write failure".to_string(),
            });
        }
        state.withdrawals.push((*account, amount));
        Ok(TxHash(format!("0x{:064x}", state.withdrawals.len())))
    }
}
