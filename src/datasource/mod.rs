//! Data source abstraction for reading vesting streams from the chain.

use crate::domain::{Address, Amount, StreamSnapshot};
use async_trait::async_trait;
use std::fmt;

pub mod abi;
pub mod jsonrpc;
pub mod mock;

pub use jsonrpc::JsonRpcDataSource;
pub use mock::MockDataSource;

/// Transaction hash returned by a submitted write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxHash(pub String);

impl TxHash {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Remote reads and the one write the view exposes.
///
/// Reads are polled on their own cadences; implementations own any retry
/// policy. Writes are never retried by callers.
#[async_trait]
pub trait ChainDataSource: Send + Sync + fmt::Debug {
    /// `streams(address)`: the stream-parameter tuple.
    ///
    /// Addresses without a stream yield an all-zero snapshot, not an error.
    async fn fetch_stream(&self, account: &Address) -> Result<StreamSnapshot, DataSourceError>;

    /// `unlockedBalance(address)`: authoritative unlocked amount.
    async fn fetch_unlocked_balance(&self, account: &Address) -> Result<Amount, DataSourceError>;

    /// `withdraw(amount)` sent from `account`. Returns once submitted;
    /// confirmation is the caller's concern.
    async fn withdraw(&self, account: &Address, amount: Amount) -> Result<TxHash, DataSourceError>;
}

/// Error type for data source operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSourceError {
    /// Network error (e.g., connection timeout, DNS failure)
    NetworkError(String),
    /// HTTP error (e.g., 429 rate limit, 5xx server error)
    HttpError { status: u16, message: String },
    /// JSON-RPC error object returned by the node (e.g., reverted call)
    RpcError { code: i64, message: String },
    /// Parsing error (invalid JSON, short return data, value out of range)
    ParseError(String),
    /// Rate limit exceeded
    RateLimited,
    /// Other error
    Other(String),
}

impl fmt::Display for DataSourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSourceError::NetworkError(msg) => write!(f, "Network error: {}", msg),
            DataSourceError::HttpError { status, message } => {
                write!(f, "HTTP error {}: {}", status, message)
            }
            DataSourceError::RpcError { code, message } => {
                write!(f, "RPC error {}: {}", code, message)
            }
            DataSourceError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            DataSourceError::RateLimited => write!(f, "Rate limited"),
            DataSourceError::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for DataSourceError {}
