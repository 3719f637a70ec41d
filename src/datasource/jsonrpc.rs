//! Ethereum-style JSON-RPC client for the streaming contract.

use super::abi::{self, STREAMS_SIG, UNLOCKED_BALANCE_SIG, WITHDRAW_SIG};
use super::{ChainDataSource, DataSourceError, TxHash};
use crate::domain::{Address, Amount, StreamSnapshot};
use async_trait::async_trait;
use backoff::future::retry;
use backoff::ExponentialBackoff;
use reqwest::Client;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::debug;

/// Reads the streaming contract through `eth_call` and submits withdrawals
/// through `eth_sendTransaction`.
#[derive(Debug)]
pub struct JsonRpcDataSource {
    client: Client,
    rpc_url: String,
    contract: Address,
    retry_budget: Duration,
    request_timeout: Duration,
    next_id: AtomicU64,
}

/// Upper bound on a single HTTP round trip, writes included.
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

impl JsonRpcDataSource {
    pub fn new(rpc_url: String, contract: Address) -> Self {
        Self {
            client: Client::new(),
            rpc_url,
            contract,
            retry_budget: Duration::from_millis(1_500),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            next_id: AtomicU64::new(1),
        }
    }

    /// Bound the total time spent retrying one request. Keep it below the
    /// poll cadence so a struggling node cannot stack up reads.
    pub fn with_retry_budget(mut self, budget: Duration) -> Self {
        self.retry_budget = budget;
        self
    }

    pub fn contract(&self) -> &Address {
        &self.contract
    }

    async fn rpc(
        &self,
        method: &str,
        params: serde_json::Value,
        retry_budget: Option<Duration>,
    ) -> Result<serde_json::Value, DataSourceError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let payload = serde_json::json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        let backoff = ExponentialBackoff {
            max_elapsed_time: retry_budget,
            ..Default::default()
        };

        let body = retry(backoff, || async {
            let response = self
                .client
                .post(&self.rpc_url)
                .timeout(self.request_timeout)
                .json(&payload)
                .send()
                .await
                .map_err(|e| {
                    backoff::Error::transient(DataSourceError::NetworkError(e.to_string()))
                })?;

            let status = response.status();
            if status == 429 {
                return Err(backoff::Error::transient(DataSourceError::RateLimited));
            }
            if status.is_server_error() {
                return Err(backoff::Error::transient(DataSourceError::HttpError {
                    status: status.as_u16(),
                    message: "Server error".to_string(),
                }));
            }
            if !status.is_success() {
                return Err(backoff::Error::permanent(DataSourceError::HttpError {
                    status: status.as_u16(),
                    message: "Client error".to_string(),
                }));
            }

            response
                .json::<serde_json::Value>()
                .await
                .map_err(|e| backoff::Error::permanent(DataSourceError::ParseError(e.to_string())))
        })
        .await?;

        parse_rpc_result(body)
    }

    async fn call(&self, data: Vec<u8>) -> Result<Vec<u8>, DataSourceError> {
        let params = serde_json::json!([
            {
                "to": self.contract.to_hex(),
                "data": abi::to_hex_data(&data),
            },
            "latest"
        ]);
        let result = self.rpc("eth_call", params, Some(self.retry_budget)).await?;
        let hex = result
            .as_str()
            .ok_or_else(|| DataSourceError::ParseError("eth_call result is not a string".to_string()))?;
        abi::from_hex_data(hex)
    }
}

/// Unwrap a JSON-RPC response envelope.
fn parse_rpc_result(mut body: serde_json::Value) -> Result<serde_json::Value, DataSourceError> {
    if let Some(error) = body.get("error") {
        let code = error.get("code").and_then(|v| v.as_i64()).unwrap_or(0);
        let message = error
            .get("message")
            .and_then(|v| v.as_str())
            .unwrap_or("unknown error")
            .to_string();
        return Err(DataSourceError::RpcError { code, message });
    }
    body.get_mut("result")
        .map(serde_json::Value::take)
        .ok_or_else(|| DataSourceError::ParseError("Missing result field".to_string()))
}

#[async_trait]
impl ChainDataSource for JsonRpcDataSource {
    async fn fetch_stream(&self, account: &Address) -> Result<StreamSnapshot, DataSourceError> {
        debug!("Fetching stream for account={}", account);
        let data = self
            .call(abi::encode_address_call(STREAMS_SIG, account))
            .await?;
        abi::decode_stream(&data)
    }

    async fn fetch_unlocked_balance(&self, account: &Address) -> Result<Amount, DataSourceError> {
        debug!("Fetching unlocked balance for account={}", account);
        let data = self
            .call(abi::encode_address_call(UNLOCKED_BALANCE_SIG, account))
            .await?;
        abi::decode_amount(&data)
    }

    async fn withdraw(&self, account: &Address, amount: Amount) -> Result<TxHash, DataSourceError> {
        debug!("Submitting withdraw of {} from account={}", amount, account);
        let params = serde_json::json!([
            {
                "from": account.to_hex(),
                "to": self.contract.to_hex(),
                "data": abi::to_hex_data(&abi::encode_uint_call(WITHDRAW_SIG, amount.wei())),
            }
        ]);
        // Writes are not idempotent: a single attempt only.
        let result = self
            .rpc("eth_sendTransaction", params, Some(Duration::ZERO))
            .await?;
        result
            .as_str()
            .map(|s| TxHash(s.to_string()))
            .ok_or_else(|| DataSourceError::ParseError("Transaction hash is not a string".to_string()))
    }
}
