use crate::domain::{Address, Amount, DECIMALS};
use crate::engine::DEFAULT_DRIFT_THRESHOLD;
use alloy_primitives::U256;
use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rpc_url: String,
    pub streaming_contract: Address,
    pub watch_address: Option<Address>,
    pub rpc_retry_budget: Duration,
    pub session: SessionConfig,
}

/// Per-session cadences and display settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub stream_poll: Duration,
    pub balance_poll: Duration,
    pub details_poll: Duration,
    pub tick: Duration,
    pub pulse: Duration,
    pub display_decimals: usize,
    pub drift_threshold: Amount,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            stream_poll: Duration::from_millis(2_000),
            balance_poll: Duration::from_millis(2_000),
            details_poll: Duration::from_millis(5_000),
            tick: Duration::from_millis(100),
            pulse: Duration::from_millis(200),
            display_decimals: 8,
            drift_threshold: DEFAULT_DRIFT_THRESHOLD,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnv(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let port = env_map
            .get("PORT")
            .map(|s| s.as_str())
            .unwrap_or("8080")
            .parse::<u16>()
            .map_err(|_| {
                ConfigError::InvalidValue("PORT".to_string(), "must be a valid u16".to_string())
            })?;

        let rpc_url = env_map
            .get("RPC_URL")
            .cloned()
            .ok_or_else(|| ConfigError::MissingEnv("RPC_URL".to_string()))?;

        let streaming_contract = env_map
            .get("STREAMING_CONTRACT")
            .ok_or_else(|| ConfigError::MissingEnv("STREAMING_CONTRACT".to_string()))
            .and_then(|s| parse_address("STREAMING_CONTRACT", s))?;

        let watch_address = match env_map.get("WATCH_ADDRESS").map(|s| s.trim()) {
            Some(s) if !s.is_empty() => Some(parse_address("WATCH_ADDRESS", s)?),
            _ => None,
        };

        let defaults = SessionConfig::default();
        let session = SessionConfig {
            stream_poll: parse_cadence(&env_map, "STREAM_POLL_MS", defaults.stream_poll)?,
            balance_poll: parse_cadence(&env_map, "BALANCE_POLL_MS", defaults.balance_poll)?,
            details_poll: parse_cadence(&env_map, "DETAILS_POLL_MS", defaults.details_poll)?,
            tick: parse_cadence(&env_map, "TICK_MS", defaults.tick)?,
            pulse: parse_cadence(&env_map, "PULSE_MS", defaults.pulse)?,
            display_decimals: parse_display_decimals(&env_map, defaults.display_decimals)?,
            drift_threshold: parse_threshold(&env_map, defaults.drift_threshold)?,
        };

        let rpc_retry_budget = match env_map.get("RPC_RETRY_BUDGET_MS") {
            Some(s) => Duration::from_millis(s.parse::<u64>().map_err(|_| {
                ConfigError::InvalidValue(
                    "RPC_RETRY_BUDGET_MS".to_string(),
                    "must be a valid u64".to_string(),
                )
            })?),
            None => Duration::from_millis(1_500),
        };

        Ok(Config {
            port,
            rpc_url,
            streaming_contract,
            watch_address,
            rpc_retry_budget,
            session,
        })
    }
}

fn parse_address(key: &str, value: &str) -> Result<Address, ConfigError> {
    Address::from_str(value)
        .map_err(|_| ConfigError::InvalidValue(key.to_string(), "must be a 0x-prefixed 20-byte hex address".to_string()))
}

fn parse_cadence(
    env_map: &HashMap<String, String>,
    key: &str,
    default: Duration,
) -> Result<Duration, ConfigError> {
    let Some(raw) = env_map.get(key) else {
        return Ok(default);
    };
    match raw.parse::<u64>() {
        Ok(0) => Err(ConfigError::InvalidValue(
            key.to_string(),
            "must be greater than zero".to_string(),
        )),
        Ok(ms) => Ok(Duration::from_millis(ms)),
        Err(_) => Err(ConfigError::InvalidValue(
            key.to_string(),
            "must be a valid u64".to_string(),
        )),
    }
}

fn parse_display_decimals(
    env_map: &HashMap<String, String>,
    default: usize,
) -> Result<usize, ConfigError> {
    let Some(raw) = env_map.get("DISPLAY_DECIMALS") else {
        return Ok(default);
    };
    match raw.parse::<usize>() {
        Ok(n) if n <= DECIMALS => Ok(n),
        _ => Err(ConfigError::InvalidValue(
            "DISPLAY_DECIMALS".to_string(),
            format!("must be an integer between 0 and {}", DECIMALS),
        )),
    }
}

fn parse_threshold(
    env_map: &HashMap<String, String>,
    default: Amount,
) -> Result<Amount, ConfigError> {
    let Some(raw) = env_map.get("DRIFT_THRESHOLD_WEI") else {
        return Ok(default);
    };
    U256::from_str_radix(raw.trim(), 10)
        .map(Amount::from_wei)
        .map_err(|_| {
            ConfigError::InvalidValue(
                "DRIFT_THRESHOLD_WEI".to_string(),
                "must be a non-negative integer wei amount".to_string(),
            )
        })
}
