//! Minimal ABI encoding for the streaming contract's three functions.

use super::DataSourceError;
use crate::domain::{Address, Amount, StreamSnapshot, TimeSecs};
use alloy_primitives::{keccak256, U256};

const WORD: usize = 32;

pub const STREAMS_SIG: &str = "streams(address)";
pub const UNLOCKED_BALANCE_SIG: &str = "unlockedBalance(address)";
pub const WITHDRAW_SIG: &str = "withdraw(uint256)";

/// First four bytes of keccak256 of the canonical signature.
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

/// Calldata for a single-address-argument function.
pub fn encode_address_call(signature: &str, account: &Address) -> Vec<u8> {
    let mut data = Vec::with_capacity(4 + WORD);
    data.extend_from_slice(&selector(signature));
    data.extend_from_slice(&[0u8; 12]);
    data.extend_from_slice(account.as_bytes());
    data
}

/// Calldata for a single-uint256-argument function.
pub fn encode_uint_call(signature: &str, value: U256) -> Vec<u8> {
    let mut data = Vec::with_capacity(4 + WORD);
    data.extend_from_slice(&selector(signature));
    data.extend_from_slice(&value.to_be_bytes::<32>());
    data
}

/// `0x`-prefixed hex for JSON-RPC params.
pub fn to_hex_data(data: &[u8]) -> String {
    format!("0x{}", hex::encode(data))
}

/// Decode a `0x`-prefixed hex result.
pub fn from_hex_data(s: &str) -> Result<Vec<u8>, DataSourceError> {
    let digits = s.strip_prefix("0x").unwrap_or(s);
    hex::decode(digits).map_err(|e| DataSourceError::ParseError(format!("Invalid hex data: {}", e)))
}

fn word(data: &[u8], index: usize) -> Result<U256, DataSourceError> {
    let start = index * WORD;
    let bytes = data.get(start..start + WORD).ok_or_else(|| {
        DataSourceError::ParseError(format!(
            "Return data too short: {} bytes, need word {}",
            data.len(),
            index
        ))
    })?;
    Ok(U256::from_be_slice(bytes))
}

fn word_to_u64(value: U256, field: &str) -> Result<u64, DataSourceError> {
    if value > U256::from(u64::MAX) {
        return Err(DataSourceError::ParseError(format!(
            "{} out of range: {}",
            field, value
        )));
    }
    Ok(value.as_limbs()[0])
}

fn word_to_address(data: &[u8], index: usize) -> Result<Address, DataSourceError> {
    let start = index * WORD;
    let bytes = data
        .get(start..start + WORD)
        .ok_or_else(|| DataSourceError::ParseError("Missing address word".to_string()))?;
    if bytes[..12].iter().any(|b| *b != 0) {
        return Err(DataSourceError::ParseError(
            "Address word has dirty high bytes".to_string(),
        ));
    }
    let mut raw = [0u8; 20];
    raw.copy_from_slice(&bytes[12..]);
    Ok(Address::from_bytes(raw))
}

/// Decode `(uint256 cap, uint256 unlockDuration, uint256 lastWithdrawal, address token)`.
pub fn decode_stream(data: &[u8]) -> Result<StreamSnapshot, DataSourceError> {
    let cap = Amount::from_wei(word(data, 0)?);
    let unlock_duration_secs = word_to_u64(word(data, 1)?, "unlockDuration")?;
    let last_withdrawal = word_to_u64(word(data, 2)?, "lastWithdrawal")?;
    let last_withdrawal = i64::try_from(last_withdrawal).map_err(|_| {
        DataSourceError::ParseError(format!("lastWithdrawal out of range: {}", last_withdrawal))
    })?;
    let token = word_to_address(data, 3)?;

    Ok(StreamSnapshot::new(
        cap,
        unlock_duration_secs,
        TimeSecs::new(last_withdrawal),
        token,
    ))
}

/// Decode a single `uint256` return value.
pub fn decode_amount(data: &[u8]) -> Result<Amount, DataSourceError> {
    word(data, 0).map(Amount::from_wei)
}

#[cfg(test)]
pub(crate) fn encode_stream(snapshot: &StreamSnapshot) -> Vec<u8> {
    let mut data = Vec::with_capacity(4 * WORD);
    data.extend_from_slice(&snapshot.cap.wei().to_be_bytes::<32>());
    data.extend_from_slice(&U256::from(snapshot.unlock_duration_secs).to_be_bytes::<32>());
    data.extend_from_slice(&U256::from(snapshot.last_withdrawal.as_secs() as u64).to_be_bytes::<32>());
    data.extend_from_slice(&[0u8; 12]);
    data.extend_from_slice(snapshot.token.as_bytes());
    data
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_known_selectors() {
        // ERC-20 transfer(address,uint256) is 0xa9059cbb.
        assert_eq!(selector("transfer(address,uint256)"), [0xa9, 0x05, 0x9c, 0xbb]);
        // balanceOf(address) is 0x70a08231.
        assert_eq!(selector("balanceOf(address)"), [0x70, 0xa0, 0x82, 0x31]);
    }

    #[test]
    fn test_encode_address_call_layout() {
        let account = Address::from_bytes([0xab; 20]);
        let data = encode_address_call(STREAMS_SIG, &account);
        assert_eq!(data.len(), 36);
        assert_eq!(&data[..4], &selector(STREAMS_SIG));
        assert!(data[4..16].iter().all(|b| *b == 0));
        assert_eq!(&data[16..], account.as_bytes());
    }

    #[test]
    fn test_encode_uint_call_layout() {
        let data = encode_uint_call(WITHDRAW_SIG, U256::from(0x0102u64));
        assert_eq!(data.len(), 36);
        assert_eq!(data[34], 0x01);
        assert_eq!(data[35], 0x02);
    }

    #[test]
    fn test_decode_stream() {
        let token = Address::from_str("0x765de816845861e75a25fca122bb6898b8b1282a").unwrap();
        let snapshot = StreamSnapshot::new(
            Amount::from_units(100),
            86_400,
            TimeSecs::new(1_700_000_000),
            token,
        );
        let decoded = decode_stream(&encode_stream(&snapshot)).unwrap();
        assert_eq!(decoded, snapshot);
    }

    #[test]
    fn test_decode_stream_short_data() {
        let err = decode_stream(&[0u8; 64]).unwrap_err();
        assert!(matches!(err, DataSourceError::ParseError(_)));
    }

    #[test]
    fn test_decode_stream_duration_out_of_range() {
        let mut data = encode_stream(&StreamSnapshot::empty());
        data[32] = 0x01;
        let err = decode_stream(&data).unwrap_err();
        assert!(err.to_string().contains("unlockDuration"));
    }

    #[test]
    fn test_decode_stream_dirty_address() {
        let mut data = encode_stream(&StreamSnapshot::empty());
        data[96] = 0xff;
        assert!(decode_stream(&data).is_err());
    }

    #[test]
    fn test_decode_amount() {
        let data = Amount::from_units(3).wei().to_be_bytes::<32>();
        assert_eq!(decode_amount(&data).unwrap(), Amount::from_units(3));
        assert!(decode_amount(&data[..31]).is_err());
    }

    #[test]
    fn test_hex_data() {
        assert_eq!(to_hex_data(&[0xde, 0xad]), "0xdead");
        assert_eq!(from_hex_data("0xdead").unwrap(), vec![0xde, 0xad]);
        assert!(from_hex_data("0xzz").is_err());
    }
}
