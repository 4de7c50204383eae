use near_sdk::env;
use rlp::Rlp;

use crate::errors::{ERR_DECODE_FAILED, ERR_INVALID_HEX};

pub use rlp::DecoderError as CodecError;

/// Opens `bytes` as a single RLP list of exactly `fields` items.
///
/// Trailing bytes after the list and lists of any other arity are rejected:
/// the encoding is hashed on both networks, so only the canonical shape is accepted.
pub fn open_list(bytes: &[u8], fields: usize) -> Result<Rlp<'_>, CodecError> {
    let rlp = Rlp::new(bytes);
    if !rlp.is_list() {
        return Err(CodecError::RlpExpectedToBeList);
    }
    let info = rlp.payload_info()?;
    if info.header_len + info.value_len != bytes.len() {
        return Err(CodecError::RlpInconsistentLengthAndData);
    }
    if rlp.item_count()? != fields {
        return Err(CodecError::RlpIncorrectListLen);
    }
    Ok(rlp)
}

/// Aborts the call on a codec failure.
pub fn or_revert<T>(result: Result<T, CodecError>) -> T {
    result.unwrap_or_else(|_| env::panic_str(ERR_DECODE_FAILED))
}

/// Parses a hex payload, with or without a `0x` prefix.
pub fn decode_hex(payload: &str) -> Vec<u8> {
    let trimmed = payload.strip_prefix("0x").unwrap_or(payload);
    hex::decode(trimmed).unwrap_or_else(|_| env::panic_str(ERR_INVALID_HEX))
}

pub fn encode_hex(bytes: &[u8]) -> String {
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_list_accepts_exact_arity() {
        let bytes = hex::decode("d5946c449988e2f33302803c93f8287dc1d8cb33848a").unwrap();
        assert!(open_list(&bytes, 1).is_ok());
        assert_eq!(
            open_list(&bytes, 2).unwrap_err(),
            CodecError::RlpIncorrectListLen
        );
    }

    #[test]
    fn open_list_rejects_trailing_bytes() {
        let mut bytes = hex::decode("d5946c449988e2f33302803c93f8287dc1d8cb33848a").unwrap();
        bytes.push(0x00);
        assert_eq!(
            open_list(&bytes, 1).unwrap_err(),
            CodecError::RlpInconsistentLengthAndData
        );
    }

    #[test]
    fn open_list_rejects_plain_data() {
        let bytes = hex::decode("946c449988e2f33302803c93f8287dc1d8cb33848a").unwrap();
        assert_eq!(
            open_list(&bytes, 1).unwrap_err(),
            CodecError::RlpExpectedToBeList
        );
    }

    #[test]
    fn hex_payload_prefix_is_optional() {
        assert_eq!(decode_hex("0xd601"), vec![0xd6, 0x01]);
        assert_eq!(decode_hex("d601"), vec![0xd6, 0x01]);
    }

    #[test]
    #[should_panic(expected = "Invalid hex payload")]
    fn hex_payload_rejects_garbage() {
        decode_hex("0xzz");
    }
}
