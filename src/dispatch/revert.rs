//! Failure-reason codec.
//!
//! Targets report failure reasons as an ABI-encoded `Error(string)`
//! (selector `0x08c379a0`, offset word, length word, padded UTF-8 data).
//! Decoding is strict: bad padding, inconsistent offsets or lengths and
//! invalid UTF-8 all mean "no reason". Anything shorter than
//! `MIN_REASON_PAYLOAD_LEN` carries no reason either.

use alloy_sol_types::{Revert, SolError};

/// Selector of `Error(string)`.
pub const ERROR_SELECTOR: [u8; 4] = Revert::SELECTOR;

/// Selector plus the offset and length words.
pub const MIN_REASON_PAYLOAD_LEN: usize = 68;

/// Fixed failure message; a decoded reason is appended after `": "`.
pub const CALL_FAILED: &str = "call failed";

/// Encode `reason` the way a failing target reports it.
pub fn encode_revert_reason(reason: &str) -> Vec<u8> {
    Revert {
        reason: reason.to_string(),
    }
    .abi_encode()
}

/// Decode a human-readable reason from a failure payload.
///
/// Returns `None` for short or malformed payloads and for an empty reason.
pub fn decode_revert_reason(data: &[u8]) -> Option<String> {
    if data.len() < MIN_REASON_PAYLOAD_LEN {
        return None;
    }

    let revert = Revert::abi_decode_validate(data).ok()?;
    if revert.reason.is_empty() {
        return None;
    }
    Some(revert.reason)
}

/// Failure message for an optional reason.
pub fn failure_message(reason: Option<&str>) -> String {
    match reason {
        Some(reason) => format!("{}: {}", CALL_FAILED, reason),
        None => CALL_FAILED.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoded_short_reason_is_100_bytes() {
        let data = encode_revert_reason("boom");
        assert_eq!(data.len(), 100);
        assert_eq!(ERROR_SELECTOR, [0x08, 0xc3, 0x79, 0xa0]);
        assert_eq!(&data[..4], &ERROR_SELECTOR);
        assert_eq!(decode_revert_reason(&data), Some("boom".to_string()));
    }

    #[test]
    fn test_long_reason_spans_words() {
        let reason = "insufficient balance for requested withdrawal amount";
        let data = encode_revert_reason(reason);
        assert_eq!(data.len() % 32, 4);
        assert_eq!(decode_revert_reason(&data), Some(reason.to_string()));
    }

    #[test]
    fn test_below_threshold_has_no_reason() {
        let data = encode_revert_reason("boom");
        assert_eq!(decode_revert_reason(&data[..67]), None);
    }

    #[test]
    fn test_exact_threshold_with_empty_string_has_no_reason() {
        let data = encode_revert_reason("");
        assert_eq!(data.len(), MIN_REASON_PAYLOAD_LEN);
        assert_eq!(decode_revert_reason(&data), None);
    }

    #[test]
    fn test_exact_threshold_with_missing_data_has_no_reason() {
        let data = encode_revert_reason("boom");
        // Header claims 4 bytes but the payload stops right after the length word.
        assert_eq!(decode_revert_reason(&data[..68]), None);
    }

    #[test]
    fn test_unpadded_reason_has_no_reason() {
        let data = encode_revert_reason("boom");
        assert_eq!(decode_revert_reason(&data[..72]), None);
    }

    #[test]
    fn test_wrong_selector_has_no_reason() {
        let mut data = encode_revert_reason("boom");
        data[0] = 0xff;
        assert_eq!(decode_revert_reason(&data), None);
    }

    #[test]
    fn test_oversized_length_has_no_reason() {
        let mut data = encode_revert_reason("boom");
        data[4 + 32 + 31] = 200;
        assert_eq!(decode_revert_reason(&data), None);
    }

    #[test]
    fn test_huge_offset_has_no_reason() {
        let mut data = encode_revert_reason("boom");
        data[4] = 0x01;
        assert_eq!(decode_revert_reason(&data), None);
    }

    #[test]
    fn test_invalid_utf8_has_no_reason() {
        let mut data = encode_revert_reason("boom");
        data[68] = 0xff;
        assert_eq!(decode_revert_reason(&data), None);
    }

    #[test]
    fn test_failure_message() {
        assert_eq!(failure_message(None), "call failed");
        assert_eq!(failure_message(Some("boom")), "call failed: boom");
    }
}
