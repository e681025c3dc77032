//! Trait abstraction for dispatching approved operations.
//!
//! The ledger never defines what a target does. It hands an `Invocation` to a
//! `Dispatcher` and gets back a success flag plus raw return bytes.
//! Enables mock implementations for unit testing.

use crate::primitives::{Address, Selector};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A single call to a target endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invocation {
    pub endpoint: Address,
    /// `None` for a plain value transfer (no operation, empty payload).
    pub selector: Option<Selector>,
    pub payload: Vec<u8>,
    /// Value forwarded from the triggering call.
    pub value: u128,
}

impl Invocation {
    /// Build the invocation for a stored operation.
    ///
    /// `Selector::NOOP` dispatches with no selector and an empty payload,
    /// whatever arguments were stored.
    pub fn for_operation(endpoint: Address, selector: Selector, payload: &[u8], value: u128) -> Self {
        if selector.is_noop() {
            return Self {
                endpoint,
                selector: None,
                payload: Vec::new(),
                value,
            };
        }

        Self {
            endpoint,
            selector: Some(selector),
            payload: payload.to_vec(),
            value,
        }
    }

    /// Selector bytes followed by the payload, as a target would receive them.
    pub fn calldata(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(4 + self.payload.len());
        if let Some(selector) = &self.selector {
            data.extend_from_slice(selector.as_bytes());
        }
        data.extend_from_slice(&self.payload);
        data
    }
}

/// Result reported by the target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallOutcome {
    pub success: bool,
    /// Return payload on success, failure payload otherwise.
    pub return_data: Vec<u8>,
}

impl CallOutcome {
    pub fn success(return_data: Vec<u8>) -> Self {
        Self {
            success: true,
            return_data,
        }
    }

    pub fn failure(return_data: Vec<u8>) -> Self {
        Self {
            success: false,
            return_data,
        }
    }
}

/// Result type for dispatch operations.
pub type DispatchResult<T> = Result<T, DispatchError>;

/// The dispatch itself could not be carried out.
///
/// Distinct from a target reporting failure through `CallOutcome`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    #[error("Endpoint unreachable: {0}")]
    Unreachable(Address),

    #[error("Transport error: {0}")]
    Transport(String),
}

/// Capability to invoke operations on target endpoints.
#[async_trait]
pub trait Dispatcher: Send + Sync {
    /// Whether `endpoint` is a live, invokable destination.
    async fn is_callable(&self, endpoint: &Address) -> bool;

    /// Invoke the operation described by `call`.
    async fn invoke(&self, call: &Invocation) -> DispatchResult<CallOutcome>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noop_selector_drops_payload() {
        let target = Address::from_label("vault");
        let call = Invocation::for_operation(target, Selector::NOOP, &[1, 2, 3], 500);

        assert_eq!(call.selector, None);
        assert!(call.payload.is_empty());
        assert_eq!(call.value, 500);
        assert!(call.calldata().is_empty());
    }

    #[test]
    fn test_calldata_prefixes_selector() {
        let target = Address::from_label("vault");
        let selector = Selector::new([0xaa, 0xbb, 0xcc, 0xdd]);
        let call = Invocation::for_operation(target, selector, &[1, 2], 0);

        assert_eq!(call.calldata(), vec![0xaa, 0xbb, 0xcc, 0xdd, 1, 2]);
    }

    #[test]
    fn test_dispatch_error_display() {
        assert_eq!(
            DispatchError::Transport("broken pipe".to_string()).to_string(),
            "Transport error: broken pipe"
        );
    }

    #[test]
    fn test_invocation_serialization() {
        let call = Invocation::for_operation(
            Address::from_label("vault"),
            Selector::new([1, 2, 3, 4]),
            &[9, 9],
            u128::MAX,
        );

        let serialized = serde_json::to_string(&call).unwrap();
        let deserialized: Invocation = serde_json::from_str(&serialized).unwrap();
        assert_eq!(call, deserialized);
    }
}
