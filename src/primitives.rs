//! Primitive identifiers shared by every ledger component.
//!
//! - `Address`: 20-byte principal or endpoint identifier
//! - `Selector`: 4-byte operation identifier on an endpoint
//! - `CallType`: the (endpoint, selector) pair configurations are keyed by
//! - `ProposalId`: sequential proposal identifier, never reused

use alloy_primitives::FixedBytes;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

/// Sequential proposal identifier.
pub type ProposalId = u64;

/// Errors parsing identifiers from their text form.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PrimitiveError {
    #[error("Invalid hex: {0}")]
    InvalidHex(String),

    #[error("Invalid length: expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
}

/// Principal or endpoint address (20 bytes).
///
/// Serialized as its lowercase `0x` hex text in every format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(alloy_primitives::Address);

impl Address {
    /// The null address. Never a valid endpoint.
    pub const ZERO: Address = Address(alloy_primitives::Address::ZERO);

    /// Create from a fixed-size array.
    pub const fn new(bytes: [u8; 20]) -> Self {
        Self(alloy_primitives::Address::new(bytes))
    }

    /// Create from a slice, which must be exactly 20 bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, PrimitiveError> {
        let arr: [u8; 20] = bytes
            .try_into()
            .map_err(|_| PrimitiveError::InvalidLength {
                expected: 20,
                actual: bytes.len(),
            })?;
        Ok(Self::new(arr))
    }

    /// Derive a deterministic address from a human-readable label.
    ///
    /// Takes the first 20 bytes of SHA-256(label). Used by the CLI and tests
    /// so that "alice" always names the same principal.
    pub fn from_label(label: &str) -> Self {
        let digest = Sha256::digest(label.as_bytes());
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&digest[..20]);
        Self::new(bytes)
    }

    /// Get bytes.
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Whether this is the null address.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl From<alloy_primitives::Address> for Address {
    fn from(addr: alloy_primitives::Address) -> Self {
        Self(addr)
    }
}

impl From<Address> for alloy_primitives::Address {
    fn from(addr: Address) -> Self {
        addr.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Lowercase rather than the EIP-55 checksum alloy displays by default
        write!(f, "{:#x}", self.0 .0)
    }
}

impl FromStr for Address {
    type Err = PrimitiveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        alloy_primitives::Address::from_str(s)
            .map(Self)
            .map_err(|_| parse_error(s, 20))
    }
}

impl TryFrom<String> for Address {
    type Error = PrimitiveError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Address> for String {
    fn from(addr: Address) -> Self {
        addr.to_string()
    }
}

/// Operation selector (4 bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Selector(alloy_primitives::Selector);

impl Selector {
    /// Reserved sentinel: dispatch with an empty payload (plain value transfer).
    pub const NOOP: Selector = Selector(FixedBytes::ZERO);

    /// Create from a fixed-size array.
    pub const fn new(bytes: [u8; 4]) -> Self {
        Self(FixedBytes::new(bytes))
    }

    /// Get bytes.
    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }

    /// Whether this is the no-operation sentinel.
    pub fn is_noop(&self) -> bool {
        self.0.is_zero()
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

impl FromStr for Selector {
    type Err = PrimitiveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        alloy_primitives::Selector::from_str(s)
            .map(Self)
            .map_err(|_| parse_error(s, 4))
    }
}

impl TryFrom<String> for Selector {
    type Error = PrimitiveError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Selector> for String {
    fn from(selector: Selector) -> Self {
        selector.to_string()
    }
}

/// Classify a rejected fixed-width hex string.
fn parse_error(s: &str, expected: usize) -> PrimitiveError {
    match decode_hex(s) {
        Ok(bytes) => PrimitiveError::InvalidLength {
            expected,
            actual: bytes.len(),
        },
        Err(e) => e,
    }
}

/// A specific operation on a specific endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CallType {
    pub endpoint: Address,
    pub selector: Selector,
}

impl CallType {
    pub fn new(endpoint: Address, selector: Selector) -> Self {
        Self { endpoint, selector }
    }
}

impl fmt::Display for CallType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.endpoint, self.selector)
    }
}

/// Decode hex with an optional `0x` prefix.
pub fn decode_hex(s: &str) -> Result<Vec<u8>, PrimitiveError> {
    let trimmed = s.strip_prefix("0x").unwrap_or(s);
    hex::decode(trimmed).map_err(|e| PrimitiveError::InvalidHex(e.to_string()))
}
