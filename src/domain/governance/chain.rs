//! Chain client facade
//!
//! The engine only talks to the chain through [`ChainClient`]. Records come
//! back as named field maps; turning them into typed events happens in
//! [`super::decode`].

use std::collections::BTreeMap;

use alloy_primitives::{Address, B256, U256};
use anyhow::Result;

/// Read-only method returning the proposal struct
pub const GET_PROPOSAL: &str = "getProposal";
/// Applicant module event emitted on application
pub const APPLY_EVENT: &str = "Apply";
/// Governance event emitted when a vote is cast
pub const VOTE_EVENT: &str = "Vote";
/// Governance event emitted when a vote is retracted
pub const REMOVE_VOTE_EVENT: &str = "RemoveVote";

/// Base units per display unit (10^18)
pub const DISPLAY_DECIMALS: u8 = 18;

/// Contracts the engine reads from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContractKind {
    /// Proposal storage, Vote and RemoveVote events
    Governance,
    /// Twitter applicant module, Apply events
    Applicant,
}

impl ContractKind {
    pub fn name(&self) -> &'static str {
        match self {
            ContractKind::Governance => "HumanityGovernance",
            ContractKind::Applicant => "TwitterHumanityApplicant",
        }
    }
}

/// A decoded ABI value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Uint(U256),
    Address(Address),
    Bool(bool),
    Text(String),
    Bytes(Vec<u8>),
}

impl FieldValue {
    pub fn as_uint(&self) -> Option<U256> {
        match self {
            FieldValue::Uint(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_address(&self) -> Option<Address> {
        match self {
            FieldValue::Address(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(value) => Some(value.as_str()),
            _ => None,
        }
    }

    /// Solidity-ish name of the variant, for error messages
    pub fn kind(&self) -> &'static str {
        match self {
            FieldValue::Uint(_) => "uint",
            FieldValue::Address(_) => "address",
            FieldValue::Bool(_) => "bool",
            FieldValue::Text(_) => "string",
            FieldValue::Bytes(_) => "bytes",
        }
    }
}

/// Named fields of a call result or an event
pub type Record = BTreeMap<String, FieldValue>;

/// Indexed-field filter: field name -> textual value
pub type EventFilter = BTreeMap<String, String>;

/// One historical log entry as returned by the event source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub transaction_hash: Option<B256>,
    pub block_number: Option<u64>,
    pub fields: Record,
}

/// Read-only view of the chain
///
/// Implementations must never submit transactions.
#[async_trait::async_trait]
pub trait ChainClient: Send + Sync + 'static {
    /// Whether `text` is a well-formed account address (checksum-agnostic)
    fn is_valid_address(&self, text: &str) -> bool {
        is_address_text(text)
    }

    /// Call a view method and return its named outputs
    ///
    /// Arguments are passed as text and coerced by the implementation, so a
    /// malformed identifier fails here rather than earlier.
    async fn call_read_only(
        &self,
        contract: ContractKind,
        method: &str,
        args: &[String],
    ) -> Result<Record>;

    /// Fetch past events of `event` matching `filter`, from `from_block` to head
    ///
    /// Records are returned in source order (ascending block order for
    /// `eth_getLogs`).
    async fn get_past_events(
        &self,
        contract: ContractKind,
        event: &str,
        filter: &EventFilter,
        from_block: u64,
    ) -> Result<Vec<LogRecord>>;

    /// Base units to a display string
    fn to_display_units(&self, base_units: U256) -> String {
        format_units(base_units, DISPLAY_DECIMALS)
    }
}

/// `0x` + 40 hex digits (prefix optional, any case)
pub fn is_address_text(text: &str) -> bool {
    let payload = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);
    payload.len() == 40 && payload.chars().all(|c| c.is_ascii_hexdigit())
}

/// Format a base-unit integer with `decimals` fractional digits, trimming zeros
pub fn format_units(value: U256, decimals: u8) -> String {
    if decimals == 0 {
        return value.to_string();
    }

    let divisor = U256::from(10u64).pow(U256::from(decimals));
    let whole = value / divisor;
    let frac = value % divisor;

    if frac.is_zero() {
        return whole.to_string();
    }

    let frac_str = format!("{:0>width$}", frac, width = decimals as usize);
    let trimmed = frac_str.trim_end_matches('0');
    format!("{}.{}", whole, trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_address_text() {
        assert!(is_address_text("0x36fAa1e49fF125ac72ceae0d5a2E35bC9aDD6591"));
        assert!(is_address_text("36faa1e49ff125ac72ceae0d5a2e35bc9add6591"));
        assert!(is_address_text("0X36FAA1E49FF125AC72CEAE0D5A2E35BC9ADD6591"));
        assert!(!is_address_text("136"));
        assert!(!is_address_text("0x36faa1e49ff125ac72ceae0d5a2e35bc9add659"));
        assert!(!is_address_text("0xzzfaa1e49ff125ac72ceae0d5a2e35bc9add6591"));
        assert!(!is_address_text(""));
    }

    #[test]
    fn test_format_units() {
        let one = U256::from(10u64).pow(U256::from(18u64));
        assert_eq!(format_units(U256::ZERO, 18), "0");
        assert_eq!(format_units(one, 18), "1");
        assert_eq!(format_units(one * U256::from(3u64) / U256::from(2u64), 18), "1.5");
        assert_eq!(format_units(U256::from(1u64), 18), "0.000000000000000001");
        assert_eq!(format_units(U256::from(42u64), 0), "42");
    }

    #[test]
    fn test_field_value_accessors() {
        let value = FieldValue::Uint(U256::from(7u64));
        assert_eq!(value.as_uint(), Some(U256::from(7u64)));
        assert_eq!(value.as_bool(), None);
        assert_eq!(value.kind(), "uint");
        assert_eq!(FieldValue::Text("alice".into()).as_text(), Some("alice"));
    }
}
