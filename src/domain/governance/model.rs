//! Proposal, event and view types

use alloy_primitives::{Address, B256, U256};

/// Outcome of a proposal as stored on-chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProposalResult {
    Pending,
    Approved,
    Rejected,
    /// A code outside the contract's enum; reported, never rendered blank
    Unrecognized(u8),
}

impl ProposalResult {
    pub fn from_code(code: u8) -> Self {
        match code {
            0 => ProposalResult::Pending,
            1 => ProposalResult::Approved,
            2 => ProposalResult::Rejected,
            other => ProposalResult::Unrecognized(other),
        }
    }

    pub fn label(&self) -> String {
        match self {
            ProposalResult::Pending => "Pending".to_string(),
            ProposalResult::Approved => "Yes".to_string(),
            ProposalResult::Rejected => "No".to_string(),
            ProposalResult::Unrecognized(code) => format!("Unknown ({code})"),
        }
    }

    pub fn is_anomaly(&self) -> bool {
        matches!(self, ProposalResult::Unrecognized(_))
    }
}

/// Snapshot of a governance proposal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Proposal {
    /// Canonical identifier used for the query
    pub id: String,
    pub result_code: u8,
    pub target: Option<Address>,
    pub proposer: Option<Address>,
    pub fee_recipient: Address,
    pub fee: Option<U256>,
    /// Seconds since epoch
    pub start_time: u64,
    /// Base units
    pub yes_count: U256,
    /// Base units
    pub no_count: U256,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationEvent {
    pub proposal_id: String,
    pub applicant: Address,
    /// Twitter username without the leading `@`
    pub username: String,
    pub transaction_hash: B256,
    pub block_number: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteEvent {
    pub proposal_id: String,
    pub voter: Address,
    pub approve: bool,
    /// Base units
    pub weight: U256,
    pub transaction_hash: B256,
    pub block_number: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveVoteEvent {
    pub proposal_id: String,
    pub voter: Address,
    pub transaction_hash: B256,
    pub block_number: Option<u64>,
}

/// What the raw query turned out to be
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Address(String),
    ProposalId(String),
}

impl Classification {
    pub fn value(&self) -> &str {
        match self {
            Classification::Address(value) | Classification::ProposalId(value) => value,
        }
    }

    pub fn is_address(&self) -> bool {
        matches!(self, Classification::Address(_))
    }
}

/// Applications found for an address
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    /// Identifier of the last application in source order
    pub proposal_id: Option<String>,
    /// Every application the address has made, in source order
    pub applications: Vec<ApplicationEvent>,
}

/// Aggregated, render-ready view of one proposal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedView {
    pub proposal_id: String,
    pub classification: Classification,
    pub proposal: Proposal,
    pub applications: Vec<ApplicationEvent>,
    pub votes: Vec<VoteEvent>,
    pub removed_votes: Vec<RemoveVoteEvent>,
    /// Filled in by the normalizer
    pub result: Option<ProposalResult>,
}

impl ResolvedView {
    /// Handle of the first application, if any
    pub fn applicant_handle(&self) -> Option<&str> {
        self.applications.first().map(|app| app.username.as_str())
    }
}

/// Outcome of one successful search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchReport {
    pub query: String,
    pub classification: Classification,
    /// Present only for address queries
    pub resolution: Option<Resolution>,
    /// Absent when an address query resolved to nothing
    pub view: Option<ResolvedView>,
}

/// Two identifiers name the same proposal
///
/// Equal text, or both parse to the same integer ("136" and "0x88").
pub fn same_proposal_id(a: &str, b: &str) -> bool {
    if a == b {
        return true;
    }
    match (a.trim().parse::<U256>(), b.trim().parse::<U256>()) {
        (Ok(left), Ok(right)) => left == right,
        _ => false,
    }
}
