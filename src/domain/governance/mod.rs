//! Governance domain models and contracts
//!
//! This module defines the chain facade trait and the typed proposal/event
//! model, independent of the underlying transport (alloy).

mod chain;
mod decode;
mod model;

pub use chain::{
    format_units, is_address_text, ChainClient, ContractKind, EventFilter, FieldValue, LogRecord,
    Record, APPLY_EVENT, DISPLAY_DECIMALS, GET_PROPOSAL, REMOVE_VOTE_EVENT, VOTE_EVENT,
};
pub use decode::{
    application_from_log, decode_logs, proposal_from_record, remove_vote_from_log, vote_from_log,
    DecodeError,
};
pub use model::{
    same_proposal_id, ApplicationEvent, Classification, Proposal, ProposalResult, RemoveVoteEvent,
    Resolution, ResolvedView, SearchReport, VoteEvent,
};
