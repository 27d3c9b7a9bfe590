//! Typed decoding of facade records
//!
//! Log records are loosely shaped maps. Every required field is checked here;
//! malformed records are logged and dropped instead of being read unchecked.

use alloy_primitives::{Address, U256};
use thiserror::Error;

use super::chain::{LogRecord, Record};
use super::model::{ApplicationEvent, Proposal, RemoveVoteEvent, VoteEvent};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("missing field `{0}`")]
    MissingField(&'static str),

    #[error("field `{field}` should be {expected}, got {actual}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("field `{0}` out of range")]
    OutOfRange(&'static str),

    #[error("log has no transaction hash")]
    MissingTransactionHash,

    #[error("log has no block number")]
    MissingBlockNumber,
}

fn uint(record: &Record, field: &'static str) -> Result<U256, DecodeError> {
    let value = record.get(field).ok_or(DecodeError::MissingField(field))?;
    value.as_uint().ok_or(DecodeError::WrongType {
        field,
        expected: "uint",
        actual: value.kind(),
    })
}

fn address(record: &Record, field: &'static str) -> Result<Address, DecodeError> {
    let value = record.get(field).ok_or(DecodeError::MissingField(field))?;
    value.as_address().ok_or(DecodeError::WrongType {
        field,
        expected: "address",
        actual: value.kind(),
    })
}

fn boolean(record: &Record, field: &'static str) -> Result<bool, DecodeError> {
    let value = record.get(field).ok_or(DecodeError::MissingField(field))?;
    value.as_bool().ok_or(DecodeError::WrongType {
        field,
        expected: "bool",
        actual: value.kind(),
    })
}

fn text(record: &Record, field: &'static str) -> Result<String, DecodeError> {
    let value = record.get(field).ok_or(DecodeError::MissingField(field))?;
    value
        .as_text()
        .map(str::to_string)
        .ok_or(DecodeError::WrongType {
            field,
            expected: "string",
            actual: value.kind(),
        })
}

fn small_uint<T: TryFrom<u64>>(record: &Record, field: &'static str) -> Result<T, DecodeError> {
    let value = uint(record, field)?;
    if value > U256::from(u64::MAX) {
        return Err(DecodeError::OutOfRange(field));
    }
    T::try_from(value.to::<u64>()).map_err(|_| DecodeError::OutOfRange(field))
}

/// Build a [`Proposal`] from the `getProposal` outputs
///
/// `id` is the canonical identifier of the query; the contract struct does
/// not carry one.
pub fn proposal_from_record(id: &str, record: &Record) -> Result<Proposal, DecodeError> {
    Ok(Proposal {
        id: id.to_string(),
        result_code: small_uint::<u8>(record, "result")?,
        target: address(record, "target").ok(),
        proposer: address(record, "proposer").ok(),
        fee_recipient: address(record, "feeRecipient")?,
        fee: uint(record, "fee").ok(),
        start_time: small_uint::<u64>(record, "startTime")?,
        yes_count: uint(record, "yesCount")?,
        no_count: uint(record, "noCount")?,
    })
}

pub fn application_from_log(log: &LogRecord) -> Result<ApplicationEvent, DecodeError> {
    Ok(ApplicationEvent {
        proposal_id: uint(&log.fields, "proposalId")?.to_string(),
        applicant: address(&log.fields, "applicant")?,
        username: text(&log.fields, "username")?,
        transaction_hash: log
            .transaction_hash
            .ok_or(DecodeError::MissingTransactionHash)?,
        block_number: log.block_number.ok_or(DecodeError::MissingBlockNumber)?,
    })
}

pub fn vote_from_log(log: &LogRecord) -> Result<VoteEvent, DecodeError> {
    Ok(VoteEvent {
        proposal_id: uint(&log.fields, "proposalId")?.to_string(),
        voter: address(&log.fields, "voter")?,
        approve: boolean(&log.fields, "approve")?,
        weight: uint(&log.fields, "weight")?,
        transaction_hash: log
            .transaction_hash
            .ok_or(DecodeError::MissingTransactionHash)?,
        block_number: log.block_number,
    })
}

pub fn remove_vote_from_log(log: &LogRecord) -> Result<RemoveVoteEvent, DecodeError> {
    Ok(RemoveVoteEvent {
        proposal_id: uint(&log.fields, "proposalId")?.to_string(),
        voter: address(&log.fields, "voter")?,
        transaction_hash: log
            .transaction_hash
            .ok_or(DecodeError::MissingTransactionHash)?,
        block_number: log.block_number,
    })
}

/// Decode every log, dropping (and logging) the malformed ones
pub fn decode_logs<T>(
    event: &str,
    logs: Vec<LogRecord>,
    decode: fn(&LogRecord) -> Result<T, DecodeError>,
) -> Vec<T> {
    let total = logs.len();
    let decoded: Vec<T> = logs
        .iter()
        .filter_map(|log| match decode(log) {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::warn!(
                    event,
                    tx = ?log.transaction_hash,
                    block = ?log.block_number,
                    error = %err,
                    "dropping malformed log"
                );
                None
            }
        })
        .collect();
    if decoded.len() != total {
        tracing::debug!(event, total, kept = decoded.len(), "decoded logs");
    }
    decoded
}
