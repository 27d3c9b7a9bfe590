//! JSON Export
//!
//! Serializes a search report with addresses, hashes and amounts as strings.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use chrono::{TimeZone, Utc};
use serde::Serialize;

use crate::domain::governance::{
    format_units, ApplicationEvent, RemoveVoteEvent, ResolvedView, SearchReport, VoteEvent,
    DISPLAY_DECIMALS,
};

#[derive(Serialize)]
pub struct ExportableReport {
    query: String,
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    proposals_from_address: Option<Vec<ExportableApplication>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    proposal: Option<ExportableProposal>,
}

#[derive(Serialize)]
struct ExportableProposal {
    id: String,
    result: String,
    result_code: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    applicant: Option<String>,
    fee_recipient: String,
    start_time: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    start_time_utc: Option<String>,
    yes_count: String,
    no_count: String,
    applications: Vec<ExportableApplication>,
    votes: Vec<ExportableVote>,
    removed_votes: Vec<ExportableRemoval>,
}

#[derive(Serialize)]
struct ExportableApplication {
    proposal_id: String,
    applicant: String,
    username: String,
    transaction_hash: String,
    block_number: u64,
}

#[derive(Serialize)]
struct ExportableVote {
    voter: String,
    approve: bool,
    weight: String,
    transaction_hash: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    block_number: Option<u64>,
}

#[derive(Serialize)]
struct ExportableRemoval {
    voter: String,
    transaction_hash: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    block_number: Option<u64>,
}

impl From<&ApplicationEvent> for ExportableApplication {
    fn from(app: &ApplicationEvent) -> Self {
        Self {
            proposal_id: app.proposal_id.clone(),
            applicant: app.applicant.to_string(),
            username: app.username.clone(),
            transaction_hash: app.transaction_hash.to_string(),
            block_number: app.block_number,
        }
    }
}

impl From<&VoteEvent> for ExportableVote {
    fn from(vote: &VoteEvent) -> Self {
        Self {
            voter: vote.voter.to_string(),
            approve: vote.approve,
            weight: format_units(vote.weight, DISPLAY_DECIMALS),
            transaction_hash: vote.transaction_hash.to_string(),
            block_number: vote.block_number,
        }
    }
}

impl From<&RemoveVoteEvent> for ExportableRemoval {
    fn from(removed: &RemoveVoteEvent) -> Self {
        Self {
            voter: removed.voter.to_string(),
            transaction_hash: removed.transaction_hash.to_string(),
            block_number: removed.block_number,
        }
    }
}

impl From<&ResolvedView> for ExportableProposal {
    fn from(view: &ResolvedView) -> Self {
        let proposal = &view.proposal;
        let start_time_utc = i64::try_from(proposal.start_time)
            .ok()
            .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
            .map(|time| time.to_rfc3339());
        Self {
            id: view.proposal_id.clone(),
            result: view
                .result
                .map(|result| result.label())
                .unwrap_or_default(),
            result_code: proposal.result_code,
            applicant: view.applicant_handle().map(str::to_string),
            fee_recipient: proposal.fee_recipient.to_string(),
            start_time: proposal.start_time,
            start_time_utc,
            yes_count: format_units(proposal.yes_count, DISPLAY_DECIMALS),
            no_count: format_units(proposal.no_count, DISPLAY_DECIMALS),
            applications: view.applications.iter().map(Into::into).collect(),
            votes: view.votes.iter().map(Into::into).collect(),
            removed_votes: view.removed_votes.iter().map(Into::into).collect(),
        }
    }
}

impl From<&SearchReport> for ExportableReport {
    fn from(report: &SearchReport) -> Self {
        Self {
            query: report.query.clone(),
            kind: if report.classification.is_address() {
                "address"
            } else {
                "proposal_id"
            },
            proposals_from_address: report
                .resolution
                .as_ref()
                .map(|res| res.applications.iter().map(Into::into).collect()),
            proposal: report.view.as_ref().map(Into::into),
        }
    }
}

/// Pretty JSON for a report
pub fn report_json(report: &SearchReport) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&ExportableReport::from(report))
}

/// Write a report to a JSON file
pub fn write_report(path: &Path, report: &SearchReport) -> Result<(), Box<dyn std::error::Error>> {
    let json = report_json(report)?;

    let mut file = File::create(path)?;
    file.write_all(json.as_bytes())?;

    Ok(())
}
