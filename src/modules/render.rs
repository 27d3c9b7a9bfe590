//! Display formatting for search reports
//!
//! Shared by the TUI tables and the plain-text output of one-shot mode.

use std::fmt::{Display, Write};

use alloy_primitives::{Address, B256};
use chrono::{Local, TimeZone};

use crate::domain::governance::{
    format_units, ApplicationEvent, ResolvedView, SearchReport, DISPLAY_DECIMALS,
};

const START_TIME_FORMAT: &str = "%b %d %Y %H:%M:%S %:z";

pub fn explorer_address_url(explorer: &str, address: &Address) -> String {
    format!("{}/address/{}", explorer.trim_end_matches('/'), address)
}

pub fn explorer_tx_url(explorer: &str, hash: &B256) -> String {
    format!("{}/tx/{}", explorer.trim_end_matches('/'), hash)
}

pub fn twitter_url(username: &str) -> String {
    format!("https://twitter.com/{}", username)
}

pub fn twitter_handle(username: &str) -> String {
    format!("@{}", username)
}

pub fn yes_no(approve: bool) -> &'static str {
    if approve {
        "Yes"
    } else {
        "No"
    }
}

/// Unix seconds as `Jul 01 2019 16:53:20 +00:00` in `tz`
pub fn format_start_time_in<Tz>(secs: u64, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    i64::try_from(secs)
        .ok()
        .and_then(|secs| tz.timestamp_opt(secs, 0).single())
        .map(|time| time.format(START_TIME_FORMAT).to_string())
        .unwrap_or_else(|| secs.to_string())
}

/// Unix seconds in the local time zone
pub fn format_start_time(secs: u64) -> String {
    format_start_time_in(secs, &Local)
}

/// `#1 #7 #136` for the "proposals from address" section
pub fn proposal_refs(applications: &[ApplicationEvent]) -> String {
    applications
        .iter()
        .map(|app| format!("#{}", app.proposal_id))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Label/value rows of the proposal table
pub fn proposal_rows(view: &ResolvedView, explorer: &str) -> Vec<(&'static str, String)> {
    let proposal = &view.proposal;
    let twitter = view
        .applicant_handle()
        .map(|name| format!("{} ({})", twitter_handle(name), twitter_url(name)))
        .unwrap_or_else(|| "-".to_string());
    let result = view
        .result
        .map(|result| result.label())
        .unwrap_or_else(|| "-".to_string());

    vec![
        ("Proposal ID", view.proposal_id.clone()),
        (
            "Address",
            format!(
                "{} ({})",
                proposal.fee_recipient,
                explorer_address_url(explorer, &proposal.fee_recipient)
            ),
        ),
        ("Twitter", twitter),
        ("Starting Time", format_start_time(proposal.start_time)),
        (
            "Votes (Yes / No)",
            format!(
                "{} / {}",
                format_units(proposal.yes_count, DISPLAY_DECIMALS),
                format_units(proposal.no_count, DISPLAY_DECIMALS)
            ),
        ),
        ("Result", result),
    ]
}

/// Plain-text report, one section per table
pub fn render_text(report: &SearchReport, explorer: &str) -> String {
    let mut out = String::new();

    if let Some(resolution) = &report.resolution {
        if !resolution.applications.is_empty() {
            let _ = writeln!(out, "Proposals from Address");
            let _ = writeln!(out, "  {}", proposal_refs(&resolution.applications));
            let _ = writeln!(out);
        }
    }

    let Some(view) = &report.view else {
        let _ = writeln!(out, "No proposals found for {}", report.query);
        return out;
    };

    let _ = writeln!(out, "Proposal");
    for (label, value) in proposal_rows(view, explorer) {
        let _ = writeln!(out, "  {:<18} {}", label, value);
    }

    if !view.votes.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Vote Events");
        for vote in &view.votes {
            let _ = writeln!(
                out,
                "  {}  {}  {:<3}  {}",
                vote.transaction_hash,
                vote.voter,
                yes_no(vote.approve),
                format_units(vote.weight, DISPLAY_DECIMALS)
            );
        }
    }

    if !view.removed_votes.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "RemoveVote Events");
        for removed in &view.removed_votes {
            let _ = writeln!(out, "  {}  {}", removed.transaction_hash, removed.voter);
        }
    }

    out
}
