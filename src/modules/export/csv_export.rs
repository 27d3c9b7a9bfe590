//! CSV Export
//!
//! Writes the vote history of a proposal: casts and removals in one file.

use std::path::Path;

use crate::domain::governance::{format_units, ResolvedView, DISPLAY_DECIMALS};

/// Write votes and removed votes to a CSV file
pub fn write_vote_history(
    path: &Path,
    view: &ResolvedView,
) -> Result<usize, Box<dyn std::error::Error>> {
    let mut wtr = csv::Writer::from_path(path)?;

    // Write header
    wtr.write_record([
        "proposal_id",
        "kind",
        "voter",
        "approve",
        "weight",
        "transaction_hash",
        "block_number",
    ])?;

    for vote in &view.votes {
        wtr.write_record([
            vote.proposal_id.clone(),
            "vote".to_string(),
            vote.voter.to_string(),
            vote.approve.to_string(),
            format_units(vote.weight, DISPLAY_DECIMALS),
            vote.transaction_hash.to_string(),
            block_cell(vote.block_number),
        ])?;
    }

    for removed in &view.removed_votes {
        wtr.write_record([
            removed.proposal_id.clone(),
            "remove".to_string(),
            removed.voter.to_string(),
            String::new(),
            String::new(),
            removed.transaction_hash.to_string(),
            block_cell(removed.block_number),
        ])?;
    }

    wtr.flush()?;
    Ok(view.votes.len() + view.removed_votes.len())
}

fn block_cell(block: Option<u64>) -> String {
    block.map(|n| n.to_string()).unwrap_or_default()
}
