//! Concurrent fetch and merge of one proposal

use crate::core::{DeploymentBlocks, SearchError};
use crate::domain::governance::{
    application_from_log, decode_logs, proposal_from_record, remove_vote_from_log,
    same_proposal_id, vote_from_log, ChainClient, Classification, ContractKind, EventFilter,
    ResolvedView, APPLY_EVENT, GET_PROPOSAL, REMOVE_VOTE_EVENT, VOTE_EVENT,
};

/// Fetch the proposal record and its three event streams, then merge them
///
/// The four requests run concurrently and are joined fail-fast: if any one
/// fails the whole aggregation fails and the other results are dropped.
pub async fn aggregate(
    client: &dyn ChainClient,
    blocks: &DeploymentBlocks,
    proposal_id: &str,
    classification: Classification,
) -> Result<ResolvedView, SearchError> {
    let args = [proposal_id.to_string()];
    let mut by_id = EventFilter::new();
    by_id.insert("proposalId".to_string(), proposal_id.to_string());

    let (record, vote_logs, remove_logs, apply_logs) = futures::try_join!(
        client.call_read_only(ContractKind::Governance, GET_PROPOSAL, &args),
        client.get_past_events(
            ContractKind::Governance,
            VOTE_EVENT,
            &by_id,
            blocks.governance
        ),
        client.get_past_events(
            ContractKind::Governance,
            REMOVE_VOTE_EVENT,
            &by_id,
            blocks.governance
        ),
        client.get_past_events(
            ContractKind::Applicant,
            APPLY_EVENT,
            &by_id,
            blocks.applicant
        ),
    )
    .map_err(|source| SearchError::Aggregation {
        proposal_id: proposal_id.to_string(),
        source,
    })?;

    // Stamped with the queried identifier, not anything the contract returns
    let proposal = proposal_from_record(proposal_id, &record).map_err(|source| {
        SearchError::MalformedRecord {
            proposal_id: proposal_id.to_string(),
            source,
        }
    })?;

    let mut votes = decode_logs(VOTE_EVENT, vote_logs, vote_from_log);
    let mut removed_votes = decode_logs(REMOVE_VOTE_EVENT, remove_logs, remove_vote_from_log);
    let mut applications = decode_logs(APPLY_EVENT, apply_logs, application_from_log);

    retain_matching(VOTE_EVENT, proposal_id, &mut votes, |e| &e.proposal_id);
    retain_matching(REMOVE_VOTE_EVENT, proposal_id, &mut removed_votes, |e| &e.proposal_id);
    retain_matching(APPLY_EVENT, proposal_id, &mut applications, |e| &e.proposal_id);

    tracing::debug!(
        proposal_id,
        votes = votes.len(),
        removed_votes = removed_votes.len(),
        applications = applications.len(),
        "aggregated proposal"
    );

    Ok(ResolvedView {
        proposal_id: proposal_id.to_string(),
        classification,
        proposal,
        applications,
        votes,
        removed_votes,
        result: None,
    })
}

/// Drop events that belong to another proposal
fn retain_matching<T>(
    event: &str,
    proposal_id: &str,
    events: &mut Vec<T>,
    id_of: impl Fn(&T) -> &String,
) {
    let before = events.len();
    events.retain(|e| same_proposal_id(id_of(e), proposal_id));
    let dropped = before - events.len();
    if dropped > 0 {
        tracing::warn!(event, proposal_id, dropped, "source returned events for another proposal");
    }
}
