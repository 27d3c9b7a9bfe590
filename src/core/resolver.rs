//! Address -> proposal identifier resolution

use crate::core::{DeploymentBlocks, SearchError};
use crate::domain::governance::{
    application_from_log, decode_logs, ChainClient, ContractKind, EventFilter, Resolution,
    APPLY_EVENT,
};

/// Find the applications made by `address`
///
/// The last application in source order is taken as authoritative. This
/// relies on `eth_getLogs` returning logs in ascending block order; events are
/// not re-sorted here.
pub async fn resolve(
    client: &dyn ChainClient,
    blocks: &DeploymentBlocks,
    address: &str,
) -> Result<Resolution, SearchError> {
    let mut filter = EventFilter::new();
    filter.insert("applicant".to_string(), address.to_string());

    let logs = client
        .get_past_events(ContractKind::Applicant, APPLY_EVENT, &filter, blocks.applicant)
        .await
        .map_err(|source| SearchError::Resolution {
            address: address.to_string(),
            source,
        })?;

    let applications = decode_logs(APPLY_EVENT, logs, application_from_log);
    let proposal_id = applications.last().map(|app| app.proposal_id.clone());

    match &proposal_id {
        Some(id) => tracing::debug!(
            address,
            proposal_id = %id,
            applications = applications.len(),
            "resolved address"
        ),
        None => tracing::info!(address, "address has no applications"),
    }

    Ok(Resolution {
        proposal_id,
        applications,
    })
}
