//! Search orchestration: classify, resolve, aggregate, normalize

use std::sync::Arc;

use crate::core::{aggregate, classify, normalize, resolve, DeploymentBlocks, SearchError};
use crate::domain::governance::{ChainClient, Classification, SearchReport};

/// Runs searches against one chain client
#[derive(Clone)]
pub struct StatusChecker {
    client: Arc<dyn ChainClient>,
    blocks: DeploymentBlocks,
}

impl StatusChecker {
    pub fn new(client: Arc<dyn ChainClient>, blocks: DeploymentBlocks) -> Self {
        Self { client, blocks }
    }

    pub fn client(&self) -> &dyn ChainClient {
        self.client.as_ref()
    }

    pub fn blocks(&self) -> DeploymentBlocks {
        self.blocks
    }

    /// Resolve `query` into a report
    ///
    /// The resolver (for addresses) finishes before aggregation starts. An
    /// address without applications succeeds with no view and aggregation is
    /// never attempted.
    pub async fn search(&self, query: &str) -> Result<SearchReport, SearchError> {
        let client = self.client.as_ref();
        let classification = classify(client, query);
        tracing::info!(query = %classification.value(), address = classification.is_address(), "search");

        let (proposal_id, resolution) = match &classification {
            Classification::Address(address) => {
                let resolution = resolve(client, &self.blocks, address).await?;
                (resolution.proposal_id.clone(), Some(resolution))
            }
            Classification::ProposalId(id) => (Some(id.clone()), None),
        };

        let view = match proposal_id {
            Some(id) => {
                let view = aggregate(client, &self.blocks, &id, classification.clone()).await?;
                Some(normalize(view))
            }
            None => None,
        };

        Ok(SearchReport {
            query: classification.value().to_string(),
            classification,
            resolution,
            view,
        })
    }
}
