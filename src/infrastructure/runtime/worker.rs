//! Async worker - owns the chain connection and runs searches

use std::sync::mpsc::{Receiver, Sender};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

use crate::core::{DeploymentBlocks, SearchTicket, StatusChecker};
use crate::infrastructure::abi::ContractSet;
use crate::infrastructure::ethereum::{create_chain_client, ProviderConfig};
use crate::infrastructure::runtime::bridge::{RuntimeCommand, RuntimeEvent};

/// Run the async worker loop
///
/// Searches are spawned as independent tasks and never cancelled; the TUI
/// decides which outcome to keep by ticket. Searches issued while
/// disconnected wait until a connection is up.
pub async fn run_async_worker(
    endpoints: Vec<ProviderConfig>,
    contracts: ContractSet,
    blocks: DeploymentBlocks,
    cmd_rx: Receiver<RuntimeCommand>,
    evt_tx: Sender<RuntimeEvent>,
) -> Result<()> {
    if endpoints.is_empty() {
        anyhow::bail!("No endpoints configured");
    }

    let mut endpoint_index = 0usize;
    let mut checker: Option<StatusChecker> = None;
    let mut pending: Vec<(SearchTicket, String)> = Vec::new();

    loop {
        // Process commands (non-blocking)
        while let Ok(cmd) = cmd_rx.try_recv() {
            match cmd {
                RuntimeCommand::Shutdown => return Ok(()),

                RuntimeCommand::SwitchEndpoint { index } => {
                    if index >= endpoints.len() {
                        let _ = evt_tx.send(RuntimeEvent::Error {
                            message: format!(
                                "Invalid endpoint index {} ({} total)",
                                index,
                                endpoints.len()
                            ),
                        });
                        continue;
                    }
                    endpoint_index = index;
                    checker = None;
                }

                RuntimeCommand::Search { ticket, query } => pending.push((ticket, query)),
            }
        }

        if checker.is_none() {
            let config = endpoints[endpoint_index].clone();
            match connect_to_endpoint(config.clone(), contracts.clone(), blocks, &evt_tx).await {
                Ok(connected) => checker = Some(connected),
                Err(err) => {
                    tracing::warn!(endpoint = %config.display(), error = %err, "connection failed");
                    let _ = evt_tx.send(RuntimeEvent::Error {
                        message: format!("Connection failed ({}): {:#}", config.display(), err),
                    });

                    // Try next endpoint if available
                    if endpoints.len() > 1 {
                        endpoint_index = (endpoint_index + 1) % endpoints.len();
                    }

                    tokio::time::sleep(Duration::from_millis(900)).await;
                    continue;
                }
            }
        }

        if let Some(checker) = checker.as_ref() {
            for (ticket, query) in pending.drain(..) {
                let checker = checker.clone();
                let evt_tx = evt_tx.clone();
                tokio::spawn(async move {
                    let outcome = checker.search(&query).await;
                    if let Err(err) = &outcome {
                        tracing::warn!(generation = ticket.generation(), error = %err, "search failed");
                    }
                    let _ = evt_tx.send(RuntimeEvent::SearchSettled { ticket, outcome });
                });
            }
        }

        // Small yield to prevent busy loop
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

/// Connect to an endpoint and wrap it in a checker
async fn connect_to_endpoint(
    config: ProviderConfig,
    contracts: ContractSet,
    blocks: DeploymentBlocks,
    evt_tx: &Sender<RuntimeEvent>,
) -> Result<StatusChecker> {
    let client = create_chain_client(config, contracts).await?;
    let head_block = client.head_block().await?;
    let endpoint = client.endpoint_name();
    tracing::info!(%endpoint, head_block, "connected");

    let _ = evt_tx.send(RuntimeEvent::Connected {
        endpoint,
        head_block,
    });

    Ok(StatusChecker::new(Arc::new(client), blocks))
}
