//! Runtime bridge - connects the sync TUI thread with an async Tokio worker
//!
//! The TUI owns the search state; the worker only runs searches and hands
//! back outcomes tagged with the ticket they were issued under.

use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use crate::core::{DeploymentBlocks, SearchError, SearchTicket};
use crate::domain::governance::SearchReport;
use crate::infrastructure::abi::ContractSet;
use crate::infrastructure::ethereum::ProviderConfig;
use crate::infrastructure::runtime::worker::run_async_worker;

/// Commands sent from the TUI to the async worker
#[derive(Debug, Clone)]
pub enum RuntimeCommand {
    /// Run a search issued under `ticket`
    Search { ticket: SearchTicket, query: String },
    /// Switch to a different endpoint
    SwitchEndpoint { index: usize },
    /// Shutdown the worker
    Shutdown,
}

/// Events sent from the async worker to the TUI
#[derive(Debug)]
pub enum RuntimeEvent {
    /// Successfully connected to a node
    Connected { endpoint: String, head_block: u64 },
    /// A search finished, successfully or not
    SearchSettled {
        ticket: SearchTicket,
        outcome: Result<SearchReport, SearchError>,
    },
    /// Error occurred
    Error { message: String },
}

/// Bridge between sync TUI thread and async Tokio runtime
pub struct RuntimeBridge {
    cmd_tx: Sender<RuntimeCommand>,
    evt_rx: Receiver<RuntimeEvent>,
}

impl RuntimeBridge {
    /// Spawn the worker thread for the given endpoints and contracts
    pub fn new(
        endpoints: Vec<ProviderConfig>,
        contracts: ContractSet,
        blocks: DeploymentBlocks,
    ) -> anyhow::Result<Self> {
        let (cmd_tx, cmd_rx) = mpsc::channel::<RuntimeCommand>();
        let (evt_tx, evt_rx) = mpsc::channel::<RuntimeEvent>();

        // Single-threaded runtime: searches interleave at await points only
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        thread::Builder::new()
            .name("humanity-worker".into())
            .spawn(move || {
                rt.block_on(async {
                    if let Err(err) =
                        run_async_worker(endpoints, contracts, blocks, cmd_rx, evt_tx.clone()).await
                    {
                        let _ = evt_tx.send(RuntimeEvent::Error {
                            message: format!("Worker exited: {:#}", err),
                        });
                    }
                });
            })?;

        Ok(Self { cmd_tx, evt_rx })
    }

    /// Send a command to the async worker
    pub fn send(&self, cmd: RuntimeCommand) -> anyhow::Result<()> {
        self.cmd_tx
            .send(cmd)
            .map_err(|_| anyhow::anyhow!("Worker channel closed"))
    }

    /// Poll for events (non-blocking)
    pub fn poll_events(&self) -> Vec<RuntimeEvent> {
        let mut events = Vec::new();
        while let Ok(evt) = self.evt_rx.try_recv() {
            events.push(evt);
        }
        events
    }
}

impl Drop for RuntimeBridge {
    fn drop(&mut self) {
        let _ = self.cmd_tx.send(RuntimeCommand::Shutdown);
    }
}
