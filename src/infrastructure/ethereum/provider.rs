//! Alloy-backed implementation of the read-only chain client

use std::path::PathBuf;

use alloy::network::Ethereum;
use alloy::providers::{
    fillers::{BlobGasFiller, ChainIdFiller, FillProvider, GasFiller, JoinFill, NonceFiller},
    Identity, Provider, ProviderBuilder, RootProvider,
};
use alloy::rpc::types::{Filter, Log, TransactionRequest};
use alloy_dyn_abi::{EventExt, FunctionExt, JsonAbiExt};
use alloy_json_abi::Event;
use anyhow::{bail, Context, Result};

use crate::domain::governance::{ChainClient, ContractKind, EventFilter, LogRecord, Record};
use crate::infrastructure::abi::{
    coerce_arg, encode_topic, record_from_event, record_from_outputs, ContractSet,
};

/// Provider configuration
#[derive(Debug, Clone)]
pub enum ProviderConfig {
    /// HTTP JSON-RPC endpoint
    Http(String),
    /// WebSocket endpoint
    WebSocket(String),
    /// IPC socket path (Unix only)
    #[cfg(unix)]
    Ipc(PathBuf),
}

impl ProviderConfig {
    /// Get display name for this endpoint
    pub fn display(&self) -> String {
        match self {
            ProviderConfig::Http(url) => url.clone(),
            ProviderConfig::WebSocket(url) => url.clone(),
            #[cfg(unix)]
            ProviderConfig::Ipc(path) => path.display().to_string(),
        }
    }
}

type FilledProvider = FillProvider<
    JoinFill<
        Identity,
        JoinFill<GasFiller, JoinFill<BlobGasFiller, JoinFill<NonceFiller, ChainIdFiller>>>,
    >,
    RootProvider,
    Ethereum,
>;

/// Connected transport, one variant per endpoint kind
#[derive(Debug)]
pub enum AlloyProvider {
    Http {
        provider: FilledProvider,
        endpoint: String,
    },
    WebSocket {
        provider: FilledProvider,
        endpoint: String,
    },
    #[cfg(unix)]
    Ipc {
        provider: FilledProvider,
        endpoint: String,
    },
}

// Dispatch a provider call over every transport variant
macro_rules! impl_provider_method {
    ($transport:expr, $method:ident $(, $arg:expr)*) => {
        match $transport {
            AlloyProvider::Http { provider, .. } => provider.$method($($arg),*).await,
            AlloyProvider::WebSocket { provider, .. } => provider.$method($($arg),*).await,
            #[cfg(unix)]
            AlloyProvider::Ipc { provider, .. } => provider.$method($($arg),*).await,
        }
    };
}

/// Read-only Humanity contracts over an alloy provider
#[derive(Debug)]
pub struct AlloyChainClient {
    transport: AlloyProvider,
    contracts: ContractSet,
}

/// Connect to `config` and bind the contract set
pub async fn create_chain_client(
    config: ProviderConfig,
    contracts: ContractSet,
) -> Result<AlloyChainClient> {
    let transport = match config {
        ProviderConfig::Http(url) => {
            let rpc_url = url.parse().context("Invalid HTTP URL")?;
            let provider = ProviderBuilder::new().connect_http(rpc_url);
            AlloyProvider::Http {
                provider,
                endpoint: url,
            }
        }
        ProviderConfig::WebSocket(url) => {
            let provider = ProviderBuilder::new()
                .connect(&url)
                .await
                .context("Failed to create WebSocket provider")?;
            AlloyProvider::WebSocket {
                provider,
                endpoint: url,
            }
        }
        #[cfg(unix)]
        ProviderConfig::Ipc(path) => {
            use alloy::providers::IpcConnect;
            let ipc = IpcConnect::new(path.to_string_lossy().to_string());
            let provider = ProviderBuilder::new()
                .connect_ipc(ipc)
                .await
                .context("Failed to create IPC provider")?;
            AlloyProvider::Ipc {
                provider,
                endpoint: path.display().to_string(),
            }
        }
    };

    Ok(AlloyChainClient {
        transport,
        contracts,
    })
}

impl AlloyChainClient {
    /// Current chain head; also serves as a connectivity check
    pub async fn head_block(&self) -> Result<u64> {
        Ok(impl_provider_method!(&self.transport, get_block_number)?)
    }

    pub fn endpoint_name(&self) -> String {
        match &self.transport {
            AlloyProvider::Http { endpoint, .. } => endpoint.clone(),
            AlloyProvider::WebSocket { endpoint, .. } => endpoint.clone(),
            #[cfg(unix)]
            AlloyProvider::Ipc { endpoint, .. } => endpoint.clone(),
        }
    }

    pub fn contracts(&self) -> &ContractSet {
        &self.contracts
    }
}

#[async_trait::async_trait]
impl ChainClient for AlloyChainClient {
    async fn call_read_only(
        &self,
        contract: ContractKind,
        method: &str,
        args: &[String],
    ) -> Result<Record> {
        let function = self.contracts.function(contract, method)?;
        if function.inputs.len() != args.len() {
            bail!(
                "{} expects {} argument(s), got {}",
                function.signature(),
                function.inputs.len(),
                args.len()
            );
        }

        let values = function
            .inputs
            .iter()
            .zip(args)
            .map(|(param, raw)| {
                coerce_arg(&param.ty, raw)
                    .with_context(|| format!("argument '{}' of {}", param.name, method))
            })
            .collect::<Result<Vec<_>>>()?;
        let calldata = function
            .abi_encode_input(&values)
            .context("Failed to encode call")?;

        let request = TransactionRequest::default()
            .to(self.contracts.get(contract).address)
            .input(calldata.into());
        let output = impl_provider_method!(&self.transport, call, request)
            .with_context(|| format!("{}.{} reverted or failed", contract.name(), method))?;

        let decoded = function
            .abi_decode_output(&output)
            .with_context(|| format!("Failed to decode {} output", method))?;
        Ok(record_from_outputs(&function.outputs, &decoded))
    }

    async fn get_past_events(
        &self,
        contract: ContractKind,
        event_name: &str,
        filter: &EventFilter,
        from_block: u64,
    ) -> Result<Vec<LogRecord>> {
        let event = self.contracts.event(contract, event_name)?;
        let log_filter = build_filter(
            self.contracts.get(contract).address,
            event,
            filter,
            from_block,
        )?;

        let logs: Vec<Log> = impl_provider_method!(&self.transport, get_logs, &log_filter)
            .with_context(|| format!("Failed to fetch {} logs", event_name))?;
        tracing::debug!(
            contract = contract.name(),
            event = event_name,
            from_block,
            count = logs.len(),
            "fetched logs"
        );

        Ok(logs
            .iter()
            .filter_map(|log| match decode_log(event, log) {
                Ok(record) => Some(record),
                Err(err) => {
                    tracing::warn!(
                        event = event_name,
                        tx = ?log.transaction_hash,
                        error = %err,
                        "skipping undecodable log"
                    );
                    None
                }
            })
            .collect())
    }
}

/// Address + topic0 + one topic per filtered indexed field
fn build_filter(
    address: alloy_primitives::Address,
    event: &Event,
    filter: &EventFilter,
    from_block: u64,
) -> Result<Filter> {
    let mut log_filter = Filter::new()
        .address(address)
        .event_signature(event.selector())
        .from_block(from_block);

    for (field, value) in filter {
        let (position, param) = event
            .inputs
            .iter()
            .filter(|p| p.indexed)
            .enumerate()
            .find(|(_, p)| p.name == *field)
            .with_context(|| format!("{} has no indexed field '{}'", event.name, field))?;
        let topic = encode_topic(&param.ty, value)
            .with_context(|| format!("filter value for '{}'", field))?;
        log_filter = match position {
            0 => log_filter.topic1(topic),
            1 => log_filter.topic2(topic),
            2 => log_filter.topic3(topic),
            _ => bail!("{} has more than three indexed fields", event.name),
        };
    }

    Ok(log_filter)
}

fn decode_log(event: &Event, log: &Log) -> Result<LogRecord> {
    let decoded = event
        .decode_log_parts(log.topics().iter().copied(), log.data().data.as_ref())
        .context("Failed to decode log")?;
    Ok(LogRecord {
        transaction_hash: log.transaction_hash,
        block_number: log.block_number,
        fields: record_from_event(event, &decoded),
    })
}
