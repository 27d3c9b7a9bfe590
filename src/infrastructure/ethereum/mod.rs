//! Ethereum infrastructure - Alloy provider implementations

mod provider;

pub use provider::{create_chain_client, AlloyChainClient, AlloyProvider, ProviderConfig};
