//! Infrastructure layer - External service integrations
//!
//! This layer contains:
//! - The alloy-backed chain client
//! - Contract ABIs, truffle artifacts and alloy-dyn-abi conversions
//! - Tokio runtime bridge for the TUI

pub mod abi;
pub mod ethereum;
pub mod runtime;

pub use ethereum::{create_chain_client, AlloyChainClient, ProviderConfig};
pub use runtime::{RuntimeBridge, RuntimeCommand, RuntimeEvent};
