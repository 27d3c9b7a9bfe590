//! Resolution and aggregation engine

mod aggregator;
mod classifier;
mod error;
mod normalizer;
mod resolver;
mod search;
mod state;

pub use aggregator::aggregate;
pub use classifier::classify;
pub use error::{SearchError, SEARCH_FAILED_NOTICE};
pub use normalizer::normalize;
pub use resolver::resolve;
pub use search::StatusChecker;
pub use state::{SearchPhase, SearchState, SearchTicket, Settlement};

/// Lower-bound blocks for event fetches, fixed per deployment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeploymentBlocks {
    /// Vote and RemoveVote events
    pub governance: u64,
    /// Apply events
    pub applicant: u64,
}

impl DeploymentBlocks {
    /// Mainnet deployment heights
    pub const MAINNET: DeploymentBlocks = DeploymentBlocks {
        governance: 7_723_872,
        applicant: 7_723_946,
    };
}

impl Default for DeploymentBlocks {
    fn default() -> Self {
        Self::MAINNET
    }
}
