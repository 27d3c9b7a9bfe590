use thiserror::Error;

use crate::domain::governance::DecodeError;

/// Notice shown for any failed search
pub const SEARCH_FAILED_NOTICE: &str = "Wrong Proposal ID or Address.";

/// Why a search failed
///
/// An address without applications is not an error: it resolves to an
/// empty [`crate::domain::governance::Resolution`].
#[derive(Debug, Error)]
pub enum SearchError {
    /// Fetching the applications of an address failed
    #[error("failed to look up applications for {address}")]
    Resolution {
        address: String,
        #[source]
        source: anyhow::Error,
    },

    /// One of the four concurrent fetches failed; nothing is merged
    #[error("failed to aggregate proposal {proposal_id}")]
    Aggregation {
        proposal_id: String,
        #[source]
        source: anyhow::Error,
    },

    /// The proposal record came back but could not be read
    #[error("malformed proposal record for {proposal_id}")]
    MalformedRecord {
        proposal_id: String,
        #[source]
        source: DecodeError,
    },
}

impl SearchError {
    /// The single user-facing notice for this failure
    pub fn notice(&self) -> &'static str {
        SEARCH_FAILED_NOTICE
    }
}
