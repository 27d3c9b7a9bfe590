//! Search state container
//!
//! Holds the one shared "current view" and the lifecycle of the search that
//! feeds it. Every search gets a generation ticket; a settled search is only
//! applied if no newer search has been issued since ("last issued wins").

use crate::core::SearchError;
use crate::domain::governance::{Classification, Resolution, ResolvedView, SearchReport};

/// Token identifying one issued search
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SearchTicket(u64);

impl SearchTicket {
    pub fn generation(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchPhase {
    Idle,
    Searching,
}

/// What happened when a search settled
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settlement {
    /// The report replaced the displayed state
    Applied,
    /// The search failed; the displayed state was kept
    Failed { notice: String },
    /// A newer search was issued; the result was dropped
    Discarded,
}

#[derive(Debug, Default)]
pub struct SearchState {
    query: String,
    classification: Option<Classification>,
    resolution: Option<Resolution>,
    view: Option<ResolvedView>,
    last_error: Option<String>,
    in_flight: bool,
    issued: u64,
}

impl SearchState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a new search, superseding any in flight
    pub fn begin(&mut self, query: &str) -> SearchTicket {
        self.issued += 1;
        self.query = query.trim().to_string();
        self.in_flight = true;
        self.last_error = None;
        SearchTicket(self.issued)
    }

    /// Apply the outcome of the search identified by `ticket`
    pub fn settle(
        &mut self,
        ticket: SearchTicket,
        outcome: Result<SearchReport, SearchError>,
    ) -> Settlement {
        if ticket.0 != self.issued {
            tracing::debug!(
                generation = ticket.0,
                latest = self.issued,
                "discarding stale search result"
            );
            return Settlement::Discarded;
        }

        self.in_flight = false;
        match outcome {
            Ok(report) => {
                self.classification = Some(report.classification);
                self.resolution = report.resolution;
                self.view = report.view;
                Settlement::Applied
            }
            Err(err) => {
                tracing::warn!(generation = ticket.0, error = ?err, "search failed");
                let notice = err.notice().to_string();
                self.last_error = Some(notice.clone());
                Settlement::Failed { notice }
            }
        }
    }

    pub fn phase(&self) -> SearchPhase {
        if self.in_flight {
            SearchPhase::Searching
        } else {
            SearchPhase::Idle
        }
    }

    pub fn is_searching(&self) -> bool {
        self.in_flight
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn classification(&self) -> Option<&Classification> {
        self.classification.as_ref()
    }

    /// Applications of the last searched address, empty for identifier queries
    pub fn address_applications(&self) -> &[crate::domain::governance::ApplicationEvent] {
        self.resolution
            .as_ref()
            .map(|res| res.applications.as_slice())
            .unwrap_or(&[])
    }

    pub fn resolution(&self) -> Option<&Resolution> {
        self.resolution.as_ref()
    }

    pub fn view(&self) -> Option<&ResolvedView> {
        self.view.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// The displayed state as a report, once a search has been applied
    pub fn report(&self) -> Option<SearchReport> {
        let classification = self.classification.clone()?;
        Some(SearchReport {
            query: classification.value().to_string(),
            classification,
            resolution: self.resolution.clone(),
            view: self.view.clone(),
        })
    }

    pub fn latest_ticket(&self) -> Option<SearchTicket> {
        (self.issued > 0).then_some(SearchTicket(self.issued))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::governance::{Proposal, ResolvedView};
    use alloy_primitives::{Address, U256};

    fn report(id: &str) -> SearchReport {
        let classification = Classification::ProposalId(id.to_string());
        SearchReport {
            query: id.to_string(),
            classification: classification.clone(),
            resolution: None,
            view: Some(ResolvedView {
                proposal_id: id.to_string(),
                classification,
                proposal: Proposal {
                    id: id.to_string(),
                    result_code: 0,
                    target: None,
                    proposer: None,
                    fee_recipient: Address::ZERO,
                    fee: None,
                    start_time: 0,
                    yes_count: U256::ZERO,
                    no_count: U256::ZERO,
                },
                applications: vec![],
                votes: vec![],
                removed_votes: vec![],
                result: None,
            }),
        }
    }

    fn failure(id: &str) -> SearchError {
        SearchError::Aggregation {
            proposal_id: id.to_string(),
            source: anyhow::anyhow!("execution reverted"),
        }
    }

    #[test]
    fn test_lifecycle() {
        let mut state = SearchState::new();
        assert_eq!(state.phase(), SearchPhase::Idle);
        assert_eq!(state.latest_ticket(), None);

        let ticket = state.begin(" 136 ");
        assert_eq!(state.phase(), SearchPhase::Searching);
        assert_eq!(state.query(), "136");

        assert_eq!(state.settle(ticket, Ok(report("136"))), Settlement::Applied);
        assert_eq!(state.phase(), SearchPhase::Idle);
        assert_eq!(state.view().map(|v| v.proposal_id.as_str()), Some("136"));
    }

    #[test]
    fn test_failure_keeps_previous_view() {
        let mut state = SearchState::new();
        let first = state.begin("136");
        state.settle(first, Ok(report("136")));

        let second = state.begin("999999");
        let settled = state.settle(second, Err(failure("999999")));
        assert_eq!(
            settled,
            Settlement::Failed {
                notice: "Wrong Proposal ID or Address.".to_string()
            }
        );
        assert!(!state.is_searching());
        assert_eq!(state.view().map(|v| v.proposal_id.as_str()), Some("136"));
        assert_eq!(state.last_error(), Some("Wrong Proposal ID or Address."));
    }

    #[test]
    fn test_stale_result_is_discarded() {
        let mut state = SearchState::new();
        let older = state.begin("136");
        let newer = state.begin("200");
        assert!(newer > older);

        assert_eq!(state.settle(newer, Ok(report("200"))), Settlement::Applied);
        assert_eq!(state.settle(older, Ok(report("136"))), Settlement::Discarded);
        assert_eq!(state.view().map(|v| v.proposal_id.as_str()), Some("200"));
    }

    #[test]
    fn test_stale_result_does_not_clear_in_flight() {
        let mut state = SearchState::new();
        let older = state.begin("136");
        let _newer = state.begin("200");

        assert_eq!(state.settle(older, Err(failure("136"))), Settlement::Discarded);
        assert!(state.is_searching());
        assert_eq!(state.last_error(), None);
    }
}
