use std::time::{Duration, Instant};

use humanity_status::core::{SearchError, SearchState, SearchTicket, Settlement};
use humanity_status::domain::governance::SearchReport;

const SPINNER_FRAMES: [&str; 4] = ["|", "/", "-", "\\"];

/// Tables that can hold the selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Applications,
    Votes,
    RemovedVotes,
}

impl Focus {
    pub const ALL: [Focus; 3] = [Focus::Applications, Focus::Votes, Focus::RemovedVotes];

    pub fn title(&self) -> &'static str {
        match self {
            Focus::Applications => "Applications",
            Focus::Votes => "Vote Events",
            Focus::RemovedVotes => "RemoveVote Events",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Warn,
    Error,
}

#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub text: String,
    pub level: StatusLevel,
    pub since: Instant,
    /// Stays until the next keypress or search instead of expiring
    pub sticky: bool,
}

#[derive(Debug, Clone)]
pub struct RpcEndpointOption {
    pub label: String,
    pub display: String,
}

#[derive(Debug)]
pub struct App {
    pub search: SearchState,
    pub input: String,
    pub input_mode: InputMode,
    pub focus: Focus,
    pub selected_application: usize,
    pub selected_vote: usize,
    pub selected_removed_vote: usize,
    pub explorer_url: String,
    pub rpc_endpoint: String,
    pub rpc_endpoints: Vec<RpcEndpointOption>,
    pub rpc_endpoint_index: usize,
    pub head_block: Option<u64>,
    pub status: Option<StatusMessage>,
    pub pending_searches: Vec<(SearchTicket, String)>,
    pub pending_endpoint_switch: Option<usize>,
    pub help_open: bool,
    pub should_quit: bool,
    spinner_frame: usize,
}

impl App {
    pub fn new(explorer_url: String) -> Self {
        Self {
            search: SearchState::new(),
            input: String::new(),
            input_mode: InputMode::Normal,
            focus: Focus::Votes,
            selected_application: 0,
            selected_vote: 0,
            selected_removed_vote: 0,
            explorer_url,
            rpc_endpoint: "localhost:8545".to_string(),
            rpc_endpoints: Vec::new(),
            rpc_endpoint_index: 0,
            head_block: None,
            status: None,
            pending_searches: Vec::new(),
            pending_endpoint_switch: None,
            help_open: false,
            should_quit: false,
            spinner_frame: 0,
        }
    }

    pub fn set_status(&mut self, text: impl Into<String>, level: StatusLevel) {
        self.status = Some(StatusMessage {
            text: text.into(),
            level,
            since: Instant::now(),
            sticky: false,
        });
    }

    /// Failure notice for a search; held until acknowledged
    pub fn set_notice(&mut self, text: impl Into<String>) {
        self.status = Some(StatusMessage {
            text: text.into(),
            level: StatusLevel::Error,
            since: Instant::now(),
            sticky: true,
        });
    }

    pub fn has_notice(&self) -> bool {
        self.status.as_ref().is_some_and(|status| status.sticky)
    }

    /// Clear a held notice; returns whether there was one
    pub fn dismiss_notice(&mut self) -> bool {
        if self.has_notice() {
            self.status = None;
            return true;
        }
        false
    }

    pub fn status_text(&self) -> Option<(&str, StatusLevel)> {
        self.status
            .as_ref()
            .map(|status| (status.text.as_str(), status.level))
    }

    pub fn on_tick(&mut self) {
        if let Some(status) = self.status.as_ref() {
            if !status.sticky && status.since.elapsed() > Duration::from_secs(3) {
                self.status = None;
            }
        }
        if self.search.is_searching() {
            self.spinner_frame = (self.spinner_frame + 1) % SPINNER_FRAMES.len();
        }
        self.clamp_all_selections();
    }

    pub fn spinner(&self) -> &'static str {
        SPINNER_FRAMES[self.spinner_frame]
    }

    pub fn enter_editing(&mut self) {
        self.input_mode = InputMode::Editing;
        self.input = self.search.query().to_string();
    }

    pub fn exit_editing(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    /// Submit the input line as a new search
    pub fn submit_search(&mut self) {
        self.input_mode = InputMode::Normal;
        let query = self.input.trim().to_string();
        if query.is_empty() {
            self.set_status("Enter a proposal ID or address", StatusLevel::Warn);
            return;
        }
        self.begin_search(query);
    }

    /// Issue a search; any search still in flight is superseded
    pub fn begin_search(&mut self, query: String) {
        self.dismiss_notice();
        let ticket = self.search.begin(&query);
        tracing::info!(generation = ticket.generation(), %query, "search issued");
        self.pending_searches.push((ticket, query));
    }

    /// Search the proposal of the selected "proposals from address" entry
    pub fn search_selected_application(&mut self) {
        let id = self
            .search
            .address_applications()
            .get(self.selected_application)
            .map(|app| app.proposal_id.clone());
        match id {
            Some(id) => {
                self.input = id.clone();
                self.begin_search(id);
            }
            None => self.set_status("No application selected", StatusLevel::Warn),
        }
    }

    pub fn take_search_requests(&mut self) -> Vec<(SearchTicket, String)> {
        std::mem::take(&mut self.pending_searches)
    }

    pub fn take_endpoint_switch_request(&mut self) -> Option<usize> {
        self.pending_endpoint_switch.take()
    }

    pub fn apply_search_settled(
        &mut self,
        ticket: SearchTicket,
        outcome: Result<SearchReport, SearchError>,
    ) {
        match self.search.settle(ticket, outcome) {
            Settlement::Applied => {
                self.selected_application = 0;
                self.selected_vote = 0;
                self.selected_removed_vote = 0;
                match self.search.view() {
                    Some(view) => {
                        let label = view
                            .result
                            .map(|result| result.label())
                            .unwrap_or_default();
                        self.set_status(
                            format!("Proposal #{} ({})", view.proposal_id, label),
                            StatusLevel::Info,
                        );
                    }
                    None => self.set_status("No proposals from this address", StatusLevel::Warn),
                }
            }
            Settlement::Failed { notice } => self.set_notice(notice),
            Settlement::Discarded => {}
        }
        self.clamp_all_selections();
    }

    pub fn apply_rpc_connected(&mut self, endpoint: String, head_block: u64) {
        self.rpc_endpoint = endpoint;
        if let Some(index) = self
            .rpc_endpoints
            .iter()
            .position(|candidate| candidate.display.eq_ignore_ascii_case(&self.rpc_endpoint))
        {
            self.rpc_endpoint_index = index;
        }
        self.head_block = Some(head_block);
        self.set_status("Connected", StatusLevel::Info);
    }

    pub fn apply_rpc_error(&mut self, message: String) {
        self.set_status(message, StatusLevel::Error);
    }

    pub fn cycle_rpc_endpoint(&mut self, forward: bool) {
        if self.rpc_endpoints.is_empty() {
            self.set_status("No RPC endpoints configured", StatusLevel::Warn);
            return;
        }
        let len = self.rpc_endpoints.len();
        let next = if forward {
            (self.rpc_endpoint_index + 1) % len
        } else {
            (self.rpc_endpoint_index + len - 1) % len
        };
        self.rpc_endpoint_index = next;
        self.pending_endpoint_switch = Some(next);
        self.head_block = None;
        let label = self
            .rpc_endpoints
            .get(next)
            .map(|endpoint| endpoint.label.as_str())
            .unwrap_or("--");
        self.set_status(format!("Switching RPC endpoint: {label}"), StatusLevel::Info);
    }

    pub fn cycle_focus(&mut self, forward: bool) {
        let index = Focus::ALL
            .iter()
            .position(|focus| *focus == self.focus)
            .unwrap_or(0);
        let len = Focus::ALL.len();
        let next = if forward {
            (index + 1) % len
        } else {
            (index + len - 1) % len
        };
        self.focus = Focus::ALL[next];
    }

    pub fn list_len(&self, focus: Focus) -> usize {
        match focus {
            Focus::Applications => self.search.address_applications().len(),
            Focus::Votes => self.search.view().map(|v| v.votes.len()).unwrap_or(0),
            Focus::RemovedVotes => self
                .search
                .view()
                .map(|v| v.removed_votes.len())
                .unwrap_or(0),
        }
    }

    pub fn current_selection(&self) -> usize {
        match self.focus {
            Focus::Applications => self.selected_application,
            Focus::Votes => self.selected_vote,
            Focus::RemovedVotes => self.selected_removed_vote,
        }
    }

    fn set_selection(&mut self, selection: usize) {
        match self.focus {
            Focus::Applications => self.selected_application = selection,
            Focus::Votes => self.selected_vote = selection,
            Focus::RemovedVotes => self.selected_removed_vote = selection,
        }
        self.clamp_all_selections();
    }

    pub fn move_selection_up(&mut self) {
        let current = self.current_selection();
        self.set_selection(current.saturating_sub(1));
    }

    pub fn move_selection_down(&mut self) {
        let current = self.current_selection();
        self.set_selection(current + 1);
    }

    pub fn go_to_top(&mut self) {
        self.set_selection(0);
    }

    pub fn go_to_bottom(&mut self) {
        let len = self.list_len(self.focus);
        self.set_selection(len.saturating_sub(1));
    }

    fn clamp_all_selections(&mut self) {
        let clamp = |value: usize, len: usize| value.min(len.saturating_sub(1));
        self.selected_application =
            clamp(self.selected_application, self.list_len(Focus::Applications));
        self.selected_vote = clamp(self.selected_vote, self.list_len(Focus::Votes));
        self.selected_removed_vote =
            clamp(self.selected_removed_vote, self.list_len(Focus::RemovedVotes));
    }

    /// Transaction hash of the selected row in the focused table
    pub fn selected_tx_hash(&self) -> Option<String> {
        match self.focus {
            Focus::Applications => self
                .search
                .address_applications()
                .get(self.selected_application)
                .map(|app| app.transaction_hash.to_string()),
            Focus::Votes => self
                .search
                .view()?
                .votes
                .get(self.selected_vote)
                .map(|vote| vote.transaction_hash.to_string()),
            Focus::RemovedVotes => self
                .search
                .view()?
                .removed_votes
                .get(self.selected_removed_vote)
                .map(|removed| removed.transaction_hash.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{Address, B256, U256};
    use humanity_status::domain::governance::{
        Classification, Proposal, ResolvedView, VoteEvent,
    };

    fn report(id: &str, votes: usize) -> SearchReport {
        let classification = Classification::ProposalId(id.to_string());
        let votes = (0..votes)
            .map(|i| VoteEvent {
                proposal_id: id.to_string(),
                voter: Address::repeat_byte(i as u8 + 1),
                approve: i % 2 == 0,
                weight: U256::from(1u64),
                transaction_hash: B256::repeat_byte(i as u8 + 1),
                block_number: Some(8_000_000 + i as u64),
            })
            .collect();
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
                votes,
                removed_votes: vec![],
                result: None,
            }),
        }
    }

    #[test]
    fn test_submit_search_queues_request() {
        let mut app = App::new("https://etherscan.io".into());
        app.input = "  136 ".into();
        app.submit_search();

        let requests = app.take_search_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].1, "136");
        assert!(app.search.is_searching());
        assert!(app.take_search_requests().is_empty());
    }

    #[test]
    fn test_empty_input_is_not_searched() {
        let mut app = App::new("https://etherscan.io".into());
        app.input = "   ".into();
        app.submit_search();
        assert!(app.take_search_requests().is_empty());
        assert!(!app.search.is_searching());
    }

    #[test]
    fn test_last_issued_search_wins() {
        let mut app = App::new("https://etherscan.io".into());
        app.begin_search("136".into());
        app.begin_search("200".into());
        let requests = app.take_search_requests();
        let (first, second) = (requests[0].0, requests[1].0);

        app.apply_search_settled(second, Ok(report("200", 0)));
        app.apply_search_settled(first, Ok(report("136", 0)));
        assert_eq!(
            app.search.view().map(|v| v.proposal_id.as_str()),
            Some("200")
        );
    }

    #[test]
    fn test_selection_is_clamped_and_copied() {
        let mut app = App::new("https://etherscan.io".into());
        app.begin_search("136".into());
        let (ticket, _) = app.take_search_requests().remove(0);
        app.apply_search_settled(ticket, Ok(report("136", 3)));

        app.focus = Focus::Votes;
        app.go_to_bottom();
        app.move_selection_down();
        assert_eq!(app.selected_vote, 2);
        assert_eq!(
            app.selected_tx_hash(),
            Some(B256::repeat_byte(3).to_string())
        );

        app.focus = Focus::RemovedVotes;
        assert_eq!(app.selected_tx_hash(), None);
    }

    #[test]
    fn test_failure_notice_is_held_until_dismissed() {
        let mut app = App::new("https://etherscan.io".into());
        app.begin_search("999999".into());
        let (ticket, _) = app.take_search_requests().remove(0);
        let failure = SearchError::Aggregation {
            proposal_id: "999999".into(),
            source: anyhow::anyhow!("execution reverted"),
        };
        app.apply_search_settled(ticket, Err(failure));
        assert!(app.has_notice());

        // Older than the expiry window of ordinary messages
        if let Some(status) = app.status.as_mut() {
            status.since = Instant::now() - Duration::from_secs(10);
        }
        app.on_tick();
        assert_eq!(
            app.status_text(),
            Some(("Wrong Proposal ID or Address.", StatusLevel::Error))
        );

        assert!(app.dismiss_notice());
        assert!(app.status_text().is_none());
        assert!(!app.dismiss_notice());
    }

    #[test]
    fn test_new_search_clears_notice() {
        let mut app = App::new("https://etherscan.io".into());
        app.set_notice("Wrong Proposal ID or Address.");
        app.begin_search("136".into());
        assert!(!app.has_notice());
    }

    #[test]
    fn test_ordinary_status_expires() {
        let mut app = App::new("https://etherscan.io".into());
        app.set_status("Connected", StatusLevel::Info);
        if let Some(status) = app.status.as_mut() {
            status.since = Instant::now() - Duration::from_secs(10);
        }
        app.on_tick();
        assert!(app.status_text().is_none());
    }
}
