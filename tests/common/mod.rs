//! In-memory chain client for driving the search engine in tests

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use alloy_primitives::{Address, B256, U256};
use anyhow::{anyhow, bail, Result};
use tokio::sync::Notify;

use humanity_status::domain::governance::{
    ChainClient, ContractKind, EventFilter, FieldValue, LogRecord, Record, APPLY_EVENT,
    GET_PROPOSAL, REMOVE_VOTE_EVENT, VOTE_EVENT,
};

pub const APPLICANT: &str = "0x36faa1e49ff125ac72ceae0d5a2e35bc9add6591";

pub fn one_token() -> U256 {
    U256::from(10u64).pow(U256::from(18u64))
}

/// One request made against the fake
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Read {
        method: String,
        args: Vec<String>,
    },
    Events {
        contract: ContractKind,
        event: String,
        filter: EventFilter,
        from_block: u64,
    },
}

impl Call {
    pub fn name(&self) -> &str {
        match self {
            Call::Read { method, .. } => method,
            Call::Events { event, .. } => event,
        }
    }
}

#[derive(Default)]
pub struct FakeChain {
    proposals: HashMap<U256, Record>,
    logs: HashMap<&'static str, Vec<LogRecord>>,
    failing: HashSet<String>,
    gates: HashMap<U256, Arc<Notify>>,
    ignore_filters: bool,
    next_tx: u64,
    calls: Mutex<Vec<Call>>,
}

impl FakeChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_proposal(mut self, id: u64, result: u8, yes: U256, no: U256) -> Self {
        let mut record = Record::new();
        record.insert("result".into(), FieldValue::Uint(U256::from(result)));
        record.insert("target".into(), FieldValue::Address(Address::repeat_byte(0xee)));
        record.insert("data".into(), FieldValue::Bytes(vec![]));
        record.insert("proposer".into(), FieldValue::Address(Address::repeat_byte(0xdd)));
        record.insert(
            "feeRecipient".into(),
            FieldValue::Address(Address::repeat_byte(id as u8)),
        );
        record.insert("fee".into(), FieldValue::Uint(U256::ZERO));
        record.insert(
            "startTime".into(),
            FieldValue::Uint(U256::from(1_562_000_000u64 + id)),
        );
        record.insert("yesCount".into(), FieldValue::Uint(yes));
        record.insert("noCount".into(), FieldValue::Uint(no));
        self.proposals.insert(U256::from(id), record);
        self
    }

    /// Replace a proposal record wholesale
    pub fn with_proposal_record(mut self, id: u64, record: Record) -> Self {
        self.proposals.insert(U256::from(id), record);
        self
    }

    pub fn with_application(mut self, id: u64, applicant: &str, username: &str) -> Self {
        let mut fields = Record::new();
        fields.insert("proposalId".into(), FieldValue::Uint(U256::from(id)));
        fields.insert("applicant".into(), FieldValue::Address(parse_address(applicant)));
        fields.insert("username".into(), FieldValue::Text(username.to_string()));
        self.push_log(APPLY_EVENT, fields)
    }

    pub fn with_vote(mut self, id: u64, voter: u8, approve: bool, weight: U256) -> Self {
        let mut fields = Record::new();
        fields.insert("proposalId".into(), FieldValue::Uint(U256::from(id)));
        fields.insert("voter".into(), FieldValue::Address(Address::repeat_byte(voter)));
        fields.insert("approve".into(), FieldValue::Bool(approve));
        fields.insert("weight".into(), FieldValue::Uint(weight));
        self.push_log(VOTE_EVENT, fields)
    }

    pub fn with_remove_vote(mut self, id: u64, voter: u8) -> Self {
        let mut fields = Record::new();
        fields.insert("proposalId".into(), FieldValue::Uint(U256::from(id)));
        fields.insert("voter".into(), FieldValue::Address(Address::repeat_byte(voter)));
        self.push_log(REMOVE_VOTE_EVENT, fields)
    }

    /// Append a log exactly as given
    pub fn with_raw_log(mut self, event: &'static str, log: LogRecord) -> Self {
        self.logs.entry(event).or_default().push(log);
        self
    }

    /// Make every request for `name` (method or event) fail
    pub fn failing(mut self, name: &str) -> Self {
        self.failing.insert(name.to_string());
        self
    }

    /// Return every log regardless of the filter, like a misbehaving node
    pub fn ignoring_filters(mut self) -> Self {
        self.ignore_filters = true;
        self
    }

    /// Hold `getProposal(id)` until the returned handle is notified
    pub fn gated(&mut self, id: u64) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.gates.insert(U256::from(id), Arc::clone(&gate));
        gate
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_names(&self) -> Vec<String> {
        self.calls().iter().map(|c| c.name().to_string()).collect()
    }

    fn push_log(mut self, event: &'static str, fields: Record) -> Self {
        self.next_tx += 1;
        let log = LogRecord {
            transaction_hash: Some(B256::from(U256::from(self.next_tx).to_be_bytes::<32>())),
            block_number: Some(7_800_000 + self.next_tx),
            fields,
        };
        self.logs.entry(event).or_default().push(log);
        self
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait::async_trait]
impl ChainClient for FakeChain {
    async fn call_read_only(
        &self,
        contract: ContractKind,
        method: &str,
        args: &[String],
    ) -> Result<Record> {
        self.record(Call::Read {
            method: method.to_string(),
            args: args.to_vec(),
        });
        if contract != ContractKind::Governance || method != GET_PROPOSAL {
            bail!("{} has no function '{}'", contract.name(), method);
        }
        if self.failing.contains(method) {
            bail!("connection reset");
        }

        let raw = args.first().ok_or_else(|| anyhow!("missing argument"))?;
        let id: U256 = raw
            .trim()
            .parse()
            .map_err(|_| anyhow!("invalid number value (arg=\"proposalId\", value={raw:?})"))?;

        if let Some(gate) = self.gates.get(&id) {
            gate.notified().await;
        }

        self.proposals
            .get(&id)
            .cloned()
            .ok_or_else(|| anyhow!("execution reverted"))
    }

    async fn get_past_events(
        &self,
        contract: ContractKind,
        event: &str,
        filter: &EventFilter,
        from_block: u64,
    ) -> Result<Vec<LogRecord>> {
        self.record(Call::Events {
            contract,
            event: event.to_string(),
            filter: filter.clone(),
            from_block,
        });
        if self.failing.contains(event) {
            bail!("{} log query timed out", event);
        }

        let logs = self.logs.get(event).cloned().unwrap_or_default();
        if self.ignore_filters {
            return Ok(logs);
        }
        Ok(logs
            .into_iter()
            .filter(|log| matches_filter(&log.fields, filter))
            .collect())
    }
}

fn matches_filter(fields: &Record, filter: &EventFilter) -> bool {
    filter.iter().all(|(name, wanted)| match fields.get(name) {
        Some(FieldValue::Uint(value)) => wanted.trim().parse::<U256>().ok() == Some(*value),
        Some(FieldValue::Address(value)) => wanted.trim().parse::<Address>().ok() == Some(*value),
        Some(FieldValue::Text(value)) => value == wanted,
        _ => false,
    })
}

fn parse_address(raw: &str) -> Address {
    raw.parse().expect("test address")
}
