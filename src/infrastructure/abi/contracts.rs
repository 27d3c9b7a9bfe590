//! Contract ABIs and addresses used by the chain client

use std::path::Path;

use alloy_json_abi::{Event, Function, JsonAbi};
use alloy_primitives::Address;
use anyhow::{Context, Result};

use crate::domain::governance::ContractKind;
use crate::infrastructure::abi::ArtifactScanner;

/// JSON ABI of the governance contract (subset we read)
///
/// JSON rather than human-readable signatures: `getProposal` returns a struct
/// whose member names become record fields.
const GOVERNANCE_ABI: &str = r#"[
  {
    "type": "function",
    "name": "getProposal",
    "stateMutability": "view",
    "inputs": [{ "name": "proposalId", "type": "uint256", "internalType": "uint256" }],
    "outputs": [
      {
        "name": "proposal",
        "type": "tuple",
        "internalType": "struct HumanityGovernance.Proposal",
        "components": [
          { "name": "result", "type": "uint8", "internalType": "enum HumanityGovernance.Result" },
          { "name": "target", "type": "address", "internalType": "address" },
          { "name": "data", "type": "bytes", "internalType": "bytes" },
          { "name": "proposer", "type": "address", "internalType": "address" },
          { "name": "feeRecipient", "type": "address", "internalType": "address" },
          { "name": "fee", "type": "uint256", "internalType": "uint256" },
          { "name": "startTime", "type": "uint256", "internalType": "uint256" },
          { "name": "yesCount", "type": "uint256", "internalType": "uint256" },
          { "name": "noCount", "type": "uint256", "internalType": "uint256" }
        ]
      }
    ]
  },
  {
    "type": "event",
    "name": "Vote",
    "anonymous": false,
    "inputs": [
      { "name": "proposalId", "type": "uint256", "indexed": true },
      { "name": "voter", "type": "address", "indexed": true },
      { "name": "approve", "type": "bool", "indexed": false },
      { "name": "weight", "type": "uint256", "indexed": false }
    ]
  },
  {
    "type": "event",
    "name": "RemoveVote",
    "anonymous": false,
    "inputs": [
      { "name": "proposalId", "type": "uint256", "indexed": true },
      { "name": "voter", "type": "address", "indexed": true }
    ]
  }
]"#;

/// JSON ABI of the Twitter applicant module
const APPLICANT_ABI: &str = r#"[
  {
    "type": "event",
    "name": "Apply",
    "anonymous": false,
    "inputs": [
      { "name": "proposalId", "type": "uint256", "indexed": true },
      { "name": "applicant", "type": "address", "indexed": true },
      { "name": "username", "type": "string", "indexed": false }
    ]
  }
]"#;

/// A deployed contract
#[derive(Debug, Clone)]
pub struct ContractHandle {
    pub address: Address,
    pub abi: JsonAbi,
}

/// Explicitly configured addresses; these win over artifact addresses
#[derive(Debug, Clone, Copy, Default)]
pub struct ContractAddresses {
    pub governance: Option<Address>,
    pub applicant: Option<Address>,
}

/// The contracts the engine reads from
#[derive(Debug, Clone)]
pub struct ContractSet {
    governance: ContractHandle,
    applicant: ContractHandle,
}

impl ContractSet {
    pub fn new(governance: ContractHandle, applicant: ContractHandle) -> Self {
        Self {
            governance,
            applicant,
        }
    }

    /// Built-in ABIs at the given addresses
    pub fn builtin(governance: Address, applicant: Address) -> Result<Self> {
        Ok(Self::new(
            ContractHandle {
                address: governance,
                abi: builtin_abi(ContractKind::Governance)?,
            },
            ContractHandle {
                address: applicant,
                abi: builtin_abi(ContractKind::Applicant)?,
            },
        ))
    }

    /// Combine configured addresses with truffle artifacts found under `artifacts_dir`
    ///
    /// ABIs come from the artifacts when present, otherwise the built-in
    /// ones. Addresses come from `addresses` first, then the artifact's
    /// `networks[chain_id]` entry.
    pub fn load(
        addresses: ContractAddresses,
        artifacts_dir: Option<&Path>,
        chain_id: u64,
    ) -> Result<Self> {
        let artifacts = artifacts_dir.map(|dir| ArtifactScanner::scan(dir, chain_id));
        if let Some(set) = artifacts.as_ref() {
            for err in &set.errors {
                tracing::warn!(error = %err, "artifact scan");
            }
        }

        let mut handles = Vec::with_capacity(2);
        for (kind, configured) in [
            (ContractKind::Governance, addresses.governance),
            (ContractKind::Applicant, addresses.applicant),
        ] {
            let artifact = artifacts.as_ref().and_then(|set| set.get(kind));
            let address = configured
                .or_else(|| artifact.and_then(|a| a.address))
                .with_context(|| {
                    format!(
                        "{} address not configured (set it in the config file, pass it on the command line, or point artifacts_dir at a build with network {})",
                        kind.name(),
                        chain_id
                    )
                })?;
            let abi = match artifact {
                Some(artifact) => artifact.abi.clone(),
                None => builtin_abi(kind)?,
            };
            tracing::debug!(contract = kind.name(), %address, from_artifact = artifact.is_some(), "contract");
            handles.push(ContractHandle { address, abi });
        }

        let applicant = handles.pop().context("applicant contract missing")?;
        let governance = handles.pop().context("governance contract missing")?;
        Ok(Self::new(governance, applicant))
    }

    pub fn get(&self, kind: ContractKind) -> &ContractHandle {
        match kind {
            ContractKind::Governance => &self.governance,
            ContractKind::Applicant => &self.applicant,
        }
    }

    pub fn function(&self, kind: ContractKind, name: &str) -> Result<&Function> {
        self.get(kind)
            .abi
            .function(name)
            .and_then(|overloads| overloads.first())
            .with_context(|| format!("{} has no function '{}'", kind.name(), name))
    }

    pub fn event(&self, kind: ContractKind, name: &str) -> Result<&Event> {
        self.get(kind)
            .abi
            .event(name)
            .and_then(|overloads| overloads.first())
            .with_context(|| format!("{} has no event '{}'", kind.name(), name))
    }
}

/// Parse the built-in ABI for `kind`
pub fn builtin_abi(kind: ContractKind) -> Result<JsonAbi> {
    let json = match kind {
        ContractKind::Governance => GOVERNANCE_ABI,
        ContractKind::Applicant => APPLICANT_ABI,
    };
    serde_json::from_str::<JsonAbi>(json)
        .with_context(|| format!("Failed to parse built-in ABI for {}", kind.name()))
}
