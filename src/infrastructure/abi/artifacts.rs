//! Truffle artifact scanner - finds the Humanity contract build files

use std::fs;
use std::path::{Path, PathBuf};

use alloy_json_abi::JsonAbi;
use alloy_primitives::Address;
use walkdir::WalkDir;

use crate::domain::governance::ContractKind;

/// One contract build artifact
#[derive(Debug, Clone)]
pub struct Artifact {
    pub abi: JsonAbi,
    /// Deployed address on the scanned chain id, if recorded
    pub address: Option<Address>,
    pub source: PathBuf,
}

/// Artifacts found under a root
#[derive(Debug, Clone, Default)]
pub struct ArtifactSet {
    pub governance: Option<Artifact>,
    pub applicant: Option<Artifact>,
    pub scanned_files: usize,
    pub errors: Vec<String>,
}

impl ArtifactSet {
    pub fn get(&self, kind: ContractKind) -> Option<&Artifact> {
        match kind {
            ContractKind::Governance => self.governance.as_ref(),
            ContractKind::Applicant => self.applicant.as_ref(),
        }
    }
}

pub struct ArtifactScanner;

impl ArtifactScanner {
    /// Scan `root` for `HumanityGovernance.json` and `TwitterHumanityApplicant.json`
    pub fn scan(root: impl AsRef<Path>, chain_id: u64) -> ArtifactSet {
        let root = root.as_ref();
        let mut set = ArtifactSet::default();

        for entry in WalkDir::new(root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| !Self::is_ignored_dir(e.path()))
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    set.errors.push(err.to_string());
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            let Some(kind) = Self::kind_for(path) else {
                continue;
            };
            if set.get(kind).is_some() {
                continue;
            }

            set.scanned_files += 1;
            match Self::load_artifact(path, chain_id) {
                Ok(artifact) => match kind {
                    ContractKind::Governance => set.governance = Some(artifact),
                    ContractKind::Applicant => set.applicant = Some(artifact),
                },
                Err(err) => set.errors.push(format!("{}: {:#}", path.display(), err)),
            }
        }

        set
    }

    fn kind_for(path: &Path) -> Option<ContractKind> {
        if path.extension().and_then(|s| s.to_str()) != Some("json") {
            return None;
        }
        match path.file_stem().and_then(|s| s.to_str())? {
            "HumanityGovernance" => Some(ContractKind::Governance),
            "TwitterHumanityApplicant" => Some(ContractKind::Applicant),
            _ => None,
        }
    }

    fn load_artifact(path: &Path, chain_id: u64) -> anyhow::Result<Artifact> {
        let content = fs::read_to_string(path)?;
        let value: serde_json::Value = serde_json::from_str(&content)?;

        let abi_value = value
            .get("abi")
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("artifact has no abi"))?;
        let abi: JsonAbi = serde_json::from_value(abi_value)?;

        let address = value
            .get("networks")
            .and_then(|networks| networks.get(chain_id.to_string()))
            .and_then(|network| network.get("address"))
            .and_then(|address| address.as_str())
            .map(|address| address.parse::<Address>())
            .transpose()?;

        Ok(Artifact {
            abi,
            address,
            source: path.to_path_buf(),
        })
    }

    fn is_ignored_dir(path: &Path) -> bool {
        path.file_name()
            .and_then(|n| n.to_str())
            .map(|name| matches!(name, ".git" | "target" | "node_modules"))
            .unwrap_or(false)
    }
}
