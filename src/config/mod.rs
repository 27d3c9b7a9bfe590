use std::fs;
use std::path::PathBuf;

use serde::Deserialize;

use crate::core::DeploymentBlocks;

pub const DEFAULT_EXPLORER_URL: &str = "https://etherscan.io";
pub const DEFAULT_INITIAL_QUERY: &str = "136";

#[derive(Debug, Clone, Deserialize)]
pub struct EndpointConfig {
    pub name: Option<String>,
    pub rpc: Option<String>,
    pub ws: Option<String>,
    pub ipc: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContractsConfig {
    pub governance: Option<String>,
    pub applicant: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub endpoints: Vec<EndpointConfig>,

    #[serde(default)]
    pub contracts: ContractsConfig,

    pub artifacts_dir: Option<String>,
    pub chain_id: Option<u64>,
    pub governance_from_block: Option<u64>,
    pub applicant_from_block: Option<u64>,
    pub explorer_url: Option<String>,
    pub initial_query: Option<String>,
}

impl Config {
    pub fn chain_id(&self) -> u64 {
        self.chain_id.unwrap_or(1)
    }

    /// Deployment blocks, falling back to mainnet per field
    pub fn deployment_blocks(&self) -> DeploymentBlocks {
        let mainnet = DeploymentBlocks::MAINNET;
        DeploymentBlocks {
            governance: self.governance_from_block.unwrap_or(mainnet.governance),
            applicant: self.applicant_from_block.unwrap_or(mainnet.applicant),
        }
    }

    pub fn explorer_url(&self) -> String {
        self.explorer_url
            .as_deref()
            .map(|url| url.trim().trim_end_matches('/'))
            .filter(|url| !url.is_empty())
            .unwrap_or(DEFAULT_EXPLORER_URL)
            .to_string()
    }

    pub fn initial_query(&self) -> String {
        self.initial_query
            .clone()
            .unwrap_or_else(|| DEFAULT_INITIAL_QUERY.to_string())
    }
}

pub fn load() -> Config {
    let Some(path) = config_path() else {
        return Config::default();
    };
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(_) => return Config::default(),
    };
    match toml::from_str::<Config>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "ignoring unreadable config");
            Config::default()
        }
    }
}

pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os("HUMANITY_STATUS_CONFIG").map(PathBuf::from) {
        return Some(path);
    }
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from) {
        return Some(xdg.join("humanity-status").join("config.toml"));
    }
    if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
        return Some(
            home.join(".config")
                .join("humanity-status")
                .join("config.toml"),
        );
    }

    directories::ProjectDirs::from("org", "humanity", "humanity-status")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

pub fn data_dir() -> Option<PathBuf> {
    if let Some(xdg) = std::env::var_os("XDG_DATA_HOME").map(PathBuf::from) {
        return Some(xdg.join("humanity-status"));
    }
    if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
        return Some(home.join(".local").join("share").join("humanity-status"));
    }
    directories::ProjectDirs::from("org", "humanity", "humanity-status")
        .map(|dirs| dirs.data_dir().to_path_buf())
}

pub fn log_path() -> Option<PathBuf> {
    data_dir().map(|dir| dir.join("humanity-status.log"))
}

pub fn export_dir() -> Option<PathBuf> {
    data_dir().map(|dir| dir.join("exports"))
}
