//! Server configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub ledger: LedgerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP port
    #[serde(default = "default_http_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_http_port(),
        }
    }
}

/// Which ledger client the API talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LedgerBackend {
    /// Shell out to the network CLI and scrape its output
    Cli,
    /// Run the contract in-process against an in-memory world state
    Local,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    #[serde(default = "default_backend")]
    pub backend: LedgerBackend,

    /// Working directory for CLI invocations
    #[serde(default = "default_network_path")]
    pub network_path: PathBuf,

    /// Program to run, relative to `network_path` unless absolute
    #[serde(default = "default_program")]
    pub program: String,

    #[serde(default = "default_channel_name")]
    pub channel_name: String,

    #[serde(default = "default_chaincode_name")]
    pub chaincode_name: String,

    /// Seconds the network script waits before submitting an invoke
    #[serde(default = "default_invoke_delay")]
    pub invoke_delay_secs: u64,

    /// Arguments placed before the invocation JSON for transactions.
    /// Defaults to the test-network `cc invoke` form.
    #[serde(default)]
    pub invoke_args: Option<Vec<String>>,

    /// Arguments placed before the invocation JSON for queries.
    /// Defaults to the test-network `cc query` form.
    #[serde(default)]
    pub query_args: Option<Vec<String>>,

    /// Kill a CLI call that runs longer than this. Unset means wait forever.
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    /// Run InitLedger when the local backend starts
    #[serde(default)]
    pub seed_on_start: bool,
}

impl LedgerConfig {
    pub fn invoke_args(&self) -> Vec<String> {
        self.invoke_args.clone().unwrap_or_else(|| {
            vec![
                "cc".to_string(),
                "invoke".to_string(),
                "-ccn".to_string(),
                self.chaincode_name.clone(),
                "-c".to_string(),
                self.channel_name.clone(),
                "-d".to_string(),
                self.invoke_delay_secs.to_string(),
                "-ccic".to_string(),
            ]
        })
    }

    pub fn query_args(&self) -> Vec<String> {
        self.query_args.clone().unwrap_or_else(|| {
            vec![
                "cc".to_string(),
                "query".to_string(),
                "-ccn".to_string(),
                self.chaincode_name.clone(),
                "-c".to_string(),
                self.channel_name.clone(),
                "-ccqc".to_string(),
            ]
        })
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            network_path: default_network_path(),
            program: default_program(),
            channel_name: default_channel_name(),
            chaincode_name: default_chaincode_name(),
            invoke_delay_secs: default_invoke_delay(),
            invoke_args: None,
            query_args: None,
            timeout_secs: None,
            seed_on_start: false,
        }
    }
}

impl Config {
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

// Defaults
fn default_host() -> String { "0.0.0.0".to_string() }
fn default_http_port() -> u16 { 8080 }
fn default_backend() -> LedgerBackend { LedgerBackend::Cli }
fn default_network_path() -> PathBuf { PathBuf::from("../test-network") }
fn default_program() -> String { "./network.sh".to_string() }
fn default_channel_name() -> String { "herbtrace-temp".to_string() }
fn default_chaincode_name() -> String { "herbbatch".to_string() }
fn default_invoke_delay() -> u64 { 3 }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.ledger.backend, LedgerBackend::Cli);
        assert_eq!(config.ledger.channel_name, "herbtrace-temp");
        assert_eq!(config.ledger.timeout_secs, None);
    }

    #[test]
    fn test_default_cli_arguments_match_test_network() {
        let ledger = LedgerConfig::default();
        assert_eq!(
            ledger.invoke_args(),
            vec!["cc", "invoke", "-ccn", "herbbatch", "-c", "herbtrace-temp", "-d", "3", "-ccic"]
        );
        assert_eq!(
            ledger.query_args(),
            vec!["cc", "query", "-ccn", "herbbatch", "-c", "herbtrace-temp", "-ccqc"]
        );
    }

    #[test]
    fn test_partial_ledger_section() {
        let config = Config::from_toml_str(
            r#"
[server]
port = 9000

[ledger]
backend = "local"
seed_on_start = true
invoke_args = ["--state", "ledger.json", "invoke"]
"#,
        )
        .unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.ledger.backend, LedgerBackend::Local);
        assert!(config.ledger.seed_on_start);
        assert_eq!(config.ledger.invoke_args(), vec!["--state", "ledger.json", "invoke"]);
        // Query args still fall back to the default form
        assert_eq!(config.ledger.query_args()[1], "query");
    }

    #[test]
    fn test_unknown_backend_is_rejected() {
        assert!(Config::from_toml_str("[ledger]\nbackend = \"fabric\"\n").is_err());
    }
}
