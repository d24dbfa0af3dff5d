//! CliLedgerClient - invokes the contract through the network CLI
//!
//! Every call spawns one process:
//! `<program> <invoke_args|query_args> <ChaincodeInput JSON>`
//! in the configured network directory, then scrapes the combined
//! stdout/stderr for the result.
//!
//! The invocation JSON is passed as a single argument (no shell), so values
//! with spaces or quotes reach the contract unchanged.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use herb_asset::{ChaincodeInput, Function};
use tokio::process::Command;
use tracing::{debug, warn};

use super::{scrape, LedgerClient};
use crate::config::LedgerConfig;
use crate::error::LedgerError;
use crate::models::HerbBatch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Invoke,
    Query,
}

/// Ledger client that shells out to a network CLI.
#[derive(Debug, Clone)]
pub struct CliLedgerClient {
    program: PathBuf,
    working_dir: PathBuf,
    invoke_args: Vec<String>,
    query_args: Vec<String>,
    timeout: Option<Duration>,
}

impl CliLedgerClient {
    pub fn new(config: &LedgerConfig) -> Self {
        Self {
            program: resolve_program(&config.network_path, &config.program),
            working_dir: config.network_path.clone(),
            invoke_args: config.invoke_args(),
            query_args: config.query_args(),
            timeout: config.timeout_secs.map(Duration::from_secs),
        }
    }

    /// Run one CLI call and return its combined output.
    ///
    /// A non-zero exit becomes an error classified from the output text.
    async fn run(&self, mode: Mode, input: &ChaincodeInput) -> Result<String, LedgerError> {
        let payload = serde_json::to_string(input)
            .map_err(|e| LedgerError::Internal(format!("failed to encode invocation: {e}")))?;
        let prefix = match mode {
            Mode::Invoke => &self.invoke_args,
            Mode::Query => &self.query_args,
        };

        let mut cmd = Command::new(&self.program);
        cmd.args(prefix)
            .arg(&payload)
            .current_dir(&self.working_dir)
            .stdin(Stdio::null())
            .kill_on_drop(true);

        debug!(
            program = %self.program.display(),
            function = %input.function,
            mode = ?mode,
            "running ledger CLI"
        );

        let output = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, cmd.output())
                .await
                .map_err(|_| LedgerError::Timeout(limit.as_secs()))?,
            None => cmd.output().await,
        }
        .map_err(|e| {
            LedgerError::Command(format!(
                "failed to run {}: {}",
                self.program.display(),
                e
            ))
        })?;

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        if !output.status.success() {
            warn!(function = %input.function, status = %output.status, "ledger CLI failed");
            return Err(classify_failure(&input.function, &output.status.to_string(), &combined));
        }

        Ok(combined)
    }

    /// Submit a transaction; the output must confirm the commit.
    async fn invoke(&self, input: ChaincodeInput) -> Result<String, LedgerError> {
        let output = self.run(Mode::Invoke, &input).await?;
        if !scrape::invoke_succeeded(&output) {
            return Err(classify_failure(&input.function, "no success marker", &output));
        }
        Ok(output)
    }

    async fn query(&self, input: ChaincodeInput) -> Result<String, LedgerError> {
        self.run(Mode::Query, &input).await
    }
}

#[async_trait]
impl LedgerClient for CliLedgerClient {
    async fn herb_batch_exists(&self, id: &str) -> Result<bool, LedgerError> {
        let output = self
            .query(ChaincodeInput::new(Function::HerbBatchExists, vec![id.to_string()]))
            .await?;

        scrape::find_bool_line(&output)
            .ok_or_else(|| LedgerError::Output(format!("unexpected output format: {}", output.trim())))
    }

    async fn create_herb_batch(&self, batch: &HerbBatch) -> Result<(), LedgerError> {
        let args = vec![
            batch.id.clone(),
            batch.botanical_name.clone(),
            batch.farm.clone(),
            batch.harvest_date.clone(),
            batch.owner.clone(),
            batch.status.clone(),
        ];
        self.invoke(ChaincodeInput::new(Function::CreateHerbBatch, args))
            .await?;
        Ok(())
    }

    async fn read_herb_batch(&self, id: &str) -> Result<HerbBatch, LedgerError> {
        let output = self
            .query(ChaincodeInput::new(Function::ReadHerbBatch, vec![id.to_string()]))
            .await?;

        let line = scrape::find_object_line(&output).ok_or_else(|| {
            LedgerError::Output(format!("no valid JSON found in output: {}", output.trim()))
        })?;
        serde_json::from_str(line)
            .map_err(|e| LedgerError::Output(format!("failed to parse herb batch JSON: {e}")))
    }

    async fn get_all_herb_batches(&self) -> Result<Vec<HerbBatch>, LedgerError> {
        let output = self
            .query(ChaincodeInput::new(Function::GetAllHerbBatches, vec![]))
            .await?;

        let line = scrape::find_array_line(&output).ok_or_else(|| {
            LedgerError::Output(format!("no valid JSON array found in output: {}", output.trim()))
        })?;
        serde_json::from_str(line)
            .map_err(|e| LedgerError::Output(format!("failed to parse herb batches JSON: {e}")))
    }

    async fn update_herb_batch_status(
        &self,
        id: &str,
        new_status: &str,
    ) -> Result<(), LedgerError> {
        self.invoke(ChaincodeInput::new(
            Function::UpdateHerbBatchStatus,
            vec![id.to_string(), new_status.to_string()],
        ))
        .await?;
        Ok(())
    }

    async fn transfer_herb_batch(&self, id: &str, new_owner: &str) -> Result<String, LedgerError> {
        let output = self
            .invoke(ChaincodeInput::new(
                Function::TransferHerbBatch,
                vec![id.to_string(), new_owner.to_string()],
            ))
            .await?;

        scrape::extract_payload(&output).ok_or_else(|| {
            LedgerError::Output(format!(
                "transfer committed but no payload found in output: {}",
                output.trim()
            ))
        })
    }

    fn backend_name(&self) -> &'static str {
        "cli"
    }
}

/// Relative programs containing a path separator are taken relative to the
/// network directory; bare names are looked up on PATH.
fn resolve_program(working_dir: &Path, program: &str) -> PathBuf {
    let path = Path::new(program);
    if path.is_relative() && path.components().count() > 1 {
        // Absolute, so the child's working directory does not change its meaning
        let joined = working_dir.join(path);
        std::path::absolute(&joined).unwrap_or(joined)
    } else {
        path.to_path_buf()
    }
}

/// Map failed CLI output to an error, using the contract's wording on the
/// `Error:` lines to spot not-found and conflict.
fn classify_failure(function: &str, status: &str, output: &str) -> LedgerError {
    let reported = |needle: &str| scrape::error_lines(output).any(|line| line.contains(needle));
    let not_found = reported("does not exist");
    let conflict = reported("already exists");

    let output = output.trim();
    let message = format!("{function} failed: {status}, output: {output}");

    if not_found {
        LedgerError::NotFound(message)
    } else if conflict {
        LedgerError::Conflict(message)
    } else {
        LedgerError::Command(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_program() {
        let dir = Path::new("/opt/test-network");
        assert_eq!(
            resolve_program(dir, "./network.sh"),
            PathBuf::from("/opt/test-network/./network.sh")
        );
        assert_eq!(resolve_program(dir, "herb-ledger"), PathBuf::from("herb-ledger"));
        assert_eq!(resolve_program(dir, "/usr/bin/peer"), PathBuf::from("/usr/bin/peer"));
    }

    #[test]
    fn test_classify_failure() {
        assert!(matches!(
            classify_failure("ReadHerbBatch", "exit status: 1", "Error: the herb batch x does not exist"),
            LedgerError::NotFound(_)
        ));
        assert!(matches!(
            classify_failure("CreateHerbBatch", "exit status: 1", "Error: the herb batch x already exists"),
            LedgerError::Conflict(_)
        ));

        let err = classify_failure("ReadHerbBatch", "exit status: 2", "peer connection refused");
        assert!(matches!(err, LedgerError::Command(_)));
        assert!(err.to_string().contains("peer connection refused"));
    }

    #[test]
    fn test_classify_ignores_echoed_arguments() {
        let output = "\
+ peer chaincode invoke -c '{\"function\":\"CreateHerbBatch\",\"Args\":[\"b1\",\"Ocimum\",\"does not exist Farms\"]}'
Error: error getting broadcast client: orderer unreachable
";
        let err = classify_failure("CreateHerbBatch", "exit status: 1", output);
        assert!(matches!(err, LedgerError::Command(_)));
        assert!(err.to_string().contains("orderer unreachable"));
    }
}
