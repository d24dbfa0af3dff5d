//! herb-ledger binary integration tests
//!
//! Drives the compiled binary the same way the API server's CLI backend does:
//! one process per call, output scraped from stdout/stderr.

use std::path::Path;
use std::process::{Command, Output};

use herb_asset::{HerbBatch, HerbContract, MemoryWorldState};
use tempfile::TempDir;

fn herb_ledger(state: &Path, mode: &str, input: &str) -> Output {
    Command::new(env!("CARGO_BIN_EXE_herb-ledger"))
        .arg("--state")
        .arg(state)
        .arg(mode)
        .arg(input)
        .output()
        .expect("herb-ledger should run")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

#[test]
fn test_invoke_persists_and_query_reads() {
    let temp_dir = TempDir::new().unwrap();
    let state = temp_dir.path().join("ledger.json");

    let output = herb_ledger(
        &state,
        "invoke",
        r#"{"function":"CreateHerbBatch","Args":["b1","Ocimum sanctum","F1","2024-01-01","A","Harvested"]}"#,
    );
    assert!(output.status.success());
    assert!(stdout(&output).contains("Invoke successful"));

    let output = herb_ledger(
        &state,
        "query",
        r#"{"function":"ReadHerbBatch","Args":["b1"]}"#,
    );
    assert!(output.status.success());
    let line = stdout(&output);
    let batch: HerbBatch = serde_json::from_str(line.trim()).unwrap();
    assert_eq!(batch.botanical_name, "Ocimum sanctum");
    assert_eq!(batch.owner, "A");
}

#[test]
fn test_transfer_prints_old_owner_as_payload() {
    let temp_dir = TempDir::new().unwrap();
    let state = temp_dir.path().join("ledger.json");

    let output = herb_ledger(&state, "invoke", r#"{"function":"InitLedger","Args":[]}"#);
    assert!(output.status.success());

    let output = herb_ledger(
        &state,
        "invoke",
        r#"{"function":"TransferHerbBatch","Args":["batch1","New Owner"]}"#,
    );
    assert!(output.status.success());
    assert!(stdout(&output).contains(r#"payload:"Ravi Sharma""#));

    // Snapshot on disk reflects the transfer
    let loaded = MemoryWorldState::load(&state).unwrap();
    let batch = HerbContract::new().read_herb_batch(&loaded, "batch1").unwrap();
    assert_eq!(batch.owner, "New Owner");
}

#[test]
fn test_failures_exit_non_zero_with_message() {
    let temp_dir = TempDir::new().unwrap();
    let state = temp_dir.path().join("ledger.json");

    let output = herb_ledger(
        &state,
        "query",
        r#"{"function":"ReadHerbBatch","Args":["missing"]}"#,
    );
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("the herb batch missing does not exist"));
    assert!(!state.exists());
}

#[test]
fn test_query_refuses_writes() {
    let temp_dir = TempDir::new().unwrap();
    let state = temp_dir.path().join("ledger.json");

    let output = herb_ledger(&state, "query", r#"{"function":"InitLedger","Args":[]}"#);
    assert!(!output.status.success());
    assert!(!state.exists());
}

#[test]
fn test_parallel_invokes_all_persist() {
    let temp_dir = TempDir::new().unwrap();
    let state = temp_dir.path().join("ledger.json");

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let state = state.clone();
            std::thread::spawn(move || {
                let input = format!(
                    r#"{{"function":"CreateHerbBatch","Args":["b{i}","Ocimum","F1","2024-01-01","A","Harvested"]}}"#
                );
                herb_ledger(&state, "invoke", &input)
            })
        })
        .collect();

    for handle in handles {
        let output = handle.join().unwrap();
        assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    }

    let loaded = MemoryWorldState::load(&state).unwrap();
    let batches = HerbContract::new().get_all_herb_batches(&loaded).unwrap();
    assert_eq!(batches.len(), 16);

    // No temp files left next to the snapshot
    let leftovers: Vec<_> = std::fs::read_dir(temp_dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|name| name != "ledger.json" && name != "ledger.json.lock")
        .collect();
    assert!(leftovers.is_empty(), "{leftovers:?}");
}
