//! herb-ledger: local stand-in for a blockchain network CLI
//!
//! Runs contract invocations against a JSON snapshot of the world state so the
//! API server's CLI backend can be exercised without a running network.
//!
//! ```text
//! herb-ledger --state ledger.json invoke '{"function":"InitLedger","Args":[]}'
//! herb-ledger --state ledger.json query '{"function":"ReadHerbBatch","Args":["batch1"]}'
//! ```

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use fs2::FileExt;
use tracing::{debug, info};

use herb_asset::{invoke, ChaincodeInput, Function, HerbContract, MemoryWorldState};

#[derive(Parser)]
#[command(name = "herb-ledger")]
#[command(about = "Run herb-asset contract invocations against a local world state file")]
struct Cli {
    /// World state snapshot file (created on first write)
    #[arg(short, long, env = "HERB_LEDGER_STATE", default_value = "herb-ledger.json")]
    state: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Submit a transaction and persist its writes
    Invoke {
        /// Invocation as JSON: {"function": "...", "Args": [...]}
        input: String,
    },
    /// Evaluate a function without persisting anything
    Query {
        /// Invocation as JSON: {"function": "...", "Args": [...]}
        input: String,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("herb_ledger=warn".parse()?),
        )
        .init();

    let cli = Cli::parse();

    // An Err here prints "Error: ..." to stderr and exits non-zero.
    let output = run(cli)?;
    println!("{}", output);
    Ok(())
}

fn run(cli: Cli) -> anyhow::Result<String> {
    let contract = HerbContract::new();
    // Held until return
    let _lock = lock_state(&cli.state, matches!(cli.command, Command::Invoke { .. }))?;
    let mut state = MemoryWorldState::load(&cli.state)?;
    debug!(path = %cli.state.display(), entries = state.len(), "world state loaded");

    match cli.command {
        Command::Invoke { input } => {
            let input = parse_input(&input)?;
            let payload = invoke(&contract, &mut state, &input)?;
            state.save(&cli.state)?;
            info!(function = %input.function, "transaction committed");

            Ok(format!(
                "Invoke successful. result: status:200 payload:{}",
                serde_json::to_string(&payload)?
            ))
        }
        Command::Query { input } => {
            let input = parse_input(&input)?;
            let function: Function = input.function.parse()?;
            if !function.is_query() {
                anyhow::bail!("{} modifies state; use invoke", function);
            }
            Ok(invoke(&contract, &mut state, &input)?)
        }
    }
}

/// Advisory lock on `<state>.lock`: exclusive for invokes, shared for queries.
/// Released when the returned file is dropped.
fn lock_state(state: &Path, exclusive: bool) -> anyhow::Result<File> {
    let mut path = state.as_os_str().to_owned();
    path.push(".lock");

    let file = OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(&path)
        .with_context(|| format!("failed to open lock file {}", Path::new(&path).display()))?;

    if exclusive {
        FileExt::lock_exclusive(&file)?;
    } else {
        FileExt::lock_shared(&file)?;
    }
    Ok(file)
}

fn parse_input(raw: &str) -> anyhow::Result<ChaincodeInput> {
    serde_json::from_str(raw).map_err(|e| anyhow::anyhow!("invalid invocation JSON: {}", e))
}
