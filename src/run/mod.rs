pub mod config;
pub mod poller;
pub mod sink;
pub mod validator;

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::watch;
use tracing::warn;

use crate::broker::{self, FivePaisaClient};
use crate::error::{ConfigError, PollError};
use crate::model::expiry::{self, ResolvedExpiry};
use crate::model::index::Index;

use config::RuntimeConfig;
use poller::Poller;
use sink::FileSink;

/// CLI-facing config struct (before env var resolution).
pub struct RunConfig {
    pub indices: Vec<Index>,
    pub fut_expiry: Option<String>,
    pub opt_expiry: Option<String>,
    pub finnifty_fut_expiry: Option<String>,
    pub finnifty_opt_expiry: Option<String>,
    pub output: PathBuf,
    pub interval_ms: u64,
    pub cycles: Option<u64>,
    pub timeout_secs: u64,
    pub creds: Option<PathBuf>,
}

fn config_failed(errors: &[ConfigError]) -> anyhow::Error {
    let msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
    anyhow::anyhow!("Expiry validation failed:\n  {}", msgs.join("\n  "))
}

/// Entry point for the `run` command.
pub fn run(cli_config: &RunConfig) -> Result<()> {
    let config = RuntimeConfig::from_cli(cli_config)?;

    println!("=== premium-discount run ===");
    for (index, expiry) in &config.expiries {
        println!(
            "{:<10} fut {}  opt {}",
            index.name(),
            expiry::contract_date(expiry.futures),
            expiry.option
        );
    }
    println!("Output:   {}", config.output.display());
    println!("Interval: {} ms", config.interval.as_millis());
    match config.cycles {
        Some(n) => println!("Cycles:   {n}"),
        None => println!("Cycles:   until Ctrl-C"),
    }
    println!();

    let rt = tokio::runtime::Runtime::new().context("creating tokio runtime")?;
    rt.block_on(run_async(config))
}

async fn login(config: &RuntimeConfig) -> Result<FivePaisaClient> {
    Ok(FivePaisaClient::login(&config.login, config.timeout).await?)
}

async fn run_async(config: RuntimeConfig) -> Result<()> {
    let client = login(&config).await?;

    let plan = validator::validate(&client, &config.expiries)
        .await
        .map_err(|errors| config_failed(&errors))?;

    let (cancel_tx, cancel_rx) = watch::channel(false);
    ctrlc::set_handler(move || {
        let _ = cancel_tx.send(true);
    })
    .context("installing Ctrl-C handler")?;

    let poller = Poller::new(Arc::new(client), plan).with_interval(config.interval);
    let refresh_secs = config.interval.as_secs().max(1);
    let mut sink = FileSink::new(&config.output, refresh_secs);

    println!(
        "── Polling {} ({:?} mode) ──",
        config
            .expiries
            .keys()
            .map(|i| i.name())
            .collect::<Vec<_>>()
            .join(", "),
        poller.mode()
    );
    println!("  Writing {}\n", sink.path().display());

    match poller.run(&mut sink, config.cycles, cancel_rx).await {
        Ok(completed) => {
            println!("Completed {completed} cycle(s). Exiting.");
            Ok(())
        }
        Err(PollError::Interrupted) => {
            warn!("interrupted, shutting down");
            Err(PollError::Interrupted.into())
        }
        Err(e) => Err(e.into()),
    }
}

/// Entry point for the `check-expiry` command.
///
/// Lists the exchange's expiry dates per index, marks the configured ones,
/// and fails if any configured date is not listed.
pub fn check_expiry(cli_config: &RunConfig) -> Result<()> {
    let config = RuntimeConfig::from_cli(cli_config)?;
    let rt = tokio::runtime::Runtime::new().context("creating tokio runtime")?;
    rt.block_on(check_expiry_async(config))
}

async fn check_expiry_async(config: RuntimeConfig) -> Result<()> {
    let client = login(&config).await?;

    println!("=== premium-discount check-expiry ===");
    let mut errors = Vec::new();
    let mut resolved: BTreeMap<Index, ResolvedExpiry> = BTreeMap::new();

    for (&index, expiry_config) in &config.expiries {
        let list = match broker::fetch_expiries(&client, index).await {
            Ok(list) => list,
            Err(e) => {
                errors.push(e);
                continue;
            }
        };

        println!("{}:", index.name());
        let option_code = list.resolve(expiry_config.option);
        for &code in &list.time_codes {
            let Some(date) = expiry::ist_date(code) else {
                continue;
            };
            let mut marks = Vec::new();
            if date == expiry_config.futures {
                marks.push("fut");
            }
            if option_code == Some(code) {
                marks.push("opt");
            }
            let suffix = if marks.is_empty() {
                String::new()
            } else {
                format!("  <- {}", marks.join(", "))
            };
            println!("  {}  {code}{suffix}", expiry::contract_date(date));
        }

        match validator::check(index, expiry_config, &list) {
            Ok(r) => {
                resolved.insert(index, r);
            }
            Err(errs) => errors.extend(errs),
        }
    }
    println!();

    if !errors.is_empty() {
        return Err(config_failed(&errors));
    }
    for (index, r) in &resolved {
        println!(
            "{:<10} OK  futures '{}'  option time code {}",
            index.name(),
            r.futures_symbol,
            r.option_time_code
        );
    }
    Ok(())
}
