use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use premium_discount::model::index::Index;
use premium_discount::run::RunConfig;

/// Live premium/discount monitor for NIFTY, BANKNIFTY and FINNIFTY options.
#[derive(Parser)]
#[command(name = "premium-discount", version, about)]
pub struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Poll the selected indices and keep an HTML page of premiums up to date
    Run(RunArgs),

    /// List the exchange's expiry dates and check the configured ones
    CheckExpiry(RunArgs),

    /// Print the strike window for a spot price (offline)
    Strikes {
        /// Index name: NIFTY, BANKNIFTY or FINNIFTY
        #[arg(long)]
        index: Index,

        /// Spot price
        #[arg(long)]
        spot: f64,
    },
}

#[derive(Args)]
pub struct RunArgs {
    /// Poll NIFTY
    #[arg(long)]
    pub nifty: bool,

    /// Poll BANKNIFTY
    #[arg(long)]
    pub banknifty: bool,

    /// Poll FINNIFTY
    #[arg(long)]
    pub finnifty: bool,

    /// Futures expiry for NIFTY and BANKNIFTY (e.g. "24 Nov 2022" or 2022-11-24)
    #[arg(long)]
    pub fut_expiry: Option<String>,

    /// Option expiry for NIFTY and BANKNIFTY: a date or a raw exchange time code
    #[arg(long)]
    pub opt_expiry: Option<String>,

    /// Futures expiry for FINNIFTY
    #[arg(long)]
    pub finnifty_fut_expiry: Option<String>,

    /// Option expiry for FINNIFTY: a date or a raw exchange time code
    #[arg(long)]
    pub finnifty_opt_expiry: Option<String>,

    /// HTML page rewritten every cycle
    #[arg(long, short = 'o', default_value = "premium.html")]
    pub output: PathBuf,

    /// Pause between cycles in milliseconds
    #[arg(long, default_value = "1000")]
    pub interval_ms: u64,

    /// Stop after N cycles (default: run until Ctrl-C)
    #[arg(long)]
    pub cycles: Option<u64>,

    /// HTTP request timeout in seconds
    #[arg(long, default_value = "30")]
    pub timeout_secs: u64,

    /// Path to the app credentials JSON (default: ~/.premium-discount/creds.json)
    #[arg(long)]
    pub creds: Option<PathBuf>,
}

impl RunArgs {
    pub fn into_config(self) -> RunConfig {
        let indices = [
            (self.nifty, Index::Nifty),
            (self.banknifty, Index::BankNifty),
            (self.finnifty, Index::FinNifty),
        ]
        .into_iter()
        .filter_map(|(on, index)| on.then_some(index))
        .collect();

        RunConfig {
            indices,
            fut_expiry: self.fut_expiry,
            opt_expiry: self.opt_expiry,
            finnifty_fut_expiry: self.finnifty_fut_expiry,
            finnifty_opt_expiry: self.finnifty_opt_expiry,
            output: self.output,
            interval_ms: self.interval_ms,
            cycles: self.cycles,
            timeout_secs: self.timeout_secs,
            creds: self.creds,
        }
    }
}
