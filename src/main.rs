use clap::Parser;
use tracing_subscriber::EnvFilter;

use premium_discount::model::index::Index;
use premium_discount::{run, strikes};

mod cli;

fn init_logging(debug: bool) {
    let default = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn print_strikes(index: Index, spot: f64) -> anyhow::Result<()> {
    if !spot.is_finite() || spot <= 0.0 {
        anyhow::bail!("spot must be a positive number, got {spot}");
    }
    let window = strikes::select(index, spot);
    let fmt = |ks: &[f64]| ks.iter().map(|k| k.to_string()).collect::<Vec<_>>().join(" ");

    println!("{} spot {} -> ATM {}", index.name(), spot, window.reference);
    println!("Increment: {}", window.increment);
    println!("Calls:     {}", fmt(&window.calls));
    println!("Puts:      {}", fmt(&window.puts));
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    init_logging(cli.debug);

    match cli.command {
        cli::Command::Run(args) => run::run(&args.into_config()),
        cli::Command::CheckExpiry(args) => run::check_expiry(&args.into_config()),
        cli::Command::Strikes { index, spot } => print_strikes(index, spot),
    }
}
