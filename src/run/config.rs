use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};

use crate::broker::{Credentials, LoginDetails};
use crate::error::ConfigError;
use crate::model::expiry::{self, ExpiryConfig, OptionExpiry};
use crate::model::index::Index;

/// Where the credentials file lives by default.
fn default_creds_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".premium-discount")
        .join("creds.json")
}

/// Runtime configuration for the `run` and `check-expiry` commands.
pub struct RuntimeConfig {
    pub login: LoginDetails,
    pub expiries: BTreeMap<Index, ExpiryConfig>,
    pub output: PathBuf,
    pub interval: Duration,
    pub cycles: Option<u64>,
    pub timeout: Duration,
}

impl RuntimeConfig {
    pub fn from_cli(cli: &crate::run::RunConfig) -> Result<Self> {
        let expiries = expiry_configs(cli)?;

        let creds_path = cli.creds.clone().unwrap_or_else(default_creds_path);
        let credentials = load_credentials(&creds_path)?;

        let email = env_var("FIVEPAISA_EMAIL", "your 5paisa login email")?;
        let password = env_var("FIVEPAISA_PASSWORD", "your 5paisa login password")?;
        let dob = env_var("FIVEPAISA_DOB", "your date of birth as YYYYMMDD")?;

        Ok(RuntimeConfig {
            login: LoginDetails {
                credentials,
                email,
                password,
                dob,
            },
            expiries,
            output: cli.output.clone(),
            interval: Duration::from_millis(cli.interval_ms),
            cycles: cli.cycles,
            timeout: Duration::from_secs(cli.timeout_secs),
        })
    }
}

fn env_var(name: &str, hint: &str) -> Result<String> {
    std::env::var(name).map_err(|_| anyhow::anyhow!("{name} env var not set. Set it to {hint}."))
}

/// Read the app credentials JSON (`APP_NAME`, `USER_KEY`, ...).
pub fn load_credentials(path: &Path) -> Result<Credentials> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("reading credentials at {}", path.display()))?;
    let creds: Credentials = serde_json::from_str(&contents)
        .with_context(|| format!("parsing credentials at {}", path.display()))?;
    Ok(creds)
}

/// Expiry configuration for every requested index.
///
/// NIFTY and BANKNIFTY share `--fut-expiry`/`--opt-expiry`; FINNIFTY has its own pair.
pub fn expiry_configs(
    cli: &crate::run::RunConfig,
) -> Result<BTreeMap<Index, ExpiryConfig>, ConfigError> {
    if cli.indices.is_empty() {
        return Err(ConfigError::NoIndices);
    }

    let mut configs = BTreeMap::new();
    for &index in &cli.indices {
        let (fut, opt) = match index {
            Index::Nifty | Index::BankNifty => (&cli.fut_expiry, &cli.opt_expiry),
            Index::FinNifty => (&cli.finnifty_fut_expiry, &cli.finnifty_opt_expiry),
        };
        let (Some(fut), Some(opt)) = (fut, opt) else {
            return Err(ConfigError::MissingExpiry(index));
        };
        configs.insert(
            index,
            ExpiryConfig {
                futures: expiry::parse_date(fut)?,
                option: opt.parse::<OptionExpiry>()?,
            },
        );
    }
    Ok(configs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::run::RunConfig;
    use chrono::NaiveDate;

    fn cli(indices: Vec<Index>) -> RunConfig {
        RunConfig {
            indices,
            fut_expiry: Some("24 Nov 2022".into()),
            opt_expiry: Some("2022-11-17".into()),
            finnifty_fut_expiry: Some("29 Nov 2022".into()),
            finnifty_opt_expiry: Some("1669111200000".into()),
            output: PathBuf::from("out.html"),
            interval_ms: 0,
            cycles: None,
            timeout_secs: 30,
            creds: None,
        }
    }

    #[test]
    fn test_shared_and_separate_expiries() {
        let configs = expiry_configs(&cli(Index::ALL.to_vec())).unwrap();
        assert_eq!(configs.len(), 3);
        assert_eq!(configs[&Index::Nifty], configs[&Index::BankNifty]);
        assert_eq!(
            configs[&Index::Nifty].futures,
            NaiveDate::from_ymd_opt(2022, 11, 24).unwrap()
        );
        assert_eq!(
            configs[&Index::FinNifty].option,
            OptionExpiry::TimeCode(1_669_111_200_000)
        );
    }

    #[test]
    fn test_no_indices() {
        assert_eq!(expiry_configs(&cli(vec![])), Err(ConfigError::NoIndices));
    }

    #[test]
    fn test_missing_finnifty_expiry() {
        let mut c = cli(vec![Index::Nifty, Index::FinNifty]);
        c.finnifty_fut_expiry = None;
        assert_eq!(
            expiry_configs(&c),
            Err(ConfigError::MissingExpiry(Index::FinNifty))
        );
        // not needed when FINNIFTY is not requested
        c.indices = vec![Index::Nifty];
        assert!(expiry_configs(&c).is_ok());
    }

    #[test]
    fn test_bad_date() {
        let mut c = cli(vec![Index::BankNifty]);
        c.fut_expiry = Some("next thursday".into());
        assert!(matches!(expiry_configs(&c), Err(ConfigError::BadDate(_))));
    }
}
