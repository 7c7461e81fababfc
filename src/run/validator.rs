use std::collections::BTreeMap;

use tracing::info;

use crate::broker::{self, Broker};
use crate::error::ConfigError;
use crate::model::expiry::{self, ExpiryConfig, ExpiryList, ResolvedExpiry};
use crate::model::index::Index;

/// Check one index's configured expiries against the exchange's list.
pub fn check(
    index: Index,
    config: &ExpiryConfig,
    list: &ExpiryList,
) -> Result<ResolvedExpiry, Vec<ConfigError>> {
    let mut errors = Vec::new();

    if list.find_date(config.futures).is_none() {
        errors.push(ConfigError::InvalidFuturesExpiry {
            index,
            date: config.futures.to_string(),
        });
    }
    let option_time_code = list.resolve(config.option);
    if option_time_code.is_none() {
        errors.push(ConfigError::InvalidOptionExpiry {
            index,
            expiry: config.option.to_string(),
        });
    }

    match option_time_code {
        Some(code) if errors.is_empty() => Ok(ResolvedExpiry {
            futures_symbol: format!("{} {}", index.name(), expiry::contract_date(config.futures)),
            option_time_code: code,
        }),
        _ => Err(errors),
    }
}

/// Validate every configured index before polling starts.
///
/// All indices are checked; every problem found is returned.
pub async fn validate<B: Broker + ?Sized>(
    broker: &B,
    expiries: &BTreeMap<Index, ExpiryConfig>,
) -> Result<BTreeMap<Index, ResolvedExpiry>, Vec<ConfigError>> {
    let mut resolved = BTreeMap::new();
    let mut errors = Vec::new();

    for (&index, config) in expiries {
        let list = match broker::fetch_expiries(broker, index).await {
            Ok(list) => list,
            Err(e) => {
                errors.push(e);
                continue;
            }
        };
        match check(index, config, &list) {
            Ok(r) => {
                info!(%index, futures = %r.futures_symbol, option_time_code = r.option_time_code, "expiry valid");
                resolved.insert(index, r);
            }
            Err(errs) => errors.extend(errs),
        }
    }

    if errors.is_empty() {
        Ok(resolved)
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::expiry::OptionExpiry;
    use chrono::NaiveDate;

    fn list() -> ExpiryList {
        // 17 Nov and 24 Nov 2022, 15:30 IST
        ExpiryList {
            time_codes: vec![1_668_679_200_000, 1_669_284_000_000],
        }
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2022, 11, d).unwrap()
    }

    #[test]
    fn test_valid_expiries_resolve() {
        let config = ExpiryConfig {
            futures: date(24),
            option: OptionExpiry::Date(date(17)),
        };
        let r = check(Index::BankNifty, &config, &list()).unwrap();
        assert_eq!(r.futures_symbol, "BANKNIFTY 24 Nov 2022");
        assert_eq!(r.option_time_code, 1_668_679_200_000);
    }

    #[test]
    fn test_both_invalid_reported() {
        let config = ExpiryConfig {
            futures: date(25),
            option: OptionExpiry::TimeCode(42),
        };
        let errs = check(Index::Nifty, &config, &list()).unwrap_err();
        assert_eq!(errs.len(), 2);
        assert!(matches!(errs[0], ConfigError::InvalidFuturesExpiry { .. }));
        assert!(matches!(errs[1], ConfigError::InvalidOptionExpiry { .. }));
    }

    #[test]
    fn test_invalid_futures_only() {
        let config = ExpiryConfig {
            futures: date(30),
            option: OptionExpiry::TimeCode(1_669_284_000_000),
        };
        let errs = check(Index::FinNifty, &config, &list()).unwrap_err();
        assert_eq!(
            errs,
            vec![ConfigError::InvalidFuturesExpiry {
                index: Index::FinNifty,
                date: "2022-11-30".into()
            }]
        );
    }
}
