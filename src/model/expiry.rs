use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, TimeDelta};

use crate::error::ConfigError;

/// India Standard Time, UTC+05:30.
const IST_OFFSET_SECS: i64 = 5 * 3600 + 30 * 60;

const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y %m %d", "%d %b %Y", "%d-%b-%Y"];

/// Parse an expiry date written as `2022-11-24`, `2022 11 24`, `24 Nov 2022` or `24-Nov-2022`.
pub fn parse_date(input: &str) -> Result<NaiveDate, ConfigError> {
    let normalized = input.split_whitespace().collect::<Vec<_>>().join(" ");
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(&normalized, fmt).ok())
        .ok_or_else(|| ConfigError::BadDate(input.to_string()))
}

/// Date as it appears in contract symbols, e.g. `24 Nov 2022`.
pub fn contract_date(date: NaiveDate) -> String {
    date.format("%d %b %Y").to_string()
}

/// Calendar date in IST of an exchange time code.
pub fn ist_date(time_code: i64) -> Option<NaiveDate> {
    let utc = DateTime::from_timestamp_millis(time_code)?;
    Some((utc + TimeDelta::seconds(IST_OFFSET_SECS)).date_naive())
}

/// Extract the epoch-ms digits from `/Date(1669875600000+0530)/`.
pub fn parse_exchange_date(raw: &str) -> Option<i64> {
    let rest = raw.trim().strip_prefix("/Date(")?;
    let end = rest
        .char_indices()
        .skip(1)
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| i)
        .unwrap_or(rest.len());
    rest[..end].parse().ok()
}

// ── Option expiry ────────────────────────────────────────────────────

/// Option expiry as configured: either a calendar date or a raw time code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionExpiry {
    Date(NaiveDate),
    TimeCode(i64),
}

impl FromStr for OptionExpiry {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.len() >= 10 && s.chars().all(|c| c.is_ascii_digit()) {
            let code = s.parse().map_err(|_| ConfigError::BadDate(s.to_string()))?;
            return Ok(OptionExpiry::TimeCode(code));
        }
        parse_date(s).map(OptionExpiry::Date)
    }
}

impl fmt::Display for OptionExpiry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionExpiry::Date(d) => write!(f, "{d}"),
            OptionExpiry::TimeCode(code) => match ist_date(*code) {
                Some(d) => write!(f, "{code} ({d})"),
                None => write!(f, "{code}"),
            },
        }
    }
}

/// Futures and option expiry configured for one index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpiryConfig {
    pub futures: NaiveDate,
    pub option: OptionExpiry,
}

/// Expiry configuration after it has been checked against the exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedExpiry {
    /// Futures contract symbol, e.g. `NIFTY 24 Nov 2022`.
    pub futures_symbol: String,
    /// Time code passed to the option-chain lookup.
    pub option_time_code: i64,
}

// ── Exchange expiry list ─────────────────────────────────────────────

/// Expiry time codes published by the exchange for one index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpiryList {
    pub time_codes: Vec<i64>,
}

impl ExpiryList {
    /// Build from raw `/Date(...)/` strings, skipping anything unparseable.
    pub fn from_raw<'a>(raw: impl IntoIterator<Item = &'a str>) -> Self {
        ExpiryList {
            time_codes: raw.into_iter().filter_map(parse_exchange_date).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.time_codes.is_empty()
    }

    /// Time code of the listed expiry falling on `date` (IST).
    pub fn find_date(&self, date: NaiveDate) -> Option<i64> {
        self.time_codes
            .iter()
            .copied()
            .find(|code| ist_date(*code) == Some(date))
    }

    /// Time code to use for `expiry`, if the exchange lists it.
    pub fn resolve(&self, expiry: OptionExpiry) -> Option<i64> {
        match expiry {
            OptionExpiry::TimeCode(code) => self.time_codes.contains(&code).then_some(code),
            OptionExpiry::Date(date) => self.find_date(date),
        }
    }
}
