use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OptionType {
    #[serde(rename = "CE")]
    Call,
    #[serde(rename = "PE")]
    Put,
}

impl OptionType {
    /// Exchange code, `CE` or `PE`.
    pub fn code(self) -> &'static str {
        match self {
            OptionType::Call => "CE",
            OptionType::Put => "PE",
        }
    }
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for OptionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "CE" | "ce" => Ok(OptionType::Call),
            "PE" | "pe" => Ok(OptionType::Put),
            other => Err(format!("unknown option type '{other}'")),
        }
    }
}

/// One contract from the option chain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OptionQuote {
    pub strike: f64,
    pub option_type: OptionType,
    pub last_price: f64,
}

/// Everything fetched for one index in one polling cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteSnapshot {
    pub spot: f64,
    pub futures: f64,
    pub chain: Vec<OptionQuote>,
}

impl QuoteSnapshot {
    /// Futures minus spot, rounded to paise.
    pub fn basis(&self) -> f64 {
        crate::premium::round2(self.futures - self.spot)
    }
}

/// Integer key for a strike so float strikes can be matched exactly.
pub fn strike_key(strike: f64) -> i64 {
    (strike * 100.0).round() as i64
}
