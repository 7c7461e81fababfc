use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// An exchange-traded index whose option chain we watch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Index {
    #[serde(rename = "NIFTY")]
    Nifty,
    #[serde(rename = "BANKNIFTY")]
    BankNifty,
    #[serde(rename = "FINNIFTY")]
    FinNifty,
}

/// How a raw spot price snaps to the nearest tradeable strike.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rounding {
    /// Half-up to the nearest 100.
    NearestHundred,
    /// Quarter thresholds: below 25 rounds down, 25..75 goes to 50, 75 and up rounds up.
    NearestFifty,
}

/// Everything index-specific, looked up once via [`Index::profile`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexProfile {
    /// Exchange symbol, also used in futures contract names.
    pub name: &'static str,
    /// Distance between listed strikes.
    pub increment: f64,
    pub rounding: Rounding,
    /// CSS class attached to the rendered table.
    pub class_name: &'static str,
    /// Accent colour for the rendered table.
    pub color: &'static str,
}

const NIFTY: IndexProfile = IndexProfile {
    name: "NIFTY",
    increment: 50.0,
    rounding: Rounding::NearestFifty,
    class_name: "nifty",
    color: "red",
};

const BANKNIFTY: IndexProfile = IndexProfile {
    name: "BANKNIFTY",
    increment: 100.0,
    rounding: Rounding::NearestHundred,
    class_name: "banknifty",
    color: "yellow",
};

const FINNIFTY: IndexProfile = IndexProfile {
    name: "FINNIFTY",
    increment: 50.0,
    rounding: Rounding::NearestFifty,
    class_name: "finnifty",
    color: "blue",
};

impl Index {
    /// Display order on the rendered page.
    pub const ALL: [Index; 3] = [Index::Nifty, Index::BankNifty, Index::FinNifty];

    pub fn profile(self) -> &'static IndexProfile {
        match self {
            Index::Nifty => &NIFTY,
            Index::BankNifty => &BANKNIFTY,
            Index::FinNifty => &FINNIFTY,
        }
    }

    pub fn name(self) -> &'static str {
        self.profile().name
    }
}

impl fmt::Display for Index {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Index {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "NIFTY" | "NIFTY50" | "NIFTY 50" => Ok(Index::Nifty),
            "BANKNIFTY" | "NIFTYBANK" | "NIFTY BANK" => Ok(Index::BankNifty),
            "FINNIFTY" | "NIFTYFIN" => Ok(Index::FinNifty),
            other => Err(format!(
                "unknown index '{other}'. Use NIFTY, BANKNIFTY or FINNIFTY"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display_round_trip() {
        for index in Index::ALL {
            let parsed: Index = index.name().parse().unwrap();
            assert_eq!(parsed, index);
        }
        assert_eq!("banknifty".parse::<Index>().unwrap(), Index::BankNifty);
        assert!("SENSEX".parse::<Index>().is_err());
    }

    #[test]
    fn test_increments() {
        assert_eq!(Index::BankNifty.profile().increment, 100.0);
        assert_eq!(Index::Nifty.profile().increment, 50.0);
        assert_eq!(Index::FinNifty.profile().increment, 50.0);
    }

    #[test]
    fn test_display_order_is_sorted() {
        let mut sorted = Index::ALL;
        sorted.sort();
        assert_eq!(sorted, Index::ALL);
    }
}
