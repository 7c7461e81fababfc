use std::collections::{BTreeMap, HashMap};

use crate::error::ComputeError;
use crate::model::index::Index;
use crate::model::quote::{strike_key, OptionQuote, OptionType};
use crate::strikes::StrikeWindow;

/// Round to two decimal places.
pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

// ── Legs and rows ────────────────────────────────────────────────────

/// One side (call or put) of a strike.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Leg {
    pub last_price: f64,
    /// Signed: negative when the option is out of the money.
    pub intrinsic: f64,
    /// Time value. Negative only when the leg trades below intrinsic.
    pub premium: f64,
}

impl Leg {
    pub fn new(option_type: OptionType, spot: f64, strike: f64, last_price: f64) -> Self {
        let intrinsic = match option_type {
            OptionType::Call => spot - strike,
            OptionType::Put => strike - spot,
        };
        let premium = if last_price == 0.0 {
            // no trade yet
            0.0
        } else if intrinsic <= 0.0 {
            last_price
        } else {
            last_price - intrinsic
        };
        Leg {
            last_price,
            intrinsic,
            premium,
        }
    }

    pub fn below_intrinsic(&self) -> bool {
        self.last_price < self.intrinsic
    }
}

/// Premium comparison shown on the at-the-money row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AtmSummary {
    pub call_premium: f64,
    pub put_premium: f64,
    /// `|call - put|`, two decimals.
    pub difference: f64,
    /// `(max - min) / max * 100`, two decimals. `None` unless the larger premium is positive.
    pub spread_pct: Option<f64>,
    /// The leg with the smaller premium, `None` on a tie.
    pub cheaper: Option<OptionType>,
}

impl AtmSummary {
    pub fn new(call_premium: f64, put_premium: f64) -> Self {
        let max = call_premium.max(put_premium);
        let min = call_premium.min(put_premium);
        let spread_pct = (max > 0.0).then(|| round2((max - min) / max * 100.0));
        let cheaper = if call_premium < put_premium {
            Some(OptionType::Call)
        } else if put_premium < call_premium {
            Some(OptionType::Put)
        } else {
            None
        };
        AtmSummary {
            call_premium,
            put_premium,
            difference: round2((call_premium - put_premium).abs()),
            spread_pct,
            cheaper,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Annotation {
    None,
    Discount,
    Atm(AtmSummary),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PremiumRow {
    pub strike: f64,
    pub call: Option<Leg>,
    pub put: Option<Leg>,
    pub annotation: Annotation,
}

impl PremiumRow {
    fn legs(&self) -> impl Iterator<Item = &Leg> {
        self.call.iter().chain(self.put.iter())
    }

    /// Some leg trades below intrinsic and no leg has a zero premium.
    pub fn is_discount(&self) -> bool {
        self.legs().any(Leg::below_intrinsic) && self.legs().all(|l| l.premium != 0.0)
    }
}

// ── Table ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct PremiumTable {
    pub index: Index,
    pub spot: f64,
    pub reference: f64,
    /// Ascending by strike.
    pub rows: Vec<PremiumRow>,
    /// Position of the ATM row in `rows`.
    pub atm_position: usize,
    pub atm: AtmSummary,
}

impl PremiumTable {
    pub fn atm_row(&self) -> &PremiumRow {
        &self.rows[self.atm_position]
    }
}

/// Build the premium table for one index from its strike window and option chain.
///
/// Strikes missing from the chain are left out. The ATM row is the one at the
/// window's reference strike and must carry both legs.
pub fn compute(
    index: Index,
    spot: f64,
    window: &StrikeWindow,
    chain: &[OptionQuote],
) -> Result<PremiumTable, ComputeError> {
    let mut prices: HashMap<(OptionType, i64), f64> = HashMap::new();
    for quote in chain {
        prices
            .entry((quote.option_type, strike_key(quote.strike)))
            .or_insert(quote.last_price);
    }

    let mut rows: BTreeMap<i64, PremiumRow> = BTreeMap::new();
    let sides = [
        (OptionType::Call, &window.calls),
        (OptionType::Put, &window.puts),
    ];
    for (option_type, strikes) in sides {
        for &strike in strikes.iter() {
            let key = strike_key(strike);
            let Some(&last_price) = prices.get(&(option_type, key)) else {
                continue;
            };
            let row = rows.entry(key).or_insert(PremiumRow {
                strike,
                call: None,
                put: None,
                annotation: Annotation::None,
            });
            let leg = Some(Leg::new(option_type, spot, strike, last_price));
            match option_type {
                OptionType::Call => row.call = leg,
                OptionType::Put => row.put = leg,
            }
        }
    }

    if rows.is_empty() {
        return Err(ComputeError::EmptyTable(index));
    }

    let atm_key = strike_key(window.reference);
    let mut rows: Vec<PremiumRow> = rows.into_values().collect();
    let atm_position = rows
        .iter()
        .position(|r| strike_key(r.strike) == atm_key)
        .ok_or(ComputeError::MissingAtm {
            index,
            strike: window.reference,
        })?;

    let atm = match (rows[atm_position].call, rows[atm_position].put) {
        (Some(call), Some(put)) => AtmSummary::new(call.premium, put.premium),
        _ => {
            return Err(ComputeError::MissingAtm {
                index,
                strike: window.reference,
            });
        }
    };

    for (i, row) in rows.iter_mut().enumerate() {
        row.annotation = if i == atm_position {
            Annotation::Atm(atm)
        } else if row.is_discount() {
            Annotation::Discount
        } else {
            Annotation::None
        };
    }

    Ok(PremiumTable {
        index,
        spot,
        reference: window.reference,
        rows,
        atm_position,
        atm,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_call_leg() {
        // in the money
        let leg = Leg::new(OptionType::Call, 18_230.0, 18_100.0, 150.0);
        assert_eq!(leg.intrinsic, 130.0);
        assert_eq!(leg.premium, 20.0);
        // out of the money: whole price is time value
        let leg = Leg::new(OptionType::Call, 18_230.0, 18_300.0, 45.0);
        assert_eq!(leg.intrinsic, -70.0);
        assert_eq!(leg.premium, 45.0);
    }

    #[test]
    fn test_put_leg() {
        let leg = Leg::new(OptionType::Put, 18_230.0, 18_300.0, 95.5);
        assert_eq!(leg.intrinsic, 70.0);
        assert_eq!(leg.premium, 25.5);
        let leg = Leg::new(OptionType::Put, 18_230.0, 18_100.0, 12.0);
        assert_eq!(leg.premium, 12.0);
    }

    #[test]
    fn test_zero_price_forces_zero_premium() {
        let leg = Leg::new(OptionType::Call, 18_230.0, 17_000.0, 0.0);
        assert_eq!(leg.premium, 0.0);
        assert!(leg.below_intrinsic());
        let leg = Leg::new(OptionType::Put, 18_230.0, 19_000.0, 0.0);
        assert_eq!(leg.premium, 0.0);
    }

    #[test]
    fn test_atm_summary() {
        let s = AtmSummary::new(80.0, 100.0);
        assert_eq!(s.difference, 20.0);
        assert_eq!(s.spread_pct, Some(20.0));
        assert_eq!(s.cheaper, Some(OptionType::Call));

        let s = AtmSummary::new(123.456, 120.0);
        assert_eq!(s.difference, 3.46);
        assert_eq!(s.spread_pct, Some(2.8));
        assert_eq!(s.cheaper, Some(OptionType::Put));

        let s = AtmSummary::new(0.0, 0.0);
        assert_eq!(s.difference, 0.0);
        assert_eq!(s.spread_pct, None);
        assert_eq!(s.cheaper, None);
    }

    #[test]
    fn test_atm_summary_both_legs_below_intrinsic() {
        let s = AtmSummary::new(-5.0, -12.5);
        assert_eq!(s.difference, 7.5);
        assert_eq!(s.spread_pct, None);
        assert_eq!(s.cheaper, Some(OptionType::Put));

        // one negative leg still has a meaningful spread against the positive one
        let s = AtmSummary::new(-10.0, 40.0);
        assert_eq!(s.difference, 50.0);
        assert_eq!(s.spread_pct, Some(125.0));
        assert_eq!(s.cheaper, Some(OptionType::Call));
    }

    #[test]
    fn test_premium_sign_over_many_legs() {
        let spot = 18_230.0;
        let mut strike = 17_000.0;
        while strike <= 19_500.0 {
            for option_type in [OptionType::Call, OptionType::Put] {
                let mut price = 0.0;
                while price <= 1_500.0 {
                    let leg = Leg::new(option_type, spot, strike, price);
                    if price == 0.0 {
                        assert_eq!(leg.premium, 0.0);
                    } else if leg.below_intrinsic() {
                        assert!(leg.premium < 0.0, "{option_type} {strike} @ {price}");
                    } else {
                        assert!(leg.premium >= 0.0, "{option_type} {strike} @ {price}");
                    }
                    price += 12.5;
                }
            }
            strike += 50.0;
        }
    }

    #[test]
    fn test_row_discount_rule() {
        let below = Leg::new(OptionType::Call, 18_230.0, 18_000.0, 220.0);
        assert!(below.premium < 0.0);
        let otm_put = Leg::new(OptionType::Put, 18_230.0, 18_000.0, 8.0);
        let row = PremiumRow {
            strike: 18_000.0,
            call: Some(below),
            put: Some(otm_put),
            annotation: Annotation::None,
        };
        assert!(row.is_discount());

        // a zero-premium leg suppresses the flag
        let dead_put = Leg::new(OptionType::Put, 18_230.0, 18_000.0, 0.0);
        let row = PremiumRow {
            put: Some(dead_put),
            ..row
        };
        assert!(!row.is_discount());

        // call-only row can still be flagged
        let row = PremiumRow {
            strike: 18_000.0,
            call: Some(below),
            put: None,
            annotation: Annotation::None,
        };
        assert!(row.is_discount());
    }
}
