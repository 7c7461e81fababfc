//! Strike selection around the current spot.
//!
//! The reference spot is the raw spot snapped to a listed strike using the
//! index's [`Rounding`] rule. Calls are taken from ten increments below the
//! reference up to one increment above it; puts from one increment below up
//! to ten above. The three strikes around the reference therefore carry both
//! legs once the two sides are merged.

use crate::model::index::{Index, Rounding};

/// Strikes on each side of the reference, the reference included.
pub const WINDOW: usize = 11;

#[derive(Debug, Clone, PartialEq)]
pub struct StrikeWindow {
    /// Spot snapped to the nearest listed strike.
    pub reference: f64,
    pub increment: f64,
    /// `WINDOW` strikes ending at the reference, then one above it.
    pub calls: Vec<f64>,
    /// One strike below the reference, then `WINDOW` strikes starting at it.
    pub puts: Vec<f64>,
}

/// Snap a raw spot price to the strike grid of `index`.
pub fn round_spot(index: Index, spot: f64) -> f64 {
    let base = (spot / 100.0).floor() * 100.0;
    let rem = spot - base;
    match index.profile().rounding {
        Rounding::NearestHundred => {
            if rem < 50.0 {
                base
            } else {
                base + 100.0
            }
        }
        Rounding::NearestFifty => {
            if rem < 25.0 {
                base
            } else if rem < 75.0 {
                base + 50.0
            } else {
                base + 100.0
            }
        }
    }
}

/// Select the call and put strike windows for `spot`.
pub fn select(index: Index, spot: f64) -> StrikeWindow {
    let increment = index.profile().increment;
    let reference = round_spot(index, spot);
    let span = (WINDOW - 1) as f64;

    let mut calls: Vec<f64> = (0..WINDOW)
        .map(|i| reference - (span - i as f64) * increment)
        .collect();
    calls.push(reference + increment);

    let mut puts = Vec::with_capacity(WINDOW + 1);
    puts.push(reference - increment);
    puts.extend((0..WINDOW).map(|i| reference + i as f64 * increment));

    StrikeWindow {
        reference,
        increment,
        calls,
        puts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_banknifty_rounding() {
        assert_eq!(round_spot(Index::BankNifty, 52345.0), 52300.0);
        assert_eq!(round_spot(Index::BankNifty, 52349.95), 52300.0);
        assert_eq!(round_spot(Index::BankNifty, 52350.0), 52400.0);
        assert_eq!(round_spot(Index::BankNifty, 52399.0), 52400.0);
        assert_eq!(round_spot(Index::BankNifty, 52300.0), 52300.0);
    }

    #[test]
    fn test_fifty_point_rounding() {
        assert_eq!(round_spot(Index::Nifty, 18224.0), 18200.0);
        assert_eq!(round_spot(Index::Nifty, 18225.0), 18250.0);
        assert_eq!(round_spot(Index::Nifty, 18250.0), 18250.0);
        assert_eq!(round_spot(Index::Nifty, 18274.0), 18250.0);
        assert_eq!(round_spot(Index::Nifty, 18275.0), 18300.0);
        assert_eq!(round_spot(Index::FinNifty, 19099.9), 19100.0);
        // Fractional remainders between the integer thresholds still land on the grid.
        assert_eq!(round_spot(Index::Nifty, 18224.5), 18200.0);
        assert_eq!(round_spot(Index::Nifty, 18274.5), 18250.0);
    }

    #[test]
    fn test_banknifty_fixture() {
        let w = select(Index::BankNifty, 52345.0);
        assert_eq!(w.reference, 52300.0);

        let mut expected_calls: Vec<f64> = (0..11).map(|i| 51300.0 + 100.0 * i as f64).collect();
        expected_calls.push(52400.0);
        assert_eq!(w.calls, expected_calls);

        let mut expected_puts = vec![52200.0];
        expected_puts.extend((0..11).map(|i| 52300.0 + 100.0 * i as f64));
        assert_eq!(w.puts, expected_puts);
    }

    #[test]
    fn test_window_shape_over_many_spots() {
        for index in Index::ALL {
            let inc = index.profile().increment;
            let mut spot = 15_000.0;
            while spot < 60_000.0 {
                let w = select(index, spot);
                assert_eq!(w.calls.len(), 12);
                assert_eq!(w.puts.len(), 12);
                for pair in w.calls.windows(2).chain(w.puts.windows(2)) {
                    assert_eq!(pair[1] - pair[0], inc);
                }
                assert_eq!(w.calls[10], w.reference);
                assert_eq!(w.puts[1], w.reference);
                assert_eq!(w.reference % inc, 0.0);
                assert!((w.reference - spot).abs() <= inc);
                spot += 13.37;
            }
        }
    }

    #[test]
    fn test_rounding_is_idempotent() {
        for index in Index::ALL {
            let mut spot = 17_000.0;
            while spot < 18_000.0 {
                let once = round_spot(index, spot);
                assert_eq!(round_spot(index, once), once);
                spot += 7.25;
            }
        }
    }
}
