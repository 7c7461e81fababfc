//! HTML rendering of premium tables.
//!
//! Each index renders to a self-contained `<table>` fragment, strikes as
//! columns. A cycle's fragments are stacked into one page in index order,
//! with a placeholder for every index that has no data this cycle.

use std::collections::BTreeMap;
use std::fmt::Write;

use crate::model::index::Index;
use crate::model::quote::{OptionType, QuoteSnapshot};
use crate::premium::{Annotation, Leg, PremiumRow, PremiumTable};

/// Rendered fragment per index; `None` marks an index still pending.
pub type CycleOutput = BTreeMap<Index, Option<String>>;

const GREEN: &str = "#32CD32";
const RED: &str = "#FF5C5C";

pub const STYLE: &str = r#"
tr { line-height: 30px; }
table.premium { margin-top: 30px; width: 100%; border-collapse: collapse; }
table.premium td { text-align: center; font-size: 16px; }
table.premium th.label { width: 6%; text-align: left; }
table.premium caption { font-size: 14px; font-weight: bold; padding: 5px; }
table.premium td.atm { background-color: #C5C5C5; color: black; font-weight: bold; }
table.premium td.atm.cheap { background-color: #32CD32; }
th.atm { background-color: #C5C5C5; color: black; text-align: center; }
th.calls { background-color: #32CD32; color: black; text-align: center; }
th.puts { background-color: #FF5C5C; color: black; text-align: center; }
td.discount { background-color: lightgreen; color: black; font-weight: bold; font-size: 12px; }
"#;

fn price(v: f64) -> String {
    format!("{v:.2}")
}

fn leg_cell(leg: Option<&Leg>, value: impl Fn(&Leg) -> f64) -> String {
    leg.map(|l| price(value(l))).unwrap_or_else(|| "&nbsp;".to_string())
}

/// Body lines of the table, one cell per strike.
#[derive(Clone, Copy)]
enum Line {
    Strike,
    CallPrice,
    PutPrice,
    CallPremium,
    PutPremium,
}

impl Line {
    const ALL: [Line; 5] = [
        Line::Strike,
        Line::CallPrice,
        Line::PutPrice,
        Line::CallPremium,
        Line::PutPremium,
    ];

    fn label(self) -> &'static str {
        match self {
            Line::Strike => "Strikes",
            Line::CallPrice => "CE LTP",
            Line::PutPrice => "PE LTP",
            Line::CallPremium => "CE Premium",
            Line::PutPremium => "PE Premium",
        }
    }

    /// The leg whose premium this line shows.
    fn premium_of(self) -> Option<OptionType> {
        match self {
            Line::CallPremium => Some(OptionType::Call),
            Line::PutPremium => Some(OptionType::Put),
            _ => None,
        }
    }

    fn cell(self, row: &PremiumRow) -> String {
        match self {
            Line::Strike => format!("{}", row.strike),
            Line::CallPrice => leg_cell(row.call.as_ref(), |l| l.last_price),
            Line::PutPrice => leg_cell(row.put.as_ref(), |l| l.last_price),
            Line::CallPremium => leg_cell(row.call.as_ref(), |l| l.premium),
            Line::PutPremium => leg_cell(row.put.as_ref(), |l| l.premium),
        }
    }
}

/// Render one index's table.
pub fn fragment(table: &PremiumTable, quotes: &QuoteSnapshot) -> String {
    let profile = table.index.profile();
    let basis = quotes.basis();
    let basis_color = if basis < 0.0 { RED } else { GREEN };
    let below = table.atm_position;
    let above = table.rows.len() - table.atm_position - 1;

    let mut html = String::new();
    let _ = write!(
        html,
        r#"<table border="1" class="premium {class}" style="border-top: 4px solid {color}">"#,
        class = profile.class_name,
        color = profile.color,
    );
    let _ = write!(
        html,
        "<caption>{name} Spot : {spot}</caption>\
         <caption>{name} Fut : {fut} <span style='color:{basis_color}'>({basis})</span></caption>",
        name = profile.name,
        spot = quotes.spot,
        fut = quotes.futures,
    );

    html.push_str("<thead><tr><th class=\"label\"></th>");
    if below > 0 {
        let _ = write!(html, r#"<th colspan="{below}" class="calls">Calls</th>"#);
    }
    html.push_str(r#"<th class="atm">ATM</th>"#);
    if above > 0 {
        let _ = write!(html, r#"<th colspan="{above}" class="puts">Puts</th>"#);
    }
    html.push_str("</tr></thead><tbody>");

    for line in Line::ALL {
        let _ = write!(html, r#"<tr><th class="label">{}</th>"#, line.label());
        for (i, row) in table.rows.iter().enumerate() {
            let class = if i != table.atm_position {
                ""
            } else if line.premium_of().is_some() && line.premium_of() == table.atm.cheaper {
                r#" class="atm cheap""#
            } else {
                r#" class="atm""#
            };
            let _ = write!(html, "<td{class}>{}</td>", line.cell(row));
        }
        html.push_str("</tr>");
    }

    html.push_str(r#"<tr><th class="label">Discount</th>"#);
    for row in &table.rows {
        match &row.annotation {
            Annotation::None => html.push_str("<td>&nbsp;</td>"),
            Annotation::Discount => html.push_str(r#"<td class="discount">Discount</td>"#),
            Annotation::Atm(atm) => {
                let spread = atm
                    .spread_pct
                    .map(|p| format!("{p}%"))
                    .unwrap_or_else(|| "-".to_string());
                let _ = write!(
                    html,
                    r#"<td class="atm">{}<br>({spread})</td>"#,
                    atm.difference
                );
            }
        }
    }
    html.push_str("</tr></tbody></table>");
    html
}

/// Stack a cycle's fragments in index order.
pub fn page(output: &CycleOutput) -> String {
    let mut html = String::from(r#"<div style="width: 100%;">"#);
    for (index, fragment) in output {
        match fragment {
            Some(f) => html.push_str(f),
            None => {
                let _ = write!(html, "<h3><i>Fetching {index} Option data.....</i></h3>");
            }
        }
    }
    html.push_str("</div>");
    html
}

/// Wrap a page in a standalone document that reloads itself.
pub fn document(body: &str, refresh_secs: u64) -> String {
    format!(
        "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\">\
         <meta http-equiv=\"refresh\" content=\"{refresh_secs}\">\
         <title>Index option premiums</title><style>{STYLE}</style></head>\
         <body><div style=\"padding-left:30px; padding-right:30px\">{body}</div></body></html>\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::quote::OptionQuote;
    use crate::{premium, strikes};

    fn sample() -> (PremiumTable, QuoteSnapshot) {
        let spot = 18_230.0;
        let window = strikes::select(Index::Nifty, spot);
        let chain: Vec<OptionQuote> = window
            .calls
            .iter()
            .map(|&k| OptionQuote {
                strike: k,
                option_type: OptionType::Call,
                last_price: (spot - k).max(0.0) + 40.0,
            })
            .chain(window.puts.iter().map(|&k| OptionQuote {
                strike: k,
                option_type: OptionType::Put,
                last_price: (k - spot).max(0.0) + 55.0,
            }))
            .collect();
        let table = premium::compute(Index::Nifty, spot, &window, &chain).unwrap();
        let quotes = QuoteSnapshot {
            spot,
            futures: 18_210.5,
            chain,
        };
        (table, quotes)
    }

    #[test]
    fn test_fragment_layout() {
        let (table, quotes) = sample();
        let html = fragment(&table, &quotes);
        assert!(html.contains(r#"class="premium nifty""#));
        assert!(html.contains(r#"<th colspan="10" class="calls">Calls</th>"#));
        assert!(html.contains(r#"<th colspan="10" class="puts">Puts</th>"#));
        assert!(html.contains("NIFTY Spot : 18230"));
        // futures below spot shows the basis in red
        assert!(html.contains("color:#FF5C5C'>(-19.5)"));
        // call premium is the cheaper leg at the money
        assert!(html.contains(r#"<td class="atm cheap">40.00</td>"#));
        assert!(html.contains("15<br>(27.27%)"));
    }

    #[test]
    fn test_page_marks_pending_indices() {
        let (table, quotes) = sample();
        let mut output = CycleOutput::new();
        output.insert(Index::BankNifty, None);
        output.insert(Index::Nifty, Some(fragment(&table, &quotes)));
        let html = page(&output);
        let nifty = html.find("premium nifty").unwrap();
        let pending = html.find("Fetching BANKNIFTY Option data.....").unwrap();
        assert!(nifty < pending);
    }

    #[test]
    fn test_document_refresh() {
        let doc = document("<p>x</p>", 2);
        assert!(doc.starts_with("<!DOCTYPE html>"));
        assert!(doc.contains(r#"content="2""#));
        assert!(doc.contains("<p>x</p>"));
    }
}
