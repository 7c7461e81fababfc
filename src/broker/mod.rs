pub mod crypto;
pub mod fivepaisa;
pub mod types;

use anyhow::Result;
use async_trait::async_trait;
use tracing::debug;

use crate::error::{ConfigError, FetchError};
use crate::model::expiry::{ExpiryList, ResolvedExpiry};
use crate::model::index::Index;
use crate::model::quote::{OptionQuote, OptionType, QuoteSnapshot};

use types::{ExpiryResponse, MarketDepthResponse, OptionChainResponse};

pub use fivepaisa::{Credentials, FivePaisaClient, LoginDetails};

// ── Broker trait ─────────────────────────────────────────────────────

/// Read-only market-data calls against a logged-in brokerage session.
///
/// `Ok(None)` means the API answered with a null body. Transport, HTTP and
/// decoding failures are `Err`.
#[async_trait]
pub trait Broker: Send + Sync {
    /// Expiry list for an index. The same response carries the latest index quote.
    async fn expiry_list(&self, index: Index) -> Result<Option<ExpiryResponse>>;

    /// Market depth for a contract symbol such as `NIFTY 24 Nov 2022`.
    async fn market_depth(&self, symbol: &str) -> Result<Option<MarketDepthResponse>>;

    /// Option chain for an index at one expiry time code.
    async fn option_chain(&self, index: Index, time_code: i64)
    -> Result<Option<OptionChainResponse>>;
}

// ── Typed fetchers ───────────────────────────────────────────────────

fn request_failed(index: Index, err: anyhow::Error) -> FetchError {
    FetchError::Request {
        index,
        reason: format!("{err:#}"),
    }
}

/// Published expiry dates for `index`.
pub async fn fetch_expiries<B: Broker + ?Sized>(
    broker: &B,
    index: Index,
) -> Result<ExpiryList, ConfigError> {
    let resp = broker
        .expiry_list(index)
        .await
        .map_err(|e| ConfigError::ExpiryFetch {
            index,
            reason: format!("{e:#}"),
        })?
        .ok_or_else(|| ConfigError::ExpiryFetch {
            index,
            reason: "empty response".to_string(),
        })?;

    let list = ExpiryList::from_raw(resp.expiry.iter().map(|e| e.expiry_date.as_str()));
    if list.is_empty() {
        return Err(ConfigError::ExpiryFetch {
            index,
            reason: "no expiry dates listed".to_string(),
        });
    }
    Ok(list)
}

pub async fn fetch_spot<B: Broker + ?Sized>(broker: &B, index: Index) -> Result<f64, FetchError> {
    let resp = broker
        .expiry_list(index)
        .await
        .map_err(|e| request_failed(index, e))?;
    resp.and_then(|r| r.lastrate.first().map(|q| q.ltp))
        .ok_or(FetchError::Spot(index))
}

pub async fn fetch_futures<B: Broker + ?Sized>(
    broker: &B,
    index: Index,
    symbol: &str,
) -> Result<f64, FetchError> {
    let resp = broker
        .market_depth(symbol)
        .await
        .map_err(|e| request_failed(index, e))?;
    resp.and_then(|r| r.data)
        .and_then(|data| data.first().map(|d| d.last_traded_price))
        .ok_or(FetchError::Futures(index))
}

pub async fn fetch_chain<B: Broker + ?Sized>(
    broker: &B,
    index: Index,
    time_code: i64,
) -> Result<Vec<OptionQuote>, FetchError> {
    let resp = broker
        .option_chain(index, time_code)
        .await
        .map_err(|e| request_failed(index, e))?
        .ok_or(FetchError::OptionChain(index))?;
    if resp.options.is_empty() {
        return Err(FetchError::OptionChain(index));
    }

    let quotes: Vec<OptionQuote> = resp
        .options
        .iter()
        .filter_map(|entry| {
            let option_type = entry.cp_type.parse::<OptionType>().ok()?;
            Some(OptionQuote {
                strike: entry.strike_rate,
                option_type,
                last_price: entry.last_rate,
            })
        })
        .collect();
    debug!(%index, contracts = quotes.len(), "option chain fetched");
    Ok(quotes)
}

/// Fetch spot, futures and option chain for one index concurrently.
pub async fn fetch_snapshot<B: Broker + ?Sized>(
    broker: &B,
    index: Index,
    expiry: &ResolvedExpiry,
) -> Result<QuoteSnapshot, FetchError> {
    let (spot, futures, chain) = tokio::join!(
        fetch_spot(broker, index),
        fetch_futures(broker, index, &expiry.futures_symbol),
        fetch_chain(broker, index, expiry.option_time_code),
    );
    Ok(QuoteSnapshot {
        spot: spot?,
        futures: futures?,
        chain: chain?,
    })
}
