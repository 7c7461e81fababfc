use thiserror::Error;

use crate::model::index::Index;

/// Fatal problems found before polling starts.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("login failed: {0}")]
    Login(String),

    #[error("{index} futures expiry {date} is not listed by the exchange")]
    InvalidFuturesExpiry { index: Index, date: String },

    #[error("{index} option expiry {expiry} is not listed by the exchange")]
    InvalidOptionExpiry { index: Index, expiry: String },

    #[error("unable to fetch {index} expiry dates: {reason}")]
    ExpiryFetch { index: Index, reason: String },

    #[error("no expiry configured for {0}")]
    MissingExpiry(Index),

    #[error("invalid date '{0}'. Use YYYY-MM-DD or DD Mon YYYY")]
    BadDate(String),

    #[error("no index selected. Pass at least one of --nifty, --banknifty, --finnifty")]
    NoIndices,
}

/// A spot, futures or option-chain call that came back empty or failed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    #[error("{0} spot price unavailable")]
    Spot(Index),

    #[error("{0} futures price unavailable")]
    Futures(Index),

    #[error("{0} option chain unavailable")]
    OptionChain(Index),

    #[error("{index} request failed: {reason}")]
    Request { index: Index, reason: String },
}

/// The fetched data could not be turned into a premium table.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ComputeError {
    #[error("{index} has no complete ATM row at strike {strike}")]
    MissingAtm { index: Index, strike: f64 },

    #[error("{0} option chain matched none of the selected strikes")]
    EmptyTable(Index),
}

/// Coarse classification of a [`PollError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Fetch,
    Compute,
    Interrupted,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PollError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Compute(#[from] ComputeError),

    #[error("{0} worker panicked")]
    WorkerPanicked(Index),

    #[error("interrupted by operator")]
    Interrupted,
}

impl PollError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PollError::Config(_) => ErrorKind::Configuration,
            // A dead worker yields no data for its index, same as a failed fetch.
            PollError::Fetch(_) | PollError::WorkerPanicked(_) => ErrorKind::Fetch,
            PollError::Compute(_) => ErrorKind::Compute,
            PollError::Interrupted => ErrorKind::Interrupted,
        }
    }

    /// Whether the polling loop may carry on after this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(self.kind(), ErrorKind::Fetch | ErrorKind::Compute)
    }
}
