pub mod expiry;
pub mod index;
pub mod quote;

pub use expiry::{ExpiryConfig, ExpiryList, OptionExpiry, ResolvedExpiry};
pub use index::{Index, IndexProfile, Rounding};
pub use quote::{OptionQuote, OptionType, QuoteSnapshot};
