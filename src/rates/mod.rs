//! Exchange rates from a third party provider.

mod exchange_rate_api;

use std::{collections::BTreeMap, sync::Arc};

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::transfers::domain::currency::Currency;

pub use self::exchange_rate_api::{
    ExchangeRateApiClient, ExchangeRateApiOptions, DEFAULT_BASE_URL,
};

/// Exchange rates for each supported currency, relative to USD.
pub type Rates = BTreeMap<Currency, f64>;

#[derive(Debug, Error)]
pub enum RateGatewayError {
    /// The provider answered with a non-success status.
    #[error("exchange rate provider responded with status {status}")]
    Upstream { status: u16, body: Value },

    /// No response was received from the provider.
    #[error("exchange rate provider is unreachable: {0}")]
    Unreachable(String),

    /// The provider's response did not contain the expected rates.
    #[error("invalid response from exchange rate API: {0}")]
    Malformed(String),
}

pub type DynRateProvider = Arc<dyn RateProvider + Send + Sync>;

/// A source of current exchange rates. Implementations must not cache: every
/// call reflects the provider's latest rates.
#[async_trait]
pub trait RateProvider {
    /// Fetch the rate of every supported currency relative to USD.
    ///
    /// # Returns
    ///
    /// A [`Rates`] mapping containing exactly the supported currencies.
    async fn fetch_all_rates(&self) -> Result<Rates, RateGatewayError>;

    /// Fetch the direct conversion rate between two currencies.
    ///
    /// # Arguments
    ///
    /// * `from` - The currency being converted from.
    /// * `to` - The currency being converted to.
    ///
    /// # Returns
    ///
    /// The amount of `to` that one unit of `from` buys.
    async fn fetch_pair_rate(&self, from: Currency, to: Currency)
        -> Result<f64, RateGatewayError>;
}
