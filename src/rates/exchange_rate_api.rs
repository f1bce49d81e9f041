use std::{collections::HashMap, time::Duration};

use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::transfers::domain::currency::Currency;

use super::{RateGatewayError, RateProvider, Rates};

pub const DEFAULT_BASE_URL: &str = "https://v6.exchangerate-api.com/v6";

pub struct ExchangeRateApiOptions {
    /// Root of the provider's API, without the credential.
    pub base_url: String,
    pub api_key: String,
    /// How long to wait for the provider before giving up on a request.
    pub timeout: Duration,
}

/// Client for the ExchangeRate-API v6 service.
pub struct ExchangeRateApiClient {
    api_key: String,
    base_url: String,
    client: Client,
}

#[derive(Deserialize)]
struct LatestRatesResponse {
    conversion_rates: HashMap<String, f64>,
}

#[derive(Deserialize)]
struct PairRateResponse {
    conversion_rate: Option<f64>,
}

impl ExchangeRateApiClient {
    pub fn new(opts: ExchangeRateApiOptions) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(opts.timeout)
            .user_agent(concat!("currency-transfers/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            api_key: opts.api_key,
            base_url: opts.base_url.trim_end_matches('/').to_owned(),
            client,
        })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, RateGatewayError> {
        // The credential is part of the URL, so only the path is logged.
        let url = format!("{}/{}/{}", self.base_url, self.api_key, path);
        debug!(%path, "Requesting exchange rates from provider.");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|error| no_response(path, error))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let body = serde_json::from_str(&text).unwrap_or(Value::String(text));

            return Err(RateGatewayError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        // The timeout also covers reading the body.
        let bytes = response
            .bytes()
            .await
            .map_err(|error| no_response(path, error))?;

        serde_json::from_slice(&bytes)
            .map_err(|error| RateGatewayError::Malformed(error.to_string()))
    }
}

fn no_response(path: &str, error: reqwest::Error) -> RateGatewayError {
    warn!(%path, timeout = error.is_timeout(), "No response from exchange rate provider.");

    if error.is_timeout() {
        RateGatewayError::Unreachable("request timed out".to_owned())
    } else {
        RateGatewayError::Unreachable("no response received".to_owned())
    }
}

/// Narrow the provider's full rate table down to the supported currencies.
fn supported_rates(conversion_rates: &HashMap<String, f64>) -> Result<Rates, RateGatewayError> {
    Currency::ALL
        .into_iter()
        .map(|currency| {
            conversion_rates
                .get(currency.code())
                .map(|rate| (currency, *rate))
                .ok_or_else(|| {
                    RateGatewayError::Malformed(format!("missing rate for {}", currency))
                })
        })
        .collect()
}

#[async_trait]
impl RateProvider for ExchangeRateApiClient {
    #[instrument(skip(self))]
    async fn fetch_all_rates(&self) -> Result<Rates, RateGatewayError> {
        let response: LatestRatesResponse = self.get("latest/USD").await?;

        supported_rates(&response.conversion_rates)
    }

    #[instrument(skip(self))]
    async fn fetch_pair_rate(
        &self,
        from: Currency,
        to: Currency,
    ) -> Result<f64, RateGatewayError> {
        let response: PairRateResponse = self
            .get(&format!("pair/{}/{}", from.code(), to.code()))
            .await?;

        response
            .conversion_rate
            .filter(|rate| rate.is_finite() && *rate > 0.0)
            .ok_or_else(|| {
                RateGatewayError::Malformed("response is missing the conversion rate".to_owned())
            })
    }
}
