use std::time::{Duration, Instant};

use tracing::{error, info};

use crate::{
    rates::Rates,
    transfers::{domain::currency::Currency, http::reps},
};

use super::api::{ApiClient, ClientError};

/// How long a successful submission stays visible.
pub const SUCCESS_DISPLAY: Duration = Duration::from_secs(3);

const RATES_UNAVAILABLE: &str = "Failed to fetch exchange rates. Please try again later.";
const INCOMPLETE_FORM: &str = "Please fill all fields with valid values";

/// Estimate the result of converting `amount` between two currencies.
///
/// Every rate is expressed against USD, so the amount is first converted to
/// USD and then to the target currency. Returns `None` when the amount
/// doesn't parse or a required rate is missing.
pub fn preview_conversion(amount: &str, from: Currency, to: Currency, rates: &Rates) -> Option<f64> {
    let amount: f64 = amount.trim().parse().ok()?;
    if !amount.is_finite() {
        return None;
    }

    let in_usd = match from {
        Currency::Usd => amount,
        other => amount / rates.get(&other)?,
    };

    Some(in_usd * rates.get(&to)?)
}

/// Value of one unit of `from` in `to`.
pub fn unit_rate(from: Currency, to: Currency, rates: &Rates) -> Option<f64> {
    Some(rates.get(&to)? / rates.get(&from)?)
}

/// State of the form used to send a transfer.
#[derive(Debug)]
pub struct ConverterForm {
    pub from_currency: Currency,
    pub to_currency: Currency,
    pub amount: String,
    rates: Rates,
    error: Option<String>,
    loading: bool,
    succeeded_at: Option<Instant>,
    completed: u64,
}

impl Default for ConverterForm {
    fn default() -> Self {
        Self {
            from_currency: Currency::Usd,
            to_currency: Currency::Lkr,
            amount: "1.00".to_owned(),
            rates: Rates::new(),
            error: None,
            loading: false,
            succeeded_at: None,
            completed: 0,
        }
    }
}

impl ConverterForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rates(rates: Rates) -> Self {
        Self {
            rates,
            ..Self::default()
        }
    }

    pub fn rates(&self) -> &Rates {
        &self.rates
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Number of transfers sent from this form. Views showing past transfers
    /// watch this to know when to refresh.
    pub fn completed_transfers(&self) -> u64 {
        self.completed
    }

    pub async fn load_rates(&mut self, api: &ApiClient) {
        match api.get_rates().await {
            Ok(rates) => {
                self.rates = rates;
                self.error = None;
            }
            Err(error) => {
                error!(%error, "Failed to load rates.");
                self.error = Some(RATES_UNAVAILABLE.to_owned());
            }
        }
    }

    pub fn preview(&self) -> Option<f64> {
        if self.rates.is_empty() {
            return None;
        }

        preview_conversion(&self.amount, self.from_currency, self.to_currency, &self.rates)
    }

    pub fn unit_rate(&self) -> Option<f64> {
        unit_rate(self.from_currency, self.to_currency, &self.rates)
    }

    pub fn swap(&mut self) {
        std::mem::swap(&mut self.from_currency, &mut self.to_currency);
    }

    fn parsed_amount(&self) -> Option<f64> {
        self.amount
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|amount| amount.is_finite() && *amount > 0.0)
    }

    /// Submission is enabled when nothing is in flight and the amount is a
    /// positive number.
    pub fn can_submit(&self) -> bool {
        !self.loading && self.parsed_amount().is_some()
    }

    pub fn transfer_request(&self) -> Result<reps::NewTransfer, String> {
        let amount = self.parsed_amount().ok_or_else(|| INCOMPLETE_FORM.to_owned())?;

        Ok(reps::NewTransfer {
            from_country: self.from_currency.country(),
            to_country: self.to_currency.country(),
            amount,
        })
    }

    /// Send the transfer described by the form.
    ///
    /// Returns the created transfer on success. On failure the message to
    /// show is available from [`ConverterForm::error`].
    pub async fn submit(&mut self, api: &ApiClient, now: Instant) -> Option<reps::Transfer> {
        self.succeeded_at = None;

        let request = match self.transfer_request() {
            Ok(request) => request,
            Err(message) => {
                self.error = Some(message);
                return None;
            }
        };

        self.error = None;
        self.loading = true;
        let result = api.create_transfer(&request).await;
        self.loading = false;

        self.finish_submit(result, now)
    }

    fn finish_submit(
        &mut self,
        result: Result<reps::Transfer, ClientError>,
        now: Instant,
    ) -> Option<reps::Transfer> {
        match result {
            Ok(transfer) => {
                info!(id = %transfer.id, "Transfer sent.");
                self.succeeded_at = Some(now);
                self.completed += 1;

                Some(transfer)
            }
            Err(error) => {
                self.error = Some(error.to_string());

                None
            }
        }
    }

    pub fn success_visible(&self, now: Instant) -> bool {
        self.succeeded_at
            .map_or(false, |at| now.saturating_duration_since(at) < SUCCESS_DISPLAY)
    }

    /// Forget a success that has been displayed long enough.
    pub fn tick(&mut self, now: Instant) {
        if !self.success_visible(now) {
            self.succeeded_at = None;
        }
    }
}
