use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::currency::{Country, Currency};

/// Opaque identifier assigned to a transfer when it is persisted.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct TransferId(Uuid);

impl TransferId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl From<Uuid> for TransferId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl fmt::Display for TransferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for TransferId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

/// Raw data for a new transfer, as submitted by a client. Every field is
/// optional so that missing input can be reported with a useful message
/// instead of a deserialization failure.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTransferData {
    pub from_country: Option<String>,
    pub to_country: Option<String>,
    /// Either a JSON number or a string containing one.
    pub amount: Option<Value>,
}

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum TransferInvalidity {
    #[error("one or more required fields are missing")]
    MissingFields,

    #[error("amount is not a positive number")]
    NonPositiveAmount,

    /// At least one of the provided countries has no supported currency.
    #[error("unsupported country selection")]
    UnsupportedCountry,
}

/// A transfer request that has passed input validation and is ready to be
/// priced.
#[derive(Clone, Debug, PartialEq)]
pub struct TransferRequest {
    from_country: Country,
    to_country: Country,
    amount: f64,
}

impl TransferRequest {
    /// Validate raw transfer data.
    ///
    /// Checks run in a fixed order: required fields, then the amount, then
    /// the countries. The first failing check determines the error.
    pub fn from_data(data: NewTransferData) -> Result<Self, TransferInvalidity> {
        let from_country = non_empty(data.from_country);
        let to_country = non_empty(data.to_country);
        let amount = data.amount.filter(|value| match value {
            Value::Null => false,
            Value::String(s) => !s.is_empty(),
            _ => true,
        });

        let (from_country, to_country, amount) = match (from_country, to_country, amount) {
            (Some(from), Some(to), Some(amount)) => (from, to, amount),
            _ => return Err(TransferInvalidity::MissingFields),
        };

        let amount = parse_positive_amount(&amount).ok_or(TransferInvalidity::NonPositiveAmount)?;

        match (from_country.parse::<Country>(), to_country.parse::<Country>()) {
            (Ok(from_country), Ok(to_country)) => Ok(Self {
                from_country,
                to_country,
                amount,
            }),
            _ => Err(TransferInvalidity::UnsupportedCountry),
        }
    }

    pub fn from_country(&self) -> Country {
        self.from_country
    }

    pub fn to_country(&self) -> Country {
        self.to_country
    }

    pub fn from_currency(&self) -> Currency {
        self.from_country.currency()
    }

    pub fn to_currency(&self) -> Currency {
        self.to_country.currency()
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }

    /// Price the request at the given exchange rate, producing the record to
    /// persist.
    pub fn priced_at(&self, exchange_rate: f64) -> NewTransfer {
        NewTransfer {
            from_country: self.from_country,
            to_country: self.to_country,
            from_currency: self.from_currency(),
            to_currency: self.to_currency(),
            amount: self.amount,
            converted_amount: self.amount * exchange_rate,
            exchange_rate,
            date: None,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

fn parse_positive_amount(value: &Value) -> Option<f64> {
    let amount = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };

    if amount.is_finite() && amount > 0.0 {
        Some(amount)
    } else {
        None
    }
}

/// A transfer that has not been persisted yet.
///
/// The fields are checked by [`Validate`] at the storage boundary, so a
/// record built by hand cannot bypass the schema.
#[derive(Clone, Debug, PartialEq, Validate)]
#[validate(schema(function = "validate_new_transfer", skip_on_field_errors = false))]
pub struct NewTransfer {
    pub from_country: Country,
    pub to_country: Country,
    pub from_currency: Currency,
    pub to_currency: Currency,
    #[validate(range(min = 0.0))]
    pub amount: f64,
    #[validate(range(min = 0.0))]
    pub converted_amount: f64,
    pub exchange_rate: f64,
    /// When the transfer was made. The store uses the time of insertion if
    /// this is not set.
    pub date: Option<DateTime<Utc>>,
}

fn validate_new_transfer(transfer: &NewTransfer) -> Result<(), ValidationError> {
    if transfer.from_country.currency() != transfer.from_currency
        || transfer.to_country.currency() != transfer.to_currency
    {
        return Err(ValidationError::new("currency_country_mismatch"));
    }

    if !transfer.exchange_rate.is_finite() {
        return Err(ValidationError::new("exchange_rate"));
    }

    // Infinite amounts can't be represented in JSON.
    if !(transfer.amount.is_finite() && transfer.converted_amount.is_finite()) {
        return Err(ValidationError::new("non_finite_amount"));
    }

    Ok(())
}

impl NewTransfer {
    /// Attach an ID and date, producing the persisted form of the transfer.
    pub fn into_transfer(self, id: TransferId, created_at: DateTime<Utc>) -> Transfer {
        Transfer {
            id,
            from_country: self.from_country,
            to_country: self.to_country,
            from_currency: self.from_currency,
            to_currency: self.to_currency,
            amount: self.amount,
            converted_amount: self.converted_amount,
            exchange_rate: self.exchange_rate,
            date: self.date.unwrap_or(created_at),
        }
    }
}

/// A persisted transfer. Transfers are never modified once persisted.
#[derive(Clone, Debug, PartialEq)]
pub struct Transfer {
    pub id: TransferId,
    pub from_country: Country,
    pub to_country: Country,
    pub from_currency: Currency,
    pub to_currency: Currency,
    pub amount: f64,
    pub converted_amount: f64,
    pub exchange_rate: f64,
    pub date: DateTime<Utc>,
}
