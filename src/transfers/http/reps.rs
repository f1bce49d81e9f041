use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    rates::Rates,
    transfers::domain::{
        self,
        currency::{Country, Currency},
    },
};

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transfer {
    pub id: Uuid,
    pub from_country: Country,
    pub to_country: Country,
    pub from_currency: Currency,
    pub to_currency: Currency,
    pub amount: f64,
    pub converted_amount: f64,
    pub exchange_rate: f64,
    pub date: DateTime<Utc>,
}

impl From<&domain::transfers::Transfer> for Transfer {
    fn from(transfer: &domain::transfers::Transfer) -> Self {
        Self {
            id: transfer.id.as_uuid(),
            from_country: transfer.from_country,
            to_country: transfer.to_country,
            from_currency: transfer.from_currency,
            to_currency: transfer.to_currency,
            amount: transfer.amount,
            converted_amount: transfer.converted_amount,
            exchange_rate: transfer.exchange_rate,
            date: transfer.date,
        }
    }
}

/// Body of a request to create a transfer.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTransfer {
    pub from_country: Country,
    pub to_country: Country,
    pub amount: f64,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct RatesCollection {
    pub rates: Rates,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Message {
    pub message: String,
}
