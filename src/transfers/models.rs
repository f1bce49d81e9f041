//! Database representations of transfers.

use anyhow::Context;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::domain::{
    currency::{Country, Currency},
    transfers,
};

/// A row of the `transfer` table. Countries and currencies are stored as
/// their display names and codes respectively.
#[derive(Debug, sqlx::FromRow)]
pub struct Transfer {
    pub id: Uuid,
    pub from_country: String,
    pub to_country: String,
    pub from_currency: String,
    pub to_currency: String,
    pub amount: f64,
    pub converted_amount: f64,
    pub exchange_rate: f64,
    pub date: DateTime<Utc>,
}

impl Transfer {
    pub fn try_into_domain(self) -> anyhow::Result<transfers::Transfer> {
        Ok(transfers::Transfer {
            id: self.id.into(),
            from_country: self
                .from_country
                .parse::<Country>()
                .context("Unknown source country in database.")?,
            to_country: self
                .to_country
                .parse::<Country>()
                .context("Unknown destination country in database.")?,
            from_currency: self
                .from_currency
                .parse::<Currency>()
                .context("Unknown source currency in database.")?,
            to_currency: self
                .to_currency
                .parse::<Currency>()
                .context("Unknown destination currency in database.")?,
            amount: self.amount,
            converted_amount: self.converted_amount,
            exchange_rate: self.exchange_rate,
            date: self.date,
        })
    }
}
