use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, info};
use validator::{Validate, ValidationErrors};

use crate::{
    database::PostgresConnection,
    transfers::{
        domain::transfers::{NewTransfer, Transfer, TransferId},
        models,
    },
};

#[derive(Debug, Error)]
pub enum TransferStoreError {
    /// The record violates the transfer schema and was not persisted.
    #[error("invalid transfer: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("no transfer with ID {0}")]
    NotFound(TransferId),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<sqlx::Error> for TransferStoreError {
    fn from(error: sqlx::Error) -> Self {
        Self::Other(error.into())
    }
}

pub type DynTransferRepo = Arc<dyn TransferRepo + Send + Sync>;

#[async_trait]
pub trait TransferRepo {
    /// Persist a new transfer.
    ///
    /// # Arguments
    ///
    /// * `transfer` - The transfer to persist. It is validated before anything
    ///   is written.
    ///
    /// # Returns
    ///
    /// The persisted transfer, including its generated ID and date.
    async fn insert_transfer(&self, transfer: NewTransfer) -> Result<Transfer, TransferStoreError>;

    /// List every transfer, most recent first.
    async fn list_transfers(&self) -> anyhow::Result<Vec<Transfer>>;

    /// Delete a transfer.
    ///
    /// # Returns
    ///
    /// The removed transfer, or [`TransferStoreError::NotFound`] if no
    /// transfer has the provided ID.
    async fn delete_transfer(&self, id: TransferId) -> Result<Transfer, TransferStoreError>;
}

#[async_trait]
impl TransferRepo for PostgresConnection {
    async fn insert_transfer(&self, transfer: NewTransfer) -> Result<Transfer, TransferStoreError> {
        transfer.validate()?;

        let id = TransferId::generate();

        let persisted = sqlx::query_as::<_, models::Transfer>(
            r#"
            INSERT INTO transfer (
                id, from_country, to_country, from_currency, to_currency,
                amount, converted_amount, exchange_rate, "date"
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, COALESCE($9, now()))
            RETURNING *
            "#,
        )
        .bind(id.as_uuid())
        .bind(transfer.from_country.name())
        .bind(transfer.to_country.name())
        .bind(transfer.from_currency.code())
        .bind(transfer.to_currency.code())
        .bind(transfer.amount)
        .bind(transfer.converted_amount)
        .bind(transfer.exchange_rate)
        .bind(transfer.date)
        .fetch_one(&**self)
        .await?;

        info!(%id, "Persisted new transfer.");

        Ok(persisted
            .try_into_domain()
            .context("Failed to convert persisted transfer into domain object.")?)
    }

    async fn list_transfers(&self) -> anyhow::Result<Vec<Transfer>> {
        let transfers = sqlx::query_as::<_, models::Transfer>(
            r#"
            SELECT *
            FROM transfer
            ORDER BY "date" DESC
            "#,
        )
        .fetch_all(&**self)
        .await?;

        debug!(count = transfers.len(), "Listed transfers.");

        transfers
            .into_iter()
            .map(models::Transfer::try_into_domain)
            .collect()
    }

    async fn delete_transfer(&self, id: TransferId) -> Result<Transfer, TransferStoreError> {
        let deleted = sqlx::query_as::<_, models::Transfer>(
            r#"
            DELETE FROM transfer
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&**self)
        .await?;

        match deleted {
            Some(transfer) => {
                info!(%id, "Deleted transfer.");

                Ok(transfer.try_into_domain()?)
            }
            None => Err(TransferStoreError::NotFound(id)),
        }
    }
}
