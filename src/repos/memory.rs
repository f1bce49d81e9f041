use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{debug, info};
use validator::Validate;

use crate::transfers::domain::transfers::{NewTransfer, Transfer, TransferId};

use super::transfers::{TransferRepo, TransferStoreError};

/// A transfer store that lives only as long as the process.
///
/// Transfers are kept sorted by date, newest first. Transfers with the same
/// date are ordered by insertion, newest first.
#[derive(Default)]
pub struct MemoryTransferRepo {
    transfers: RwLock<Vec<Transfer>>,
}

impl MemoryTransferRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TransferRepo for MemoryTransferRepo {
    async fn insert_transfer(&self, transfer: NewTransfer) -> Result<Transfer, TransferStoreError> {
        transfer.validate()?;

        let persisted = transfer.into_transfer(TransferId::generate(), Utc::now());

        let mut transfers = self.transfers.write().await;
        let position = transfers
            .iter()
            .position(|existing| existing.date <= persisted.date)
            .unwrap_or(transfers.len());
        transfers.insert(position, persisted.clone());

        info!(id = %persisted.id, "Persisted new transfer.");

        Ok(persisted)
    }

    async fn list_transfers(&self) -> anyhow::Result<Vec<Transfer>> {
        let transfers = self.transfers.read().await;
        debug!(count = transfers.len(), "Listed transfers.");

        Ok(transfers.clone())
    }

    async fn delete_transfer(&self, id: TransferId) -> Result<Transfer, TransferStoreError> {
        let mut transfers = self.transfers.write().await;

        match transfers.iter().position(|transfer| transfer.id == id) {
            Some(index) => {
                info!(%id, "Deleted transfer.");

                Ok(transfers.remove(index))
            }
            None => Err(TransferStoreError::NotFound(id)),
        }
    }
}

#[cfg(test)]
mod test {
    use chrono::{Duration, TimeZone};
    use serde_json::json;

    use crate::transfers::domain::transfers::{NewTransferData, TransferRequest};

    use super::*;

    fn new_transfer(amount: f64) -> NewTransfer {
        TransferRequest::from_data(NewTransferData {
            from_country: Some("USA".to_owned()),
            to_country: Some("India".to_owned()),
            amount: Some(json!(amount)),
        })
        .expect("invalid transfer data")
        .priced_at(83.0)
    }

    #[tokio::test]
    async fn insert_assigns_id_and_date() {
        let repo = MemoryTransferRepo::new();
        let before = Utc::now();

        let transfer = repo
            .insert_transfer(new_transfer(10.0))
            .await
            .expect("failed to insert");

        assert!(transfer.date >= before);
        assert_eq!(830.0, transfer.converted_amount);
        assert_eq!(vec![transfer], repo.list_transfers().await.unwrap());
    }

    #[tokio::test]
    async fn insert_rejects_invalid_transfer() {
        let repo = MemoryTransferRepo::new();
        let mut transfer = new_transfer(10.0);
        transfer.amount = -10.0;

        let error = repo
            .insert_transfer(transfer)
            .await
            .expect_err("negative amount should be rejected");

        assert!(matches!(error, TransferStoreError::Validation(_)));
        assert!(repo.list_transfers().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_orders_by_date_descending() {
        let repo = MemoryTransferRepo::new();
        let base = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();

        for offset in [2, 0, 3, 1] {
            let mut transfer = new_transfer(f64::from(offset + 1));
            transfer.date = Some(base + Duration::days(offset.into()));
            repo.insert_transfer(transfer).await.expect("failed to insert");
        }

        let transfers = repo.list_transfers().await.unwrap();

        assert_eq!(4, transfers.len());
        let amounts: Vec<f64> = transfers.iter().map(|t| t.amount).collect();
        assert_eq!(vec![4.0, 3.0, 2.0, 1.0], amounts);
    }

    #[tokio::test]
    async fn list_after_many_inserts() {
        let repo = MemoryTransferRepo::new();

        for amount in 1..=5 {
            repo.insert_transfer(new_transfer(f64::from(amount)))
                .await
                .expect("failed to insert");
        }

        let transfers = repo.list_transfers().await.unwrap();

        assert_eq!(5, transfers.len());
        assert!(transfers.windows(2).all(|pair| pair[0].date >= pair[1].date));
        assert_eq!(5.0, transfers[0].amount);
    }

    #[tokio::test]
    async fn delete_removes_only_that_transfer() {
        let repo = MemoryTransferRepo::new();
        let first = repo.insert_transfer(new_transfer(1.0)).await.unwrap();
        let second = repo.insert_transfer(new_transfer(2.0)).await.unwrap();

        let deleted = repo
            .delete_transfer(first.id)
            .await
            .expect("failed to delete");

        assert_eq!(first, deleted);
        assert_eq!(vec![second], repo.list_transfers().await.unwrap());

        let error = repo
            .delete_transfer(first.id)
            .await
            .expect_err("transfer was already deleted");
        assert!(matches!(error, TransferStoreError::NotFound(id) if id == first.id));
    }
}
