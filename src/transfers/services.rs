use thiserror::Error;
use tracing::{debug, info};

use crate::{
    rates::{DynRateProvider, RateGatewayError, Rates},
    repos::{DynTransferRepo, TransferStoreError},
};

use super::domain::transfers::{
    NewTransferData, Transfer, TransferId, TransferInvalidity, TransferRequest,
};

#[derive(Debug, Error)]
pub enum CreateTransferError {
    /// The provided transfer data is invalid.
    #[error("invalid transfer data: {0}")]
    Invalid(#[from] TransferInvalidity),

    #[error(transparent)]
    Rates(#[from] RateGatewayError),

    #[error(transparent)]
    Store(#[from] TransferStoreError),
}

/// A service object providing the operations on transfers.
#[derive(Clone)]
pub struct TransferService {
    rate_provider: DynRateProvider,
    transfer_repo: DynTransferRepo,
}

impl TransferService {
    /// Create a new transfer service.
    ///
    /// # Arguments
    ///
    /// * `rate_provider` - The source of exchange rates used to price
    ///   transfers.
    /// * `transfer_repo` - The repository used to persist and query transfers.
    pub fn new(rate_provider: DynRateProvider, transfer_repo: DynTransferRepo) -> Self {
        Self {
            rate_provider,
            transfer_repo,
        }
    }

    pub async fn current_rates(&self) -> Result<Rates, RateGatewayError> {
        self.rate_provider.fetch_all_rates().await
    }

    pub async fn list_transfers(&self) -> anyhow::Result<Vec<Transfer>> {
        self.transfer_repo.list_transfers().await
    }

    /// Create a new transfer.
    ///
    /// The data is validated, then priced using the provider's current rate
    /// for the currency pair, and finally persisted. Nothing is persisted if
    /// any step fails, and a rate fetched for a transfer that then fails to
    /// persist is discarded.
    pub async fn create_transfer(
        &self,
        data: NewTransferData,
    ) -> Result<Transfer, CreateTransferError> {
        let request = TransferRequest::from_data(data)?;

        let exchange_rate = self
            .rate_provider
            .fetch_pair_rate(request.from_currency(), request.to_currency())
            .await?;
        debug!(
            from = %request.from_currency(),
            to = %request.to_currency(),
            exchange_rate,
            "Fetched exchange rate for transfer."
        );

        let transfer = self
            .transfer_repo
            .insert_transfer(request.priced_at(exchange_rate))
            .await?;

        info!(
            id = %transfer.id,
            amount = transfer.amount,
            converted_amount = transfer.converted_amount,
            "Created transfer."
        );

        Ok(transfer)
    }

    /// Revoke a transfer by deleting it.
    pub async fn revoke_transfer(&self, id: TransferId) -> Result<Transfer, TransferStoreError> {
        self.transfer_repo.delete_transfer(id).await
    }
}

#[cfg(test)]
pub(crate) mod test {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    };

    use async_trait::async_trait;
    use serde_json::json;

    use crate::{
        rates::RateProvider, repos::MemoryTransferRepo,
        transfers::domain::currency::Currency,
    };

    use super::*;

    /// A rate provider that answers every request from a canned result.
    pub struct StubRateProvider {
        next_error: Mutex<Option<RateGatewayError>>,
        rate: f64,
        pub pair_requests: AtomicUsize,
    }

    impl StubRateProvider {
        pub fn with_rate(rate: f64) -> Self {
            Self {
                next_error: Mutex::new(None),
                rate,
                pair_requests: AtomicUsize::new(0),
            }
        }

        /// A provider whose next request fails with `error`.
        pub fn failing(error: RateGatewayError) -> Self {
            Self {
                next_error: Mutex::new(Some(error)),
                rate: 0.0,
                pair_requests: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl RateProvider for StubRateProvider {
        async fn fetch_all_rates(&self) -> Result<Rates, RateGatewayError> {
            if let Some(error) = self.next_error.lock().unwrap().take() {
                return Err(error);
            }

            Ok(Rates::from([
                (Currency::Usd, 1.0),
                (Currency::Lkr, 300.0),
                (Currency::Aud, 1.5),
                (Currency::Inr, 83.0),
            ]))
        }

        async fn fetch_pair_rate(
            &self,
            _from: Currency,
            _to: Currency,
        ) -> Result<f64, RateGatewayError> {
            self.pair_requests.fetch_add(1, Ordering::SeqCst);

            match self.next_error.lock().unwrap().take() {
                Some(error) => Err(error),
                None => Ok(self.rate),
            }
        }
    }

    fn service(provider: StubRateProvider) -> (TransferService, Arc<StubRateProvider>) {
        let provider = Arc::new(provider);
        let service = TransferService::new(provider.clone(), Arc::new(MemoryTransferRepo::new()));

        (service, provider)
    }

    fn data(from: &str, to: &str, amount: serde_json::Value) -> NewTransferData {
        NewTransferData {
            from_country: Some(from.to_owned()),
            to_country: Some(to.to_owned()),
            amount: Some(amount),
        }
    }

    #[tokio::test]
    async fn create_transfer_uses_pair_rate() {
        let (service, _) = service(StubRateProvider::with_rate(300.0));

        let transfer = service
            .create_transfer(data("USA", "Sri Lanka", json!(100)))
            .await
            .expect("failed to create transfer");

        assert_eq!(Currency::Usd, transfer.from_currency);
        assert_eq!(Currency::Lkr, transfer.to_currency);
        assert_eq!(300.0, transfer.exchange_rate);
        assert_eq!(30000.0, transfer.converted_amount);
        assert_eq!(vec![transfer], service.list_transfers().await.unwrap());
    }

    #[tokio::test]
    async fn create_transfer_converted_amount_matches_rate() {
        let (service, _) = service(StubRateProvider::with_rate(0.0121));

        for amount in [0.01, 1.0, 2.5, 1234.56, 1e9] {
            let transfer = service
                .create_transfer(data("India", "USA", json!(amount)))
                .await
                .expect("failed to create transfer");

            assert!((transfer.converted_amount - amount * 0.0121).abs() < 1e-9 * amount.max(1.0));
        }
    }

    #[tokio::test]
    async fn invalid_transfer_does_not_fetch_rate() {
        let (service, provider) = service(StubRateProvider::with_rate(1.0));

        let error = service
            .create_transfer(data("USA", "France", json!(10)))
            .await
            .expect_err("France is not supported");

        assert!(matches!(
            error,
            CreateTransferError::Invalid(TransferInvalidity::UnsupportedCountry)
        ));
        assert_eq!(0, provider.pair_requests.load(Ordering::SeqCst));
        assert!(service.list_transfers().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn rate_failure_persists_nothing() {
        let (service, _) = service(StubRateProvider::failing(RateGatewayError::Unreachable(
            "no response received".to_owned(),
        )));

        let error = service
            .create_transfer(data("USA", "India", json!(10)))
            .await
            .expect_err("rate provider is down");

        assert!(matches!(error, CreateTransferError::Rates(_)));
        assert!(service.list_transfers().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn negative_rate_is_rejected_by_store() {
        let (service, _) = service(StubRateProvider::with_rate(-2.0));

        let error = service
            .create_transfer(data("USA", "India", json!(10)))
            .await
            .expect_err("negative converted amount");

        assert!(matches!(
            error,
            CreateTransferError::Store(TransferStoreError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn revoke_transfer_twice() {
        let (service, _) = service(StubRateProvider::with_rate(1.5));
        let transfer = service
            .create_transfer(data("USA", "Australia", json!(4)))
            .await
            .unwrap();

        service
            .revoke_transfer(transfer.id)
            .await
            .expect("failed to revoke");
        let error = service
            .revoke_transfer(transfer.id)
            .await
            .expect_err("already revoked");

        assert!(matches!(error, TransferStoreError::NotFound(_)));
    }
}
