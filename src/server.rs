use std::{net::SocketAddr, sync::Arc, time::Duration};

use axum::{extract::FromRef, Router};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::{
    cors,
    database::{DatabaseOptions, PostgresConnection},
    rates::{DynRateProvider, ExchangeRateApiClient, ExchangeRateApiOptions},
    repos::{DynTransferRepo, MemoryTransferRepo},
    transfers::services::TransferService,
};

pub struct Options {
    pub listen_address: SocketAddr,

    /// Database to store transfers in. Transfers are kept in memory if this
    /// is not provided.
    pub database: Option<DatabaseOptions>,

    pub exchange_rate_api_key: String,
    pub exchange_rate_api_url: String,
    pub exchange_rate_timeout_seconds: u64,
}

#[derive(Clone)]
pub struct AppState {
    transfer_service: TransferService,
}

impl AppState {
    pub fn new(transfer_service: TransferService) -> Self {
        Self { transfer_service }
    }
}

impl FromRef<AppState> for TransferService {
    fn from_ref(state: &AppState) -> Self {
        state.transfer_service.clone()
    }
}

/// Build the application's router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .nest("/api", crate::transfers::http::routes())
        .layer(cors::layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve(opts: Options) -> anyhow::Result<()> {
    let transfer_repo: DynTransferRepo = match &opts.database {
        Some(database_opts) => Arc::new(PostgresConnection::connect(database_opts).await?),
        None => {
            info!("No database configured. Transfers will be kept in memory.");

            Arc::new(MemoryTransferRepo::new())
        }
    };

    let rate_provider: DynRateProvider =
        Arc::new(ExchangeRateApiClient::new(ExchangeRateApiOptions {
            base_url: opts.exchange_rate_api_url,
            api_key: opts.exchange_rate_api_key,
            timeout: Duration::from_secs(opts.exchange_rate_timeout_seconds),
        })?);

    let state = AppState::new(TransferService::new(rate_provider, transfer_repo));

    info!(address = %opts.listen_address, "Starting server.");

    axum::Server::bind(&opts.listen_address)
        .serve(app(state).into_make_service())
        .await?;

    Ok(())
}
