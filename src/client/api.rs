use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, error};
use uuid::Uuid;

use crate::{http_err::ErrorRep, rates::Rates, transfers::http::reps};

#[derive(Debug, Error)]
pub enum ClientError {
    /// The request was refused before being sent.
    #[error("{0}")]
    Invalid(String),

    /// The request failed, either at the server or on the way there. The
    /// message is suitable for showing to a user.
    #[error("{0}")]
    Failed(String),
}

/// Client for the transfer API.
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    client: Client,
}

impl ApiClient {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("currency-transfers/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_owned(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    pub async fn get_rates(&self) -> Result<Rates, ClientError> {
        let collection: reps::RatesCollection = self
            .handle(
                self.client.get(self.url("/rates")).send().await,
                "Failed to fetch exchange rates",
            )
            .await?;

        Ok(collection.rates)
    }

    pub async fn get_transfers(&self) -> Result<Vec<reps::Transfer>, ClientError> {
        self.handle(
            self.client.get(self.url("/transfers")).send().await,
            "Failed to fetch transfers",
        )
        .await
    }

    pub async fn create_transfer(
        &self,
        transfer: &reps::NewTransfer,
    ) -> Result<reps::Transfer, ClientError> {
        if !(transfer.amount.is_finite() && transfer.amount > 0.0) {
            return Err(ClientError::Invalid(
                "Please enter a valid positive amount".to_owned(),
            ));
        }

        debug!(?transfer, "Sending transfer.");

        self.handle(
            self.client
                .post(self.url("/transfers"))
                .json(transfer)
                .send()
                .await,
            "Failed to create transfer",
        )
        .await
    }

    pub async fn delete_transfer(&self, id: Uuid) -> Result<(), ClientError> {
        let _: reps::Message = self
            .handle(
                self.client
                    .delete(self.url(&format!("/transfers/{}", id)))
                    .send()
                    .await,
                "Failed to delete transfer",
            )
            .await?;

        Ok(())
    }

    /// Decode a successful response, or turn a failed one into the message
    /// the server sent. `fallback` is used when there is no such message.
    async fn handle<T: DeserializeOwned>(
        &self,
        result: reqwest::Result<Response>,
        fallback: &str,
    ) -> Result<T, ClientError> {
        let response = result.map_err(|error| {
            error!(?error, "{}", fallback);

            ClientError::Failed(fallback.to_owned())
        })?;

        let status = response.status();
        if status.is_success() {
            return response.json::<T>().await.map_err(|error| {
                error!(?error, "Unexpected response body.");

                ClientError::Failed(fallback.to_owned())
            });
        }

        let rep = response.json::<ErrorRep>().await.ok();
        error!(%status, ?rep, "{}", fallback);

        Err(ClientError::Failed(error_message(status, rep, fallback)))
    }
}

fn error_message(status: StatusCode, rep: Option<ErrorRep>, fallback: &str) -> String {
    let rep = match rep {
        Some(rep) if !rep.message.is_empty() => rep,
        _ => return fallback.to_owned(),
    };

    match rep.supported_countries {
        Some(countries) if status == StatusCode::BAD_REQUEST => {
            format!("{}. Supported countries: {}", rep.message, countries.join(", "))
        }
        _ => rep.message,
    }
}
