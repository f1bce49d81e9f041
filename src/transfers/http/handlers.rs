use anyhow::Context;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use tracing::{debug, error, warn};

use crate::{
    http_err::{ApiError, ApiResponse, ErrorRep},
    rates::RateGatewayError,
    repos::TransferStoreError,
    transfers::{
        domain::{
            currency::Country,
            transfers::{NewTransferData, TransferId, TransferInvalidity},
        },
        services::{CreateTransferError, TransferService},
    },
};

use super::reps;

pub(super) async fn get_rates(
    State(transfer_service): State<TransferService>,
) -> ApiResponse<Json<reps::RatesCollection>> {
    match transfer_service.current_rates().await {
        Ok(rates) => Ok(Json(reps::RatesCollection { rates })),
        Err(error) => {
            error!(?error, "Failed to fetch exchange rates.");

            Err(ApiError::InternalServerError(ErrorRep::with_error(
                "Failed to fetch exchange rates",
                error.to_string(),
            )))
        }
    }
}

pub(super) async fn get_transfers(
    State(transfer_service): State<TransferService>,
) -> ApiResponse<Json<Vec<reps::Transfer>>> {
    let transfers = transfer_service
        .list_transfers()
        .await
        .context("Failed to fetch transfers")?;

    Ok(Json(transfers.iter().map(reps::Transfer::from).collect()))
}

pub(super) async fn create_transfer(
    State(transfer_service): State<TransferService>,
    payload: Result<Json<NewTransferData>, JsonRejection>,
) -> ApiResponse<(StatusCode, Json<reps::Transfer>)> {
    let Json(data) = payload.map_err(|rejection| {
        debug!(%rejection, "Rejected transfer body.");

        ApiError::bad_request(rejection.body_text())
    })?;

    let transfer = transfer_service.create_transfer(data).await?;

    Ok((StatusCode::CREATED, Json(reps::Transfer::from(&transfer))))
}

pub(super) async fn delete_transfer(
    State(transfer_service): State<TransferService>,
    Path(transfer_id): Path<String>,
) -> ApiResponse<Json<reps::Message>> {
    // An ID that could never have been issued cannot match a transfer.
    let id = transfer_id
        .parse::<TransferId>()
        .map_err(|_| ApiError::not_found("Transfer not found"))?;

    match transfer_service.revoke_transfer(id).await {
        Ok(_) => Ok(Json(reps::Message {
            message: "Transfer revoked successfully".to_owned(),
        })),
        Err(TransferStoreError::NotFound(_)) => Err(ApiError::not_found("Transfer not found")),
        Err(error) => {
            error!(?error, %id, "Failed to revoke transfer.");

            Err(ApiError::InternalServerError(ErrorRep::with_error(
                "Failed to revoke transfer",
                error.to_string(),
            )))
        }
    }
}

impl From<CreateTransferError> for ApiError {
    fn from(error: CreateTransferError) -> Self {
        match error {
            CreateTransferError::Invalid(TransferInvalidity::MissingFields) => {
                Self::bad_request("Please provide fromCountry, toCountry, and amount")
            }
            CreateTransferError::Invalid(TransferInvalidity::NonPositiveAmount) => {
                Self::bad_request("Amount must be a positive number")
            }
            CreateTransferError::Invalid(TransferInvalidity::UnsupportedCountry) => {
                Self::BadRequest(ErrorRep {
                    message: "Invalid country selection".to_owned(),
                    supported_countries: Some(
                        Country::supported_names()
                            .into_iter()
                            .map(String::from)
                            .collect(),
                    ),
                    ..Default::default()
                })
            }
            CreateTransferError::Rates(RateGatewayError::Upstream { status, body }) => {
                warn!(status, ?body, "Exchange rate provider rejected the request.");

                let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
                Self::Upstream(
                    status,
                    ErrorRep::with_error("Exchange rate API error", body),
                )
            }
            CreateTransferError::Rates(RateGatewayError::Unreachable(reason)) => {
                warn!(%reason, "Exchange rate provider is not responding.");

                Self::ServiceUnavailable(ErrorRep::with_error(
                    "Exchange rate API not responding",
                    "Network error",
                ))
            }
            CreateTransferError::Store(TransferStoreError::Validation(errors)) => {
                Self::BadRequest(ErrorRep::with_error("Invalid transfer", errors.to_string()))
            }
            error => {
                error!(?error, "Failed to create transfer.");

                Self::InternalServerError(ErrorRep::with_error(
                    "Failed to create transfer",
                    error.to_string(),
                ))
            }
        }
    }
}
