use axum::{
    routing::{delete, get},
    Router,
};

use crate::server::AppState;

mod handlers;
pub mod reps;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/rates", get(handlers::get_rates))
        .route(
            "/transfers",
            get(handlers::get_transfers).post(handlers::create_transfer),
        )
        .route("/transfers/:transfer_id", delete(handlers::delete_transfer))
}
