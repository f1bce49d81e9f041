use axum::http::{header, Method};
use tower_http::cors::{Any, CorsLayer};

/// CORS policy for browser clients. The API carries no credentials, so any
/// origin may call it.
pub fn layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::ACCEPT, header::CONTENT_TYPE, header::ORIGIN])
}
