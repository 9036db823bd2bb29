//! # HTTP Interface
//!
//! JSON endpoints over the order manager, the refund workflow and the jobs.
//!
//! Every response uses the envelope `{ "success": bool, ... }`. Failures add
//! `error` (localized from `Accept-Language`) and a stable `code`.
//!
//! ## Layers (outermost first)
//!
//! 1. CORS, when origins are configured
//! 2. `TraceLayer` request spans
//! 3. localization of error envelopes
//! 4. request timeout, answered with a 500 envelope

pub mod envelope;
pub mod error;
pub mod extract;
pub mod locale;
pub mod routes;

pub use error::{ApiError, ErrorCode};
pub use locale::Locale;

use crate::clients::UserClient;
use crate::config::CorsConfig;
use crate::jobs::JobRunner;
use crate::orders::OrderManager;
use crate::refunds::RefundWorkflow;
use axum::error_handling::HandleErrorLayer;
use axum::extract::Request;
use axum::http::{header, HeaderValue, Method};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{BoxError, Router};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

/// Everything the handlers need. Built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub users: UserClient,
    pub orders: OrderManager,
    pub refunds: RefundWorkflow,
    pub jobs: JobRunner,
    pub cron_secret: Option<Arc<str>>,
}

/// Re-renders error envelopes in the caller's language.
async fn localize(request: Request, next: Next) -> Response {
    let locale = Locale::from_headers(request.headers());
    let response = next.run(request).await;
    if locale == Locale::En {
        return response;
    }
    match response.extensions().get::<ApiError>().cloned() {
        Some(error) => error.render(locale),
        None => response,
    }
}

async fn handle_layer_error(err: BoxError) -> Response {
    if err.is::<tower::timeout::error::Elapsed>() {
        ApiError::bare(ErrorCode::Timeout).into_response()
    } else {
        ApiError::internal(err.to_string()).into_response()
    }
}

fn cors_allows_any_origin(cors: &CorsConfig) -> bool {
    cors.allowed_origins.len() == 1 && cors.allowed_origins[0] == "*"
}

/// `None` when no origins are configured.
fn build_cors_layer(cors: &CorsConfig) -> Option<CorsLayer> {
    if cors.allowed_origins.is_empty() {
        return None;
    }
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::ACCEPT,
            header::ACCEPT_LANGUAGE,
            extract::USER_ID_HEADER,
        ])
        .max_age(Duration::from_secs(cors.max_age_seconds));
    if cors_allows_any_origin(cors) {
        return Some(layer.allow_origin(Any));
    }
    let origins: Vec<HeaderValue> = cors
        .allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(%origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    Some(layer.allow_origin(AllowOrigin::list(origins)))
}

pub fn router(state: AppState, cors: &CorsConfig, request_timeout: Duration) -> Router {
    let app = Router::new()
        .route("/health", get(routes::health))
        .route("/api/orders", get(routes::orders::list_orders))
        .route("/api/orders/:number", get(routes::orders::get_order))
        .route(
            "/api/orders/:number/status",
            post(routes::orders::advance_status),
        )
        .route(
            "/api/orders/:number/payment",
            post(routes::orders::record_payment),
        )
        .route(
            "/api/orders/:number/cancel",
            post(routes::orders::cancel_order),
        )
        .route(
            "/api/orders/:number/refund",
            post(routes::orders::request_refund),
        )
        .route(
            "/api/orders/:number/refund/approve",
            post(routes::orders::approve_refund),
        )
        .route(
            "/api/orders/:number/refund/reject",
            post(routes::orders::reject_refund),
        )
        .route("/api/vendor/orders", get(routes::orders::list_vendor_orders))
        .route(
            "/api/guest/orders",
            get(routes::guest::lookup_by_query).post(routes::guest::lookup_by_body),
        )
        .route(
            "/api/guest/orders/refund",
            post(routes::guest::request_refund),
        )
        .route(
            "/api/guest/orders/cancel",
            post(routes::guest::cancel_order),
        )
        .route("/api/tracking/:number", get(routes::guest::tracking))
        .route(
            "/api/cron/inventory-check",
            get(routes::cron::inventory_check),
        )
        .route(
            "/api/cron/analytics-snapshot",
            get(routes::cron::analytics_snapshot),
        )
        .route("/api/cron/cart-recovery", get(routes::cron::cart_recovery))
        .fallback(routes::not_found)
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_layer_error))
                .timeout(request_timeout),
        )
        .layer(middleware::from_fn(localize))
        .layer(TraceLayer::new_for_http());

    match build_cors_layer(cors) {
        Some(layer) => app.layer(layer),
        None => app,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cors_is_off_without_origins() {
        assert!(build_cors_layer(&CorsConfig::default()).is_none());
        assert!(build_cors_layer(&CorsConfig {
            allowed_origins: vec!["*".into()],
            max_age_seconds: 60,
        })
        .is_some());
        assert!(cors_allows_any_origin(&CorsConfig {
            allowed_origins: vec!["*".into()],
            max_age_seconds: 60,
        }));
        assert!(!cors_allows_any_origin(&CorsConfig {
            allowed_origins: vec!["https://shop.example".into()],
            max_age_seconds: 60,
        }));
    }
}
