//! API error type and its JSON rendering.
//!
//! Status codes are limited to 400, 401, 404 and 500. Client errors carry a
//! localized message and the English detail; server errors carry a generic
//! message only and log the cause.

use super::locale::Locale;
use crate::jobs::JobError;
use crate::order_actor::OrderError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::{error, warn};

/// Stable machine-readable error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    NotFound,
    RouteNotFound,
    Unauthorized,
    Forbidden,
    InvalidTransition,
    AlreadyRequested,
    AlreadyDecided,
    NotEligible,
    Validation,
    InsufficientStock,
    Gateway,
    Timeout,
    Internal,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::NotFound | ErrorCode::RouteNotFound => "NOT_FOUND",
            ErrorCode::Unauthorized => "UNAUTHORIZED",
            ErrorCode::Forbidden => "FORBIDDEN",
            ErrorCode::InvalidTransition => "INVALID_TRANSITION",
            ErrorCode::AlreadyRequested => "ALREADY_REQUESTED",
            ErrorCode::AlreadyDecided => "ALREADY_DECIDED",
            ErrorCode::NotEligible => "NOT_ELIGIBLE",
            ErrorCode::Validation => "VALIDATION_ERROR",
            ErrorCode::InsufficientStock => "INSUFFICIENT_STOCK",
            ErrorCode::Gateway => "GATEWAY_ERROR",
            ErrorCode::Timeout => "TIMEOUT",
            ErrorCode::Internal => "INTERNAL_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ErrorCode::NotFound | ErrorCode::RouteNotFound => StatusCode::NOT_FOUND,
            ErrorCode::Unauthorized | ErrorCode::Forbidden => StatusCode::UNAUTHORIZED,
            ErrorCode::InvalidTransition
            | ErrorCode::AlreadyRequested
            | ErrorCode::AlreadyDecided
            | ErrorCode::NotEligible
            | ErrorCode::Validation
            | ErrorCode::InsufficientStock => StatusCode::BAD_REQUEST,
            ErrorCode::Gateway | ErrorCode::Timeout | ErrorCode::Internal => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn message(&self, locale: Locale) -> &'static str {
        match (self, locale) {
            (ErrorCode::NotFound, Locale::En) => "Order not found",
            (ErrorCode::NotFound, Locale::Es) => "Pedido no encontrado",
            (ErrorCode::RouteNotFound, Locale::En) => "Route not found",
            (ErrorCode::RouteNotFound, Locale::Es) => "Ruta no encontrada",
            (ErrorCode::Unauthorized, Locale::En) => "Authentication required",
            (ErrorCode::Unauthorized, Locale::Es) => "Se requiere autenticación",
            (ErrorCode::Forbidden, Locale::En) => "You are not allowed to perform this action",
            (ErrorCode::Forbidden, Locale::Es) => "No tienes permiso para realizar esta acción",
            (ErrorCode::InvalidTransition, Locale::En) => {
                "The order cannot move to that status"
            }
            (ErrorCode::InvalidTransition, Locale::Es) => {
                "El pedido no puede pasar a ese estado"
            }
            (ErrorCode::AlreadyRequested, Locale::En) => {
                "A refund has already been requested for this order"
            }
            (ErrorCode::AlreadyRequested, Locale::Es) => {
                "Ya se solicitó un reembolso para este pedido"
            }
            (ErrorCode::AlreadyDecided, Locale::En) => {
                "This refund request has already been decided"
            }
            (ErrorCode::AlreadyDecided, Locale::Es) => {
                "Esta solicitud de reembolso ya fue resuelta"
            }
            (ErrorCode::NotEligible, Locale::En) => "This order is not eligible for this action",
            (ErrorCode::NotEligible, Locale::Es) => "Este pedido no es elegible para esta acción",
            (ErrorCode::Validation, Locale::En) => "The request is invalid",
            (ErrorCode::Validation, Locale::Es) => "La solicitud no es válida",
            (ErrorCode::InsufficientStock, Locale::En) => "Not enough stock",
            (ErrorCode::InsufficientStock, Locale::Es) => "No hay suficiente inventario",
            (ErrorCode::Gateway, Locale::En) => {
                "The payment provider could not process the refund. Please try again"
            }
            (ErrorCode::Gateway, Locale::Es) => {
                "El proveedor de pagos no pudo procesar el reembolso. Inténtalo de nuevo"
            }
            (ErrorCode::Timeout, Locale::En) => "The request took too long",
            (ErrorCode::Timeout, Locale::Es) => "La solicitud tardó demasiado",
            (ErrorCode::Internal, Locale::En) => "Something went wrong",
            (ErrorCode::Internal, Locale::Es) => "Algo salió mal",
        }
    }
}

/// An API failure: its code plus the underlying detail.
///
/// For client errors the detail is shown; for server errors it is only
/// logged.
#[derive(Debug, Clone)]
pub struct ApiError {
    code: ErrorCode,
    detail: Option<String>,
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    success: bool,
    error: &'a str,
    code: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<&'a str>,
}

impl ApiError {
    pub fn new(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self {
            code,
            detail: Some(detail.into()),
        }
    }

    pub fn bare(code: ErrorCode) -> Self {
        Self { code, detail: None }
    }

    pub fn validation(detail: impl Into<String>) -> Self {
        Self::new(ErrorCode::Validation, detail)
    }

    pub fn unauthorized() -> Self {
        Self::bare(ErrorCode::Unauthorized)
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self::new(ErrorCode::Internal, detail)
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn status(&self) -> StatusCode {
        self.code.status()
    }

    /// Renders the envelope in `locale`.
    pub fn render(&self, locale: Locale) -> Response {
        let status = self.status();
        let detail = if status.is_server_error() {
            None
        } else {
            self.detail.as_deref()
        };
        let body = ErrorBody {
            success: false,
            error: self.code.message(locale),
            code: self.code.as_str(),
            detail,
        };
        let mut response = (status, Json(body)).into_response();
        response.extensions_mut().insert(self.clone());
        response
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let detail = self.detail.as_deref().unwrap_or("");
        if self.status().is_server_error() {
            error!(code = self.code.as_str(), %detail, "Request failed");
        } else {
            warn!(code = self.code.as_str(), %detail, "Request rejected");
        }
        self.render(Locale::En)
    }
}

impl From<OrderError> for ApiError {
    fn from(e: OrderError) -> Self {
        let code = match &e {
            OrderError::NotFound(_) => ErrorCode::NotFound,
            OrderError::Unauthorized => ErrorCode::Unauthorized,
            OrderError::Forbidden(_) => ErrorCode::Forbidden,
            OrderError::InvalidTransition { .. } => ErrorCode::InvalidTransition,
            OrderError::AlreadyRequested(_) => ErrorCode::AlreadyRequested,
            OrderError::AlreadyDecided(_) => ErrorCode::AlreadyDecided,
            OrderError::NotEligible(_) => ErrorCode::NotEligible,
            OrderError::GatewayError(_) => ErrorCode::Gateway,
            OrderError::ValidationError(_) => ErrorCode::Validation,
            OrderError::InsufficientStock { .. } => ErrorCode::InsufficientStock,
            OrderError::ActorCommunicationError(_) => ErrorCode::Internal,
        };
        Self::new(code, e.to_string())
    }
}

impl From<JobError> for ApiError {
    fn from(e: JobError) -> Self {
        Self::internal(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::OrderStatus;

    #[test]
    fn status_codes_stay_within_the_contract() {
        let allowed = [400, 401, 404, 500];
        let errors = [
            OrderError::NotFound("x".into()),
            OrderError::Unauthorized,
            OrderError::Forbidden("x".into()),
            OrderError::InvalidTransition {
                from: OrderStatus::Delivered,
                to: OrderStatus::Cancelled,
            },
            OrderError::AlreadyRequested("x".into()),
            OrderError::AlreadyDecided("x".into()),
            OrderError::NotEligible("x".into()),
            OrderError::GatewayError("x".into()),
            OrderError::ValidationError("x".into()),
            OrderError::ActorCommunicationError("x".into()),
        ];
        for e in errors {
            let status = ApiError::from(e).status().as_u16();
            assert!(allowed.contains(&status), "{status}");
        }
        assert_eq!(
            ApiError::from(OrderError::Forbidden("x".into())).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::from(OrderError::GatewayError("x".into())).code().as_str(),
            "GATEWAY_ERROR"
        );
    }

    #[test]
    fn every_code_has_both_languages() {
        let codes = [
            ErrorCode::NotFound,
            ErrorCode::RouteNotFound,
            ErrorCode::Unauthorized,
            ErrorCode::Forbidden,
            ErrorCode::InvalidTransition,
            ErrorCode::AlreadyRequested,
            ErrorCode::AlreadyDecided,
            ErrorCode::NotEligible,
            ErrorCode::Validation,
            ErrorCode::InsufficientStock,
            ErrorCode::Gateway,
            ErrorCode::Timeout,
            ErrorCode::Internal,
        ];
        for code in codes {
            assert_ne!(code.message(Locale::En), code.message(Locale::Es));
        }
    }
}
