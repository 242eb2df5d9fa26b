use actix_web::http::{header, StatusCode};
use actix_web::{HttpResponse, ResponseError};

use crate::relay::RelayError;
use crate::render::RenderError;

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// No route, or the invoice failed the grammar
    #[error("404 page not found")]
    NotFound,

    /// Unsupported `format` on the API route
    #[error("Invalid format")]
    InvalidFormat,

    /// Backend call failed, or the caller's query could not be forwarded
    #[error(transparent)]
    Relay(#[from] RelayError),

    /// QR or template failure
    #[error(transparent)]
    Render(#[from] RenderError),
}

impl GatewayError {
    /// Metric label for this failure.
    pub fn outcome(&self) -> &'static str {
        match self {
            GatewayError::NotFound => "not_found",
            GatewayError::InvalidFormat => "client_error",
            GatewayError::Relay(e) if e.is_client_error() => "client_error",
            GatewayError::Relay(_) => "backend_error",
            GatewayError::Render(_) => "render_error",
        }
    }

    /// Text shown to the caller. Backend error bodies are passed through;
    /// render failures are logged and replaced by a generic message.
    fn public_message(&self) -> String {
        match self {
            GatewayError::Render(e) => {
                tracing::error!(error = %e, "rendering failed");
                "failed to render response".to_string()
            }
            GatewayError::Relay(e) if !e.is_client_error() => {
                tracing::warn!(error = %e, "relay failed");
                e.to_string()
            }
            other => other.to_string(),
        }
    }
}

impl ResponseError for GatewayError {
    fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::NotFound => StatusCode::NOT_FOUND,
            GatewayError::InvalidFormat => StatusCode::BAD_REQUEST,
            GatewayError::Relay(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            GatewayError::Relay(_) | GatewayError::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Plain text, as served on the browser-facing routes.
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .content_type("text/plain; charset=utf-8")
            .insert_header((header::X_CONTENT_TYPE_OPTIONS, "nosniff"))
            .body(format!("{}\n", self.public_message()))
    }
}

/// [`GatewayError`] rendered as the API's JSON error object.
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct ApiError(#[from] pub GatewayError);

impl From<RelayError> for ApiError {
    fn from(e: RelayError) -> Self {
        ApiError(GatewayError::Relay(e))
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        self.0.status_code()
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "status": "ERROR",
            "reason": self.0.public_message(),
        }))
    }
}
