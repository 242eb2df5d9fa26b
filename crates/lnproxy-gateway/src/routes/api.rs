use actix_web::{web, HttpRequest, HttpResponse};

use super::{query_param, relay_request_for};
use crate::cors::{api_headers, build_api_cors};
use crate::error::{ApiError, GatewayError};
use crate::invoice::RelayRoute;
use crate::metrics::record_relay;
use crate::render::OutputFormat;
use crate::state::AppState;

/// GET /api/{invoice} - Relay and answer with text, or JSON with `format=json`
pub async fn api_invoice(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let result = relay_api(&req, &state).await;
    record_relay(
        RelayRoute::Api.as_str(),
        result.as_ref().map_or_else(GatewayError::outcome, |_| "ok"),
    );
    result.map_err(ApiError)
}

async fn relay_api(req: &HttpRequest, state: &AppState) -> Result<HttpResponse, GatewayError> {
    let relay = relay_request_for(req, RelayRoute::Api)?;
    let format = OutputFormat::from_api_param(query_param(req, "format").as_deref())
        .ok_or(GatewayError::InvalidFormat)?;

    let wrapped = state.backend.wrap(&relay).await?;
    let body = state.formatter.format_relay(&wrapped, format)?;

    Ok(HttpResponse::Ok()
        .content_type(format.content_type())
        .body(body))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .wrap(api_headers())
            .wrap(build_api_cors())
            .route("/{invoice:.*}", web::get().to(api_invoice)),
    );
}
