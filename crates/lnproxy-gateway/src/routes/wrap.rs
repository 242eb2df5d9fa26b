use actix_web::{web, HttpRequest, HttpResponse};

use super::relay_request_for;
use crate::error::GatewayError;
use crate::invoice::RelayRoute;
use crate::metrics::record_relay;
use crate::render::OutputFormat;
use crate::state::AppState;

/// GET /wrap/{invoice} - Relay and render the HTML page with QR code
pub async fn wrap_invoice(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, GatewayError> {
    let result = render_wrapped(&req, &state).await;
    record_relay(
        RelayRoute::Wrap.as_str(),
        result.as_ref().map_or_else(GatewayError::outcome, |_| "ok"),
    );
    result
}

async fn render_wrapped(
    req: &HttpRequest,
    state: &AppState,
) -> Result<HttpResponse, GatewayError> {
    let relay = relay_request_for(req, RelayRoute::Wrap)?;
    let wrapped = state.backend.wrap(&relay).await?;
    let format = OutputFormat::Html;
    let html = state.formatter.format_relay(&wrapped, format)?;

    Ok(HttpResponse::Ok()
        .content_type(format.content_type())
        .body(html))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/wrap/{invoice:.*}", web::get().to(wrap_invoice));
}
