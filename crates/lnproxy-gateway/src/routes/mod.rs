pub mod api;
pub mod assets;
pub mod health;
pub mod pages;
pub mod wrap;

use actix_web::{web, HttpRequest, HttpResponse, ResponseError};
use url::form_urlencoded;

use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::invoice::{match_relay_path, RelayRoute};
use crate::relay::RelayRequest;

/// Mount every gateway route.
pub fn configure(config: &GatewayConfig) -> impl FnOnce(&mut web::ServiceConfig) {
    let static_files = assets::configure(config);
    move |cfg| {
        cfg.configure(health::configure)
            .configure(pages::configure)
            .configure(wrap::configure)
            .configure(api::configure)
            .configure(static_files);
    }
}

/// Fallback for anything no route claims.
pub async fn not_found() -> HttpResponse {
    GatewayError::NotFound.error_response()
}

/// First value of a query parameter.
pub(crate) fn query_param(req: &HttpRequest, key: &str) -> Option<String> {
    form_urlencoded::parse(req.query_string().as_bytes())
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}

/// Validate the request path for `route` and build the relay call.
///
/// The path is percent-decoded before matching. Any mismatch, including a
/// path that decodes to invalid UTF-8, is `NotFound`.
pub(crate) fn relay_request_for(
    req: &HttpRequest,
    route: RelayRoute,
) -> Result<RelayRequest, GatewayError> {
    let path = urlencoding::decode(req.path()).map_err(|_| GatewayError::NotFound)?;
    let invoice = match match_relay_path(&path) {
        Some((matched, invoice)) if matched == route => invoice,
        _ => return Err(GatewayError::NotFound),
    };

    Ok(RelayRequest::new(invoice).with_query(Some(req.query_string())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_relay_request_decodes_path() {
        let req = TestRequest::get()
            .uri("/wrap/lightning%3Alnbc1qpzry?routing_msat=10")
            .to_http_request();
        let relay = relay_request_for(&req, RelayRoute::Wrap).unwrap();
        assert_eq!(relay.invoice.as_str(), "lnbc1qpzry");
        assert_eq!(relay.query.as_deref(), Some("routing_msat=10"));
    }

    #[test]
    fn test_relay_request_route_mismatch() {
        let req = TestRequest::get().uri("/api/lnbc1qpzry").to_http_request();
        assert!(matches!(
            relay_request_for(&req, RelayRoute::Wrap),
            Err(GatewayError::NotFound)
        ));
    }

    #[test]
    fn test_relay_request_rejects_invalid_utf8() {
        let req = TestRequest::get().uri("/api/lnbc%FF1qq").to_http_request();
        assert!(matches!(
            relay_request_for(&req, RelayRoute::Api),
            Err(GatewayError::NotFound)
        ));
    }

    #[test]
    fn test_query_param_first_value() {
        let req = TestRequest::get()
            .uri("/api/x?format=json&format=xml")
            .to_http_request();
        assert_eq!(query_param(&req, "format").as_deref(), Some("json"));
        assert_eq!(query_param(&req, "missing"), None);
    }
}
