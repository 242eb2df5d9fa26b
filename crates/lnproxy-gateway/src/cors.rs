//! Cross-origin headers for the API and static routes.
//!
//! Any page may call the API from browser script, so responses always carry
//! `Access-Control-Allow-Origin: *`, including error responses and requests
//! that sent no `Origin` header.

use actix_cors::Cors;
use actix_web::http::header;
use actix_web::middleware::DefaultHeaders;

/// Request headers browsers may send to the API.
pub const API_ALLOW_HEADERS: &str = "Origin, X-Requested-With, Content-Type, Accept";

/// Preflight handling for the API scope.
pub fn build_api_cors() -> Cors {
    Cors::default()
        .allow_any_origin()
        .send_wildcard()
        .allowed_methods(vec!["GET", "OPTIONS"])
        .allowed_headers(vec!["Origin", "X-Requested-With", "Content-Type", "Accept"])
        .max_age(3600)
}

/// Headers set on every API response.
pub fn api_headers() -> DefaultHeaders {
    DefaultHeaders::new()
        .add((header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"))
        .add((header::ACCESS_CONTROL_ALLOW_HEADERS, API_ALLOW_HEADERS))
}

/// Headers set on static file responses (`/assets/`, `/.well-known/`).
pub fn static_headers() -> DefaultHeaders {
    DefaultHeaders::new().add((header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"))
}
