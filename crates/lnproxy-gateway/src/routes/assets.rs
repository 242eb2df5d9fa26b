//! Static passthrough for `/assets/` and `/.well-known/` (e.g. nostr.json).

use actix_files::Files;
use actix_web::web;

use crate::config::GatewayConfig;
use crate::cors::static_headers;

pub fn configure(config: &GatewayConfig) -> impl FnOnce(&mut web::ServiceConfig) {
    let assets_dir = config.assets_dir.clone();
    let well_known_dir = config.well_known_dir.clone();
    move |cfg| {
        cfg.service(
            web::scope("/assets")
                .wrap(static_headers())
                .service(Files::new("", assets_dir)),
        )
        .service(
            web::scope("/.well-known")
                .wrap(static_headers())
                .service(Files::new("", well_known_dir)),
        );
    }
}
