use actix_governor::{Governor, GovernorConfigBuilder};
use actix_web::{middleware::Logger, web, App, HttpServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lnproxy_gateway::{
    config::GatewayConfig, metrics::register_metrics, routes, state::AppState,
    tls::{load_rustls_config, HostAllowList},
};

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,actix_web=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = match GatewayConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {e}");
            std::process::exit(2);
        }
    };

    tracing::info!("Starting lnproxy-gateway on port {}", config.port);
    tracing::info!("Backend: {}", config.backend_url);
    match config.backend_timeout {
        Some(t) => tracing::info!("Backend timeout: {}s", t.as_secs()),
        None => tracing::info!("Backend timeout: none"),
    }

    // Load TLS material before binding anything
    let tls = match config.https_port {
        Some(port) => match load_rustls_config(&config.tls_cert_dir) {
            Ok(tls_config) => {
                tracing::info!("HTTPS enabled on port {port} (certs: {})", config.tls_cert_dir);
                Some((port, tls_config))
            }
            Err(e) => {
                tracing::error!("Failed to load TLS certificates: {e}");
                std::process::exit(2);
            }
        },
        None => None,
    };
    if !config.tls_hosts.is_empty() {
        tracing::info!("Serving hosts: {}", config.tls_hosts.join(", "));
    }

    // Register Prometheus metrics
    register_metrics();

    // Create shared state
    let state = match AppState::new(config.clone()) {
        Ok(state) => state,
        Err(e) => {
            tracing::error!("Failed to initialize gateway: {e}");
            std::process::exit(2);
        }
    };
    let state_data = web::Data::new(state);

    // Configure rate limiter
    let Some(governor_conf) = GovernorConfigBuilder::default()
        .requests_per_minute(config.rate_limit_rpm as u64)
        .finish()
    else {
        tracing::error!("Invalid rate limit: {}", config.rate_limit_rpm);
        std::process::exit(2);
    };

    let hosts = HostAllowList::new(config.tls_hosts.clone());
    let port = config.port;

    let mut server = HttpServer::new(move || {
        App::new()
            .app_data(state_data.clone())
            .wrap(Logger::default())
            .wrap(Governor::new(&governor_conf))
            .service(
                web::scope("")
                    .guard(hosts.clone())
                    .configure(routes::configure(&config)),
            )
            .default_service(web::to(routes::not_found))
    })
    .bind(("0.0.0.0", port))?;

    if let Some((https_port, tls_config)) = tls {
        server = server.bind_rustls_0_23(("0.0.0.0", https_port), tls_config)?;
    }

    server.run().await
}
