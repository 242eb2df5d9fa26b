use crate::config::GatewayConfig;
use crate::relay::BackendClient;
use crate::render::{Formatter, PngQrEncoder, QrEncoder, RenderError, TeraViews, ViewRenderer};
use std::sync::Arc;

/// Shared application state, built once at startup and read-only afterwards.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GatewayConfig>,
    pub backend: BackendClient,
    pub formatter: Formatter,
}

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("failed to create HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("failed to load views: {0}")]
    Views(#[from] RenderError),
}

impl AppState {
    /// Build state with the default QR encoder and the configured views.
    pub fn new(config: GatewayConfig) -> Result<Self, StateError> {
        let views: Arc<dyn ViewRenderer> = match config.template_dir {
            Some(ref dir) => Arc::new(TeraViews::from_dir(dir)?),
            None => Arc::new(TeraViews::builtin()?),
        };
        Self::with_ports(config, Arc::new(PngQrEncoder::default()), views)
    }

    /// Build state around caller-supplied rendering ports.
    pub fn with_ports(
        config: GatewayConfig,
        qr: Arc<dyn QrEncoder>,
        views: Arc<dyn ViewRenderer>,
    ) -> Result<Self, StateError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.backend_timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder.build()?;

        Ok(Self {
            backend: BackendClient::new(http_client, config.backend_url.clone()),
            formatter: Formatter::new(qr, views),
            config: Arc::new(config),
        })
    }
}
