use std::env;
use std::time::Duration;
use url::Url;

const DEFAULT_LNPROXY_URL: &str = "http://127.0.0.1:4747/";
const DEFAULT_PORT: u16 = 4748;
const DEFAULT_TLS_CERT_DIR: &str = "./certs";
const DEFAULT_ASSETS_DIR: &str = "./assets";
const DEFAULT_WELL_KNOWN_DIR: &str = "./well-known";
const DEFAULT_RATE_LIMIT_RPM: u32 = 60;

/// Process-wide settings, read once at startup and never reloaded.
#[derive(Clone)]
pub struct GatewayConfig {
    /// Base URL of the invoice-wrapping backend
    pub backend_url: Url,
    /// HTTP listen port
    pub port: u16,
    /// HTTPS listen port (None = no TLS listener)
    pub https_port: Option<u16>,
    /// Directory holding `cert.pem` and `key.pem`
    pub tls_cert_dir: String,
    /// Hostnames served (empty = any)
    pub tls_hosts: Vec<String>,
    /// Directory of view templates (None = built-in views)
    pub template_dir: Option<String>,
    /// Directory served under /assets/
    pub assets_dir: String,
    /// Directory served under /.well-known/
    pub well_known_dir: String,
    /// Rate limit requests per minute, per client IP
    pub rate_limit_rpm: u32,
    /// Backend call timeout (None = reqwest default, no timeout)
    pub backend_timeout: Option<Duration>,
    /// Bearer token required for /metrics endpoint (None = public)
    pub metrics_token: Option<String>,
}

impl std::fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("backend_url", &self.backend_url.as_str())
            .field("port", &self.port)
            .field("https_port", &self.https_port)
            .field("tls_cert_dir", &self.tls_cert_dir)
            .field("tls_hosts", &self.tls_hosts)
            .field("template_dir", &self.template_dir)
            .field("assets_dir", &self.assets_dir)
            .field("well_known_dir", &self.well_known_dir)
            .field("rate_limit_rpm", &self.rate_limit_rpm)
            .field("backend_timeout", &self.backend_timeout)
            .field(
                "metrics_token",
                &self.metrics_token.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            backend_url: Url::parse(DEFAULT_LNPROXY_URL).expect("default backend URL is valid"),
            port: DEFAULT_PORT,
            https_port: None,
            tls_cert_dir: DEFAULT_TLS_CERT_DIR.to_string(),
            tls_hosts: Vec::new(),
            template_dir: None,
            assets_dir: DEFAULT_ASSETS_DIR.to_string(),
            well_known_dir: DEFAULT_WELL_KNOWN_DIR.to_string(),
            rate_limit_rpm: DEFAULT_RATE_LIMIT_RPM,
            backend_timeout: None,
            metrics_token: None,
        }
    }
}

impl GatewayConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from any key lookup; `from_env` passes the process
    /// environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|s| !s.trim().is_empty());

        // Optional: backend URL
        let backend_url_str = var("LNPROXY_URL").unwrap_or_else(|| DEFAULT_LNPROXY_URL.to_string());
        let backend_url = parse_backend_url(&backend_url_str)?;

        // Optional: HTTP port
        let port = var("PORT")
            .map(|s| {
                s.parse::<u16>()
                    .map_err(|_| ConfigError::InvalidValue("PORT", s))
            })
            .transpose()?
            .unwrap_or(DEFAULT_PORT);

        // Optional: HTTPS port, enables TLS
        let https_port = var("HTTPS_PORT")
            .map(|s| {
                s.parse::<u16>()
                    .map_err(|_| ConfigError::InvalidValue("HTTPS_PORT", s))
            })
            .transpose()?;

        let tls_cert_dir = var("TLS_CERT_DIR").unwrap_or_else(|| DEFAULT_TLS_CERT_DIR.to_string());

        // Optional: hostname allow-list
        let tls_hosts: Vec<String> = var("TLS_HOSTS")
            .map(|hosts| {
                hosts
                    .split(',')
                    .map(|s| s.trim().to_ascii_lowercase())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let template_dir = var("TEMPLATE_DIR");
        let assets_dir = var("ASSETS_DIR").unwrap_or_else(|| DEFAULT_ASSETS_DIR.to_string());
        let well_known_dir =
            var("WELL_KNOWN_DIR").unwrap_or_else(|| DEFAULT_WELL_KNOWN_DIR.to_string());

        // Optional: rate limit
        let rate_limit_rpm = var("RATE_LIMIT_RPM")
            .map(|s| {
                s.parse::<u32>()
                    .map_err(|_| ConfigError::InvalidValue("RATE_LIMIT_RPM", s))
            })
            .transpose()?
            .unwrap_or(DEFAULT_RATE_LIMIT_RPM);
        if rate_limit_rpm == 0 {
            return Err(ConfigError::InvalidValue(
                "RATE_LIMIT_RPM",
                "0".to_string(),
            ));
        }

        // Optional: backend timeout in seconds
        let backend_timeout = var("BACKEND_TIMEOUT_SECS")
            .map(|s| {
                s.parse::<u64>()
                    .ok()
                    .filter(|secs| *secs > 0)
                    .map(Duration::from_secs)
                    .ok_or(ConfigError::InvalidValue("BACKEND_TIMEOUT_SECS", s))
            })
            .transpose()?;

        // Optional: metrics token
        let metrics_token = var("METRICS_TOKEN");

        if metrics_token.is_none() {
            tracing::warn!("METRICS_TOKEN not set, /metrics endpoint is publicly accessible");
        }
        if https_port.is_none() && !tls_hosts.is_empty() {
            tracing::warn!("TLS_HOSTS is set but HTTPS_PORT is not; hosts are still enforced on HTTP");
        }

        Ok(Self {
            backend_url,
            port,
            https_port,
            tls_cert_dir,
            tls_hosts,
            template_dir,
            assets_dir,
            well_known_dir,
            rate_limit_rpm,
            backend_timeout,
            metrics_token,
        })
    }
}

/// Parse and check the backend base URL: http(s) and able to take path segments.
pub fn parse_backend_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim()).map_err(|_| ConfigError::InvalidUrl(raw.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
        return Err(ConfigError::InvalidUrl(raw.to_string()));
    }
    Ok(url)
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
