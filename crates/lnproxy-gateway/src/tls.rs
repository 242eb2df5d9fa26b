//! HTTPS listener support: certificate loading and the hostname allow-list.
//!
//! Certificates are provisioned outside the gateway (e.g. by an ACME client)
//! into `TLS_CERT_DIR` as `cert.pem` (full chain) and `key.pem`.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use actix_web::guard::{Guard, GuardContext};
use actix_web::http::header;

#[derive(Debug, thiserror::Error)]
pub enum TlsError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("no certificates found in {0}")]
    NoCertificates(PathBuf),

    #[error("no private key found in {0}")]
    NoPrivateKey(PathBuf),

    #[error(transparent)]
    Rustls(#[from] rustls::Error),
}

fn open(path: &Path) -> Result<BufReader<File>, TlsError> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|source| TlsError::Io {
            path: path.to_path_buf(),
            source,
        })
}

/// Build a rustls server config from `<dir>/cert.pem` and `<dir>/key.pem`.
pub fn load_rustls_config(dir: &str) -> Result<rustls::ServerConfig, TlsError> {
    let cert_path = Path::new(dir).join("cert.pem");
    let key_path = Path::new(dir).join("key.pem");

    let certs = rustls_pemfile::certs(&mut open(&cert_path)?)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|source| TlsError::Io {
            path: cert_path.clone(),
            source,
        })?;
    if certs.is_empty() {
        return Err(TlsError::NoCertificates(cert_path));
    }

    let key = rustls_pemfile::private_key(&mut open(&key_path)?)
        .map_err(|source| TlsError::Io {
            path: key_path.clone(),
            source,
        })?
        .ok_or_else(|| TlsError::NoPrivateKey(key_path.clone()))?;

    // Pin the provider; several may be compiled in through actix-tls.
    let provider = Arc::new(rustls::crypto::aws_lc_rs::default_provider());
    Ok(rustls::ServerConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()?
        .with_no_client_auth()
        .with_single_cert(certs, key)?)
}

/// Route guard admitting only requests addressed to allowed hostnames.
/// An empty list admits everything.
#[derive(Debug, Clone, Default)]
pub struct HostAllowList {
    hosts: Vec<String>,
}

impl HostAllowList {
    pub fn new(hosts: Vec<String>) -> Self {
        Self {
            hosts: hosts.into_iter().map(|h| h.to_ascii_lowercase()).collect(),
        }
    }

    pub fn allows(&self, host: Option<&str>) -> bool {
        if self.hosts.is_empty() {
            return true;
        }
        match host.map(strip_port) {
            Some(name) => self.hosts.iter().any(|h| h.eq_ignore_ascii_case(name)),
            None => false,
        }
    }
}

impl Guard for HostAllowList {
    fn check(&self, ctx: &GuardContext<'_>) -> bool {
        let head = ctx.head();
        let host = head
            .headers()
            .get(header::HOST)
            .and_then(|v| v.to_str().ok())
            .or_else(|| head.uri.host());
        self.allows(host)
    }
}

/// `example.org:443` -> `example.org`, `[::1]:443` -> `[::1]`.
fn strip_port(host: &str) -> &str {
    if host.starts_with('[') {
        return match host.find(']') {
            Some(end) => &host[..=end],
            None => host,
        };
    }
    match host.rsplit_once(':') {
        Some((name, port)) if port.chars().all(|c| c.is_ascii_digit()) => name,
        _ => host,
    }
}
