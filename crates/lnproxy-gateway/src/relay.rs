//! Client for the invoice-wrapping backend.
//!
//! One GET per relay: `<base>/<lower-case invoice>?<forwarded query>`. A 200
//! response body is the wrapped invoice; anything else is an error carrying
//! the backend's body text.

use std::time::Instant;

use url::Url;

use crate::invoice::Invoice;
use crate::metrics::BACKEND_LATENCY;

/// Maximum backend response body size (64 KiB). Wrapped invoices are a few
/// hundred bytes; anything near this is not an invoice.
pub const MAX_BACKEND_BODY_SIZE: usize = 64 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// Backend answered with a non-200 status.
    #[error("lnproxy error: {body}")]
    Backend { status: u16, body: String },

    /// Connection, request or body read failure.
    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    #[error("invalid backend URL: {0}")]
    InvalidUrl(String),

    #[error("backend response too large (max {0} bytes)")]
    TooLarge(usize),

    /// Caller's query string cannot be forwarded.
    #[error("invalid query string: {0}")]
    InvalidQuery(&'static str),
}

impl RelayError {
    /// Whether the failure was caused by the caller rather than the backend.
    pub fn is_client_error(&self) -> bool {
        matches!(self, RelayError::InvalidQuery(_))
    }
}

/// One relay call, built fresh for each inbound request.
#[derive(Debug, Clone)]
pub struct RelayRequest {
    pub invoice: Invoice,
    /// Caller's raw query string, forwarded as-is. Carries `routing_msat`
    /// when the caller set a routing fee budget.
    pub query: Option<String>,
}

impl RelayRequest {
    pub fn new(invoice: Invoice) -> Self {
        Self {
            invoice,
            query: None,
        }
    }

    pub fn with_query(mut self, query: Option<&str>) -> Self {
        self.query = query.filter(|q| !q.is_empty()).map(String::from);
        self
    }
}

/// Strip a fragment and reject control characters that could split the
/// outbound request line.
pub fn sanitize_query(query: &str) -> Result<&str, RelayError> {
    if query.contains('\r') || query.contains('\n') {
        return Err(RelayError::InvalidQuery("must not contain newlines"));
    }
    if query.contains('\0') {
        return Err(RelayError::InvalidQuery("must not contain null bytes"));
    }
    Ok(match query.find('#') {
        Some(idx) => &query[..idx],
        None => query,
    })
}

/// Build the backend URL for a relay request.
///
/// The invoice is pushed as a single path segment, so characters like `/` or
/// `?` in the free-form part of an invoice are percent-encoded rather than
/// changing the URL structure.
pub fn build_backend_url(base: &Url, request: &RelayRequest) -> Result<Url, RelayError> {
    let mut url = base.clone();
    url.set_query(None);
    url.set_fragment(None);
    url.path_segments_mut()
        .map_err(|_| RelayError::InvalidUrl(format!("{base} cannot be a base URL")))?
        .pop_if_empty()
        .push(&request.invoice.to_backend_form());

    if let Some(query) = request.query.as_deref() {
        let query = sanitize_query(query)?;
        if !query.is_empty() {
            url.set_query(Some(query));
        }
    }
    Ok(url)
}

/// Shared handle on the wrapping backend. Cheap to clone.
#[derive(Debug, Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: Url,
}

impl BackendClient {
    pub fn new(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Ask the backend to wrap an invoice. Exactly one attempt, no retries.
    pub async fn wrap(&self, request: &RelayRequest) -> Result<String, RelayError> {
        let url = build_backend_url(&self.base_url, request)?;
        let started = Instant::now();
        let result = self.fetch(url).await;
        BACKEND_LATENCY.observe(started.elapsed().as_secs_f64());
        tracing::debug!(
            invoice_len = request.invoice.as_str().len(),
            ok = result.is_ok(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "relayed invoice"
        );
        result
    }

    async fn fetch(&self, url: Url) -> Result<String, RelayError> {
        let mut response = self.http.get(url).send().await?;
        let status = response.status();

        if let Some(cl) = response.content_length() {
            if cl > MAX_BACKEND_BODY_SIZE as u64 {
                return Err(RelayError::TooLarge(MAX_BACKEND_BODY_SIZE));
            }
        }

        // Enforce the cap while streaming; chunked bodies carry no length.
        let mut body_buf = Vec::with_capacity(
            response
                .content_length()
                .map(|cl| cl as usize)
                .unwrap_or(1024)
                .min(MAX_BACKEND_BODY_SIZE),
        );
        while let Some(chunk) = response.chunk().await? {
            if body_buf.len() + chunk.len() > MAX_BACKEND_BODY_SIZE {
                return Err(RelayError::TooLarge(MAX_BACKEND_BODY_SIZE));
            }
            body_buf.extend_from_slice(&chunk);
        }
        let body = String::from_utf8_lossy(&body_buf).into_owned();

        if status != reqwest::StatusCode::OK {
            tracing::warn!(status = status.as_u16(), "backend refused to wrap invoice");
            return Err(RelayError::Backend {
                status: status.as_u16(),
                body: body.trim().to_string(),
            });
        }
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoice::parse_invoice;

    fn request(invoice: &str) -> RelayRequest {
        RelayRequest::new(parse_invoice(invoice).unwrap())
    }

    #[test]
    fn test_url_joins_base_and_lowercases() {
        let base = Url::parse("http://127.0.0.1:4747/").unwrap();
        let url = build_backend_url(&base, &request("LNBC1QPZRY")).unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:4747/lnbc1qpzry");
    }

    #[test]
    fn test_url_keeps_base_path() {
        let base = Url::parse("https://lnproxy.example/relay/").unwrap();
        let url = build_backend_url(&base, &request("lnbc1qq")).unwrap();
        assert_eq!(url.as_str(), "https://lnproxy.example/relay/lnbc1qq");

        let base = Url::parse("https://lnproxy.example/relay").unwrap();
        let url = build_backend_url(&base, &request("lnbc1qq")).unwrap();
        assert_eq!(url.as_str(), "https://lnproxy.example/relay/lnbc1qq");
    }

    #[test]
    fn test_url_escapes_invoice_segment() {
        let base = Url::parse("http://backend/").unwrap();
        let url = build_backend_url(&base, &request("lnbc/../admin?x1qq")).unwrap();
        assert_eq!(url.path(), "/lnbc%2F..%2Fadmin%3Fx1qq");
        assert_eq!(url.query(), None);
    }

    #[test]
    fn test_query_forwarded_verbatim() {
        let base = Url::parse("http://backend/").unwrap();
        let req = request("lnbc1qq").with_query(Some("routing_msat=1000&description=hi%20there"));
        let url = build_backend_url(&base, &req).unwrap();
        assert_eq!(url.query(), Some("routing_msat=1000&description=hi%20there"));
    }

    #[test]
    fn test_fragment_only_query_dropped() {
        let base = Url::parse("http://backend/").unwrap();
        let req = request("lnbc1qq").with_query(Some("#frag"));
        let url = build_backend_url(&base, &req).unwrap();
        assert_eq!(url.as_str(), "http://backend/lnbc1qq");
    }

    #[test]
    fn test_base_query_is_replaced() {
        let base = Url::parse("http://backend/?stale=1#frag").unwrap();
        let url = build_backend_url(&base, &request("lnbc1qq")).unwrap();
        assert_eq!(url.as_str(), "http://backend/lnbc1qq");
    }

    #[test]
    fn test_sanitize_query() {
        assert_eq!(sanitize_query("a=1#frag").unwrap(), "a=1");
        assert!(sanitize_query("a=1\r\nHost: evil").is_err());
        assert!(sanitize_query("a=\0").is_err());
        assert!(sanitize_query("a=1\r\n").unwrap_err().is_client_error());
    }

    #[test]
    fn test_backend_error_message_embeds_body() {
        let err = RelayError::Backend {
            status: 500,
            body: "no route".to_string(),
        };
        assert_eq!(err.to_string(), "lnproxy error: no route");
        assert!(!err.is_client_error());
    }

    #[test]
    fn test_cannot_be_base_url_rejected() {
        let base = Url::parse("mailto:ops@example.com").unwrap();
        let err = build_backend_url(&base, &request("lnbc1qq")).unwrap_err();
        assert!(matches!(err, RelayError::InvalidUrl(_)));
    }
}
