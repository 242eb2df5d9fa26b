//! Response formatting: HTML page with QR code, plain text, or JSON.
//!
//! QR encoding and template rendering sit behind [`QrEncoder`] and
//! [`ViewRenderer`] so either can be swapped without touching the handlers.

use std::io::Cursor;
use std::sync::Arc;

use base64::Engine;
use image::{ImageFormat, Rgba};
use qrcode::{EcLevel, QrCode};
use serde::Serialize;
use tera::Tera;

/// Pixels per QR module.
const QR_MODULE_PX: u32 = 8;

const START_TEMPLATE: &str = include_str!("../templates/start.html");
const WRAP_TEMPLATE: &str = include_str!("../templates/wrap.html");

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("QR encoding failed: {0}")]
    Qr(String),

    #[error("image encoding failed: {0}")]
    Image(String),

    #[error("template error: {0}")]
    Template(#[from] tera::Error),
}

/// Output encodings for a wrapped invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Html,
    Text,
    Json,
}

impl OutputFormat {
    /// Resolve the `format` query value on the API route. Only an empty value
    /// and `json` are recognized.
    pub fn from_api_param(format: Option<&str>) -> Option<Self> {
        match format.unwrap_or("") {
            "" => Some(OutputFormat::Text),
            "json" => Some(OutputFormat::Json),
            _ => None,
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            OutputFormat::Html => "text/html; charset=utf-8",
            OutputFormat::Text => "text/plain; charset=utf-8",
            OutputFormat::Json => "application/json",
        }
    }
}

/// Encodes a string into a PNG QR code.
pub trait QrEncoder: Send + Sync {
    fn encode_png(&self, data: &str) -> Result<Vec<u8>, RenderError>;
}

/// Renders a named view with a serializable model.
pub trait ViewRenderer: Send + Sync {
    fn render(&self, view: &str, model: &serde_json::Value) -> Result<String, RenderError>;
}

/// QR encoder backed by the `qrcode` and `image` crates: error correction
/// level M, transparent background, black modules.
#[derive(Debug, Clone)]
pub struct PngQrEncoder {
    module_px: u32,
}

impl Default for PngQrEncoder {
    fn default() -> Self {
        Self {
            module_px: QR_MODULE_PX,
        }
    }
}

impl QrEncoder for PngQrEncoder {
    fn encode_png(&self, data: &str) -> Result<Vec<u8>, RenderError> {
        let code = QrCode::with_error_correction_level(data.as_bytes(), EcLevel::M)
            .map_err(|e| RenderError::Qr(e.to_string()))?;
        let image = code
            .render::<Rgba<u8>>()
            .dark_color(Rgba([0, 0, 0, 255]))
            .light_color(Rgba([0, 0, 0, 0]))
            .module_dimensions(self.module_px, self.module_px)
            .build();

        let mut png = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .map_err(|e| RenderError::Image(e.to_string()))?;
        Ok(png)
    }
}

/// Tera-backed views. A view named `wrap` is the template `wrap.html`.
pub struct TeraViews {
    tera: Tera,
}

impl TeraViews {
    /// Views compiled into the binary.
    pub fn builtin() -> Result<Self, RenderError> {
        let mut tera = Tera::default();
        tera.add_raw_templates(vec![
            ("start.html", START_TEMPLATE),
            ("wrap.html", WRAP_TEMPLATE),
        ])?;
        Ok(Self { tera })
    }

    /// Load every template in `dir`, parsed once up front.
    pub fn from_dir(dir: &str) -> Result<Self, RenderError> {
        let glob = format!("{}/*", dir.trim_end_matches('/'));
        let tera = Tera::new(&glob)?;
        tracing::info!(templates = tera.get_template_names().count(), dir = %dir, "loaded views");
        Ok(Self { tera })
    }
}

impl ViewRenderer for TeraViews {
    fn render(&self, view: &str, model: &serde_json::Value) -> Result<String, RenderError> {
        let context = tera::Context::from_serialize(model)?;
        Ok(self.tera.render(&format!("{view}.html"), &context)?)
    }
}

#[derive(Debug, Serialize)]
struct WrapView<'a> {
    invoice: &'a str,
    qr_png_base64: String,
}

/// Formats relay results. Holds the shared, read-only rendering ports.
#[derive(Clone)]
pub struct Formatter {
    qr: Arc<dyn QrEncoder>,
    views: Arc<dyn ViewRenderer>,
}

impl Formatter {
    pub fn new(qr: Arc<dyn QrEncoder>, views: Arc<dyn ViewRenderer>) -> Self {
        Self { qr, views }
    }

    /// Static landing page with the invoice form.
    pub fn landing_page(&self) -> Result<String, RenderError> {
        self.views.render("start", &serde_json::json!({}))
    }

    /// HTML page showing the wrapped invoice and its QR code.
    ///
    /// The QR code encodes the upper-case form, which fits QR alphanumeric
    /// mode and yields a smaller symbol.
    pub fn wrap_page(&self, wrapped: &str) -> Result<String, RenderError> {
        let invoice = wrapped.trim();
        let png = self.qr.encode_png(&invoice.to_uppercase())?;
        let view = WrapView {
            invoice,
            qr_png_base64: base64::engine::general_purpose::STANDARD.encode(png),
        };
        let model = serde_json::to_value(view).map_err(tera::Error::json)?;
        self.views.render("wrap", &model)
    }

    /// Body for a wrapped invoice in the requested format.
    pub fn format_relay(&self, wrapped: &str, format: OutputFormat) -> Result<String, RenderError> {
        match format {
            OutputFormat::Html => self.wrap_page(wrapped),
            OutputFormat::Text => Ok(format!("{}\n", wrapped.trim())),
            OutputFormat::Json => Ok(serde_json::json!({ "wpr": wrapped.trim() }).to_string()),
        }
    }
}
