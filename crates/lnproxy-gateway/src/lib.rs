pub mod config;
pub mod cors;
pub mod error;
pub mod invoice;
pub mod metrics;
pub mod normalize;
pub mod relay;
pub mod render;
pub mod routes;
pub mod state;
pub mod tls;

pub use config::GatewayConfig;
pub use error::{ApiError, GatewayError};
pub use invoice::{match_relay_path, parse_invoice, Invoice, RelayRoute};
pub use relay::{BackendClient, RelayError, RelayRequest};
pub use render::{Formatter, OutputFormat, QrEncoder, ViewRenderer};
pub use state::AppState;
