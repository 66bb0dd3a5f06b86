mod app;
mod config;
mod http;
mod metrics;
mod validation;

#[cfg(test)]
mod test_support;

pub use app::{AppError, AppResult};
pub use config::ConfigError;
pub use http::{FailureKind, HttpError, TransportError};
pub use metrics::MetricsError;
pub use validation::ValidationError;
