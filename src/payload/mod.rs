//! JSON request bodies and serial-number generation.
mod serial;


use std::sync::Arc;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult, ValidationError};

pub use serial::{SERIAL_HEX_DIGITS, random_serial};

/// Body POSTed to the target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestPayload {
    pub version: String,
    pub serial_number: String,
}

impl RequestPayload {
    #[must_use]
    pub fn new(version: impl Into<String>, serial_number: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            serial_number: serial_number.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum PayloadStrategy {
    /// Identical payload for every request.
    Static(RequestPayload),
    /// `PREFIX-XXXXXXXX` with eight independent uppercase hex digits.
    Randomized { version: String, prefix: String },
    /// Serial sampled from a compiled regular expression.
    Pattern {
        version: String,
        source: String,
        regex: Arc<rand_regex::Regex>,
    },
}

impl PayloadStrategy {
    /// Compiles a pattern strategy.
    ///
    /// # Errors
    ///
    /// Returns an error when the pattern is not a valid regular expression.
    pub fn pattern(version: impl Into<String>, pattern: &str, max_repeat: u32) -> AppResult<Self> {
        let regex = rand_regex::Regex::compile(pattern, max_repeat).map_err(|err| {
            AppError::validation(ValidationError::InvalidSerialPattern {
                pattern: pattern.to_owned(),
                source: err,
            })
        })?;
        Ok(PayloadStrategy::Pattern {
            version: version.into(),
            source: pattern.to_owned(),
            regex: Arc::new(regex),
        })
    }

    /// Randomized strategy.
    ///
    /// # Errors
    ///
    /// Returns an error when the prefix is empty.
    pub fn randomized(version: impl Into<String>, prefix: impl Into<String>) -> AppResult<Self> {
        let prefix = prefix.into();
        if prefix.trim().is_empty() {
            return Err(AppError::validation(ValidationError::SerialPrefixEmpty));
        }
        Ok(PayloadStrategy::Randomized {
            version: version.into(),
            prefix,
        })
    }

    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            PayloadStrategy::Static(_) => "static",
            PayloadStrategy::Randomized { .. } => "random",
            PayloadStrategy::Pattern { .. } => "pattern",
        }
    }
}

/// Builds one payload per work item.
///
/// Holds no mutable state: every call draws from the calling thread's RNG,
/// so a single builder can be shared by all workers behind an `Arc`.
#[derive(Debug, Clone)]
pub struct PayloadBuilder {
    strategy: PayloadStrategy,
}

impl PayloadBuilder {
    #[must_use]
    pub const fn new(strategy: PayloadStrategy) -> Self {
        Self { strategy }
    }

    /// The request index is accepted for symmetry with the work queue; no
    /// strategy currently derives fields from it.
    #[must_use]
    pub fn build(&self, _index: u64) -> RequestPayload {
        match &self.strategy {
            PayloadStrategy::Static(payload) => payload.clone(),
            PayloadStrategy::Randomized { version, prefix } => {
                let mut rng = rand::thread_rng();
                RequestPayload::new(version.as_str(), random_serial(prefix, &mut rng))
            }
            PayloadStrategy::Pattern { version, regex, .. } => {
                let serial: String = rand::thread_rng().sample(regex.as_ref());
                RequestPayload::new(version.as_str(), serial)
            }
        }
    }

    /// JSON body for the given request index.
    ///
    /// # Errors
    ///
    /// Returns an error if serialisation fails.
    pub fn encode(&self, index: u64) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(&self.build(index))
    }
}
