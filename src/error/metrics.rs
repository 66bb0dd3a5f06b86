use thiserror::Error;

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("Outcome stream closed after {observed} of {expected} outcomes.")]
    OutcomesMissing { expected: u64, observed: u64 },
    #[error("Outcome for request {index} was reported twice.")]
    DuplicateOutcome { index: u64 },
    #[error("Outcome index {index} is outside 0..{total}.")]
    OutcomeOutOfRange { index: u64, total: u64 },
    #[error("Histogram error during {context}: {source}")]
    Histogram {
        context: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[cfg(test)]
    #[error("Test expectation failed: {message}")]
    TestExpectation { message: &'static str },
    #[cfg(test)]
    #[error("Test expectation failed: {message}: {value}")]
    TestExpectationValue {
        message: &'static str,
        value: String,
    },
}
