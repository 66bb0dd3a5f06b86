//! Outcome types, aggregation and the run summary.
mod aggregator;
mod histogram;
mod types;

#[cfg(test)]
mod tests;

pub use aggregator::{Aggregator, Tally};
pub use histogram::LatencyHistogram;
pub use types::{LatencyStats, Outcome, OutcomeResult, OutcomeStream, Summary, outcome_channel};
