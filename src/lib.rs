//! Core library for the `edgeload` CLI.
//!
//! A bounded-concurrency HTTP load generator: a fixed pool of workers pulls
//! request indices from a shared queue, POSTs a JSON payload over a
//! per-worker keep-alive connection, and streams every outcome to an
//! aggregator that reports throughput once all requests have completed.
//!
//! Library callers build a [`run::RawRunConfig`], validate it into a
//! [`run::RunConfig`] and drive it with [`run::RunController`] over any
//! [`pool::Connector`].
pub mod args;
pub mod config;
pub mod dispatch;
pub mod entry;
pub mod error;
pub mod logger;
pub mod metrics;
pub mod payload;
pub mod pool;
pub mod report;
pub mod run;

#[cfg(feature = "fuzzing")]
pub mod fuzzing;
