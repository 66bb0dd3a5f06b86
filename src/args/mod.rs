//! CLI argument types and parsing helpers.
mod cli;
pub(crate) mod defaults;
pub(crate) mod parsers;
mod types;


pub use cli::LoadArgs;
pub use types::{OutputFormat, PayloadKind, PositiveU64, PositiveUsize, TlsVersion};

pub(crate) use parsers::{parse_duration_arg, parse_header};
