//! Schema registry and decoder for multiplexed streaming API payloads.
//!
//! A single streaming channel carries market books, tickers, trades, sports
//! feeds and subscription control messages. This crate holds the schemas
//! those payloads must conform to, grouped by payload family, and decodes
//! untyped JSON against them.
//!
//! Decoding never fails through control flow: a violation is returned as an
//! ordered list of path-qualified [`DecodeIssue`]s, which
//! [`report::summarize`] bounds to a readable summary.

pub mod catalog;
pub mod coerce;
pub mod config;
pub mod decoder;
pub mod descriptor;
pub mod error;
pub mod observer;
pub mod registry;
pub mod report;

pub use catalog::{CONTROL, EXCHANGE_DATA, INFO_DATA};
pub use coerce::{CoerceTo, Coercion};
pub use config::RegistryConfig;
pub use decoder::{
    decode, decode_as, decode_as_with_observer, decode_with_observer, DecodeErrors, DecodeIssue,
    DecodeResult,
};
pub use descriptor::SchemaDescriptor;
pub use error::{DataValidationError, Result, SchemaError};
pub use observer::{DecodeObserver, NoopObserver, TracingObserver};
pub use registry::SchemaRegistry;
pub use report::{summarize, MAX_REPORTED_ERRORS};
