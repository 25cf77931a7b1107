//! Survey mapping and record derivation
//!
//! A declarative mapping (typed sections, conversions, clamps, language
//! variants, fan-out jobs) plus a raw worksheet row produce a typed database
//! record with a derived room/stay key.

pub mod types;
pub mod convert;
pub mod resolve;
mod engine;
mod error;

pub use types::*;
pub use engine::{JobBatch, Record, RecordBuilder};
pub use error::ConfigError;
