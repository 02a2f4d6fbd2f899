//! Models Module - Data Structures & Configuration
//!
//! Wire records, error codes and every tunable; no literals outside
//! `utils::constants` and this module.

pub mod config;
pub mod errors;
pub mod types;

pub use config::*;
pub use errors::*;
pub use types::*;
