//! Utils Module - Helper Functions & Shared Utilities

pub mod cache;
pub mod constants;
pub mod decoder;
pub mod rate_limiter;

pub use cache::*;
pub use constants::*;
pub use decoder::*;
pub use rate_limiter::*;
