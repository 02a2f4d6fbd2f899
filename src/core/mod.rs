//! Core Module - Aggregation Engine
//!
//! Pure, deterministic folds over already-fetched transaction batches.
//! No I/O here; fetching lives in `analytics`.

pub mod activity;
pub mod alerts;
pub mod distribution;
pub mod flow;
pub mod holders;
pub mod ticks;
pub mod wallets;

pub use activity::*;
pub use alerts::*;
pub use distribution::*;
pub use flow::*;
pub use holders::*;
pub use ticks::*;
pub use wallets::*;
