//! Qubic Pulse HTTP API
//! Plain JSON records for the dashboard widgets

pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod types;

pub use handlers::AppState;
pub use routes::create_router;
pub use types::*;
