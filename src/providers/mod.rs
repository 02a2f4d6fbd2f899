//! Providers Module - External Data Sources
//!
//! Request path: `EndpointClient` -> `RpcGateway` (cache, serial queue,
//! 429 cooldown) -> `Transport` (reqwest in production).

pub mod gateway;
pub mod rpc;
pub mod ticker;
pub mod transport;

pub use gateway::*;
pub use rpc::*;
pub use ticker::*;
pub use transport::*;
