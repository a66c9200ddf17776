//! Client side of gemini-client.
//!
//! - `gateway`: the HTTP exchange with the inference gateway
//! - `repl`: the read, send, print loop driving it

pub mod gateway;
pub mod repl;

pub use gateway::GatewayClient;
pub use repl::{ask_once, run_repl, ReplOptions};
