//! Core: configuration, shared state, server lifecycle
//!
//! - [`Config`] - environment-driven configuration
//! - [`ServerState`] - state shared by handlers and background tasks
//! - [`Server`] - HTTP server
//! - [`ServerError`] - startup errors

pub mod config;
pub mod error;
pub mod server;
pub mod state;
pub mod tasks;

pub use config::Config;
pub use error::{Result, ServerError};
pub use server::Server;
pub use state::ServerState;
