//! Shared types for NextOfficeFlow
//!
//! Common types used by the office server and its API clients: the
//! unified error system, the API response envelope, domain models and a
//! few utilities.

pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use axum::{Json, body};
pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
pub use http;
pub use serde::{Deserialize, Serialize};
