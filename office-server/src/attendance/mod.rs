//! Attendance engine
//!
//! - [`rules`] - wall-clock thresholds, break limits, totals
//! - [`service`] - check-in/out, breaks, manual entry and corrections

pub mod rules;
pub mod service;
