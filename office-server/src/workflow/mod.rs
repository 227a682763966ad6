//! Request/approval workflow
//!
//! - [`approval`] - which stage a decision targets and whether it is allowed
//! - [`leave`] - paid-first leave balance allocation
//! - [`service`] - create/decide/delete against the database

pub mod approval;
pub mod leave;
pub mod service;

pub use approval::{Stage, plan_decision};
pub use leave::{Allocation, allocate};
