//! Scheduled jobs
//!
//! | Job | When (business timezone) |
//! |-----|--------------------------|
//! | [`absentee`] sweep | daily 22:00, weekdays only |
//! | [`overdue`] sweep | daily 23:55 |
//! | [`leave_rollover`] | 1 January 00:05 |
//! | [`outbox_cleanup`] | daily 03:30 |
//!
//! [`scheduler::JobScheduler`] drives them; each job logs its own failures
//! and the loop keeps going.

pub mod absentee;
pub mod leave_rollover;
pub mod outbox_cleanup;
pub mod overdue;
pub mod scheduler;
