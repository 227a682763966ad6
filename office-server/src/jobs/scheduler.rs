//! Job scheduler
//!
//! One loop per job: sleep until the next local fire time, run, repeat.
//! Shutdown interrupts the sleep.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use tokio_util::sync::CancellationToken;

use super::{absentee, leave_rollover, outbox_cleanup, overdue};
use crate::core::ServerState;
use crate::utils::time::local_today;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Job {
    AbsenteeSweep,
    OverdueSweep,
    LeaveRollover,
    OutboxCleanup,
}

impl Job {
    pub fn name(&self) -> &'static str {
        match self {
            Job::AbsenteeSweep => "absentee_sweep",
            Job::OverdueSweep => "overdue_sweep",
            Job::LeaveRollover => "leave_rollover",
            Job::OutboxCleanup => "outbox_cleanup",
        }
    }
}

/// When a job fires, in local wall-clock time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cadence {
    Daily { hour: u32, minute: u32 },
    Yearly { month: u32, day: u32, hour: u32, minute: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    pub job: Job,
    pub cadence: Cadence,
}

impl Schedule {
    pub const ABSENTEE_SWEEP: Schedule = Schedule {
        job: Job::AbsenteeSweep,
        cadence: Cadence::Daily { hour: 22, minute: 0 },
    };
    pub const OVERDUE_SWEEP: Schedule = Schedule {
        job: Job::OverdueSweep,
        cadence: Cadence::Daily { hour: 23, minute: 55 },
    };
    pub const LEAVE_ROLLOVER: Schedule = Schedule {
        job: Job::LeaveRollover,
        cadence: Cadence::Yearly { month: 1, day: 1, hour: 0, minute: 5 },
    };
    pub const OUTBOX_CLEANUP: Schedule = Schedule {
        job: Job::OutboxCleanup,
        cadence: Cadence::Daily { hour: 3, minute: 30 },
    };
}

/// Next fire time strictly after `now`
pub fn next_run(cadence: Cadence, now: DateTime<Tz>) -> DateTime<Tz> {
    let tz = now.timezone();
    let today = now.date_naive();
    match cadence {
        Cadence::Daily { hour, minute } => {
            let at = wall_clock(hour, minute);
            let date = if now.time() >= at { today + Duration::days(1) } else { today };
            resolve(tz, date, at)
        }
        Cadence::Yearly { month, day, hour, minute } => {
            let at = wall_clock(hour, minute);
            let this_year = yearly_date(today.year(), month, day);
            let candidate = resolve(tz, this_year, at);
            if candidate > now {
                candidate
            } else {
                resolve(tz, yearly_date(today.year() + 1, month, day), at)
            }
        }
    }
}

fn wall_clock(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN)
}

fn yearly_date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day)
        .or_else(|| NaiveDate::from_ymd_opt(year, month, 1))
        .unwrap_or(NaiveDate::MIN)
}

/// Local wall-clock time to an instant
///
/// A time skipped by a DST change fires an hour later.
fn resolve(tz: Tz, date: NaiveDate, at: NaiveTime) -> DateTime<Tz> {
    let naive = date.and_time(at);
    tz.from_local_datetime(&naive)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(naive + Duration::hours(1))).earliest())
        .unwrap_or_else(|| tz.from_utc_datetime(&naive))
}

fn duration_until(next: DateTime<Tz>, now: DateTime<Tz>) -> std::time::Duration {
    let wait = next.signed_duration_since(now);
    if wait.num_seconds() <= 0 {
        std::time::Duration::from_secs(60)
    } else {
        wait.to_std().unwrap_or(std::time::Duration::from_secs(60))
    }
}

/// Runs scheduled jobs against the shared state
#[derive(Clone)]
pub struct JobScheduler {
    state: ServerState,
    shutdown: CancellationToken,
}

impl JobScheduler {
    pub fn new(state: ServerState, shutdown: CancellationToken) -> Self {
        Self { state, shutdown }
    }

    pub async fn run(self, schedule: Schedule) {
        let tz = self.state.config.timezone;
        let name = schedule.job.name();
        tracing::info!(job = name, "Job scheduler started");

        loop {
            let now = Utc::now().with_timezone(&tz);
            let next = next_run(schedule.cadence, now);
            let wait = duration_until(next, now);
            tracing::debug!(job = name, next = %next, wait_mins = wait.as_secs() / 60, "Next run scheduled");

            tokio::select! {
                _ = tokio::time::sleep(wait) => {
                    self.run_job(schedule.job).await;
                }
                _ = self.shutdown.cancelled() => {
                    tracing::info!(job = name, "Job scheduler received shutdown signal");
                    return;
                }
            }
        }
    }

    /// Run one job now; failures are logged, never propagated
    pub async fn run_job(&self, job: Job) {
        let pool = &self.state.pool;
        let today = local_today(self.state.config.timezone);

        let outcome = match job {
            Job::AbsenteeSweep => absentee::mark_absentees(pool, today)
                .await
                .map(|marked| marked > 0),
            Job::OverdueSweep => overdue::sweep(pool, today)
                .await
                .map(|report| report != overdue::OverdueReport::default()),
            Job::LeaveRollover => leave_rollover::roll_over(
                pool,
                today.year(),
                self.state.config.default_available_leaves,
            )
            .await
            .map(|_| true),
            Job::OutboxCleanup => outbox_cleanup::prune(pool, shared::util::now_millis())
                .await
                .map(|_| false),
        };

        match outcome {
            Ok(true) => self.state.wake_outbox(),
            Ok(false) => {}
            Err(e) => tracing::error!(job = job.name(), error = %e, "Scheduled job failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn local(tz: Tz, y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Tz> {
        tz.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn daily_fires_later_today() {
        let now = local(Tz::UTC, 2024, 3, 4, 21, 0);
        let next = next_run(Schedule::ABSENTEE_SWEEP.cadence, now);
        assert_eq!(next, local(Tz::UTC, 2024, 3, 4, 22, 0));
    }

    #[test]
    fn daily_rolls_to_tomorrow_once_passed() {
        let now = local(Tz::UTC, 2024, 3, 4, 22, 0);
        let next = next_run(Schedule::ABSENTEE_SWEEP.cadence, now);
        assert_eq!(next, local(Tz::UTC, 2024, 3, 5, 22, 0));
    }

    #[test]
    fn yearly_waits_for_next_january() {
        let now = local(Tz::UTC, 2024, 1, 1, 0, 6);
        let next = next_run(Schedule::LEAVE_ROLLOVER.cadence, now);
        assert_eq!(next, local(Tz::UTC, 2025, 1, 1, 0, 5));

        let before = local(Tz::UTC, 2024, 1, 1, 0, 4);
        assert_eq!(
            next_run(Schedule::LEAVE_ROLLOVER.cadence, before),
            local(Tz::UTC, 2024, 1, 1, 0, 5)
        );
    }

    #[test]
    fn skipped_local_time_fires_after_the_gap() {
        // 2024-03-31 02:30 does not exist in Paris
        let tz = chrono_tz::Europe::Paris;
        let cadence = Cadence::Daily { hour: 2, minute: 30 };
        let now = local(tz, 2024, 3, 31, 1, 0);
        let next = next_run(cadence, now);
        assert_eq!(next.date_naive(), NaiveDate::from_ymd_opt(2024, 3, 31).unwrap());
        assert_eq!(next.hour(), 3);
    }

    #[test]
    fn wait_is_never_zero() {
        let now = local(Tz::UTC, 2024, 3, 4, 12, 0);
        assert_eq!(duration_until(now, now), std::time::Duration::from_secs(60));
    }
}
