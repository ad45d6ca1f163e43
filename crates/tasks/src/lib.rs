// Copyright 2026 The VCM Authors.
//
// SPDX-License-Identifier: AGPL-3.0-only
// Please see LICENSE in the repository root for full details.

//! Background jobs and the worker which schedules them

use std::sync::Arc;

use chrono::Duration;
use tokio_util::{sync::CancellationToken, task::TaskTracker};
use vcm_data_model::Clock;
use vcm_email::Mailer;
use vcm_storage::{BoxRepository, RepositoryError, RepositoryFactory};
use vcm_vc::VcProviderConnection;

pub use crate::{
    rooms::{CLEANUP_BATCH_SIZE, CleanupStaleRoomsJob},
    scheduler::{
        JobContext, JobError, JobErrorDecision, QueueRunnerError, QueueWorker, RunnableJob,
    },
};

mod rooms;
mod scheduler;

/// When the stale-room cleanup runs: every Monday at 03:00
const CLEANUP_SCHEDULE: &str = "0 0 3 * * Mon";

/// Dependencies shared by all jobs
#[derive(Clone)]
pub struct State {
    repository_factory: Arc<dyn RepositoryFactory>,
    mailer: Mailer,
    clock: Arc<dyn Clock>,
    conn: Arc<dyn VcProviderConnection>,
    retention: Duration,
}

impl State {
    /// Construct the state out of its parts
    pub fn new(
        repository_factory: impl RepositoryFactory + 'static,
        clock: impl Clock + 'static,
        mailer: Mailer,
        conn: impl VcProviderConnection + 'static,
        retention: Duration,
    ) -> Self {
        Self {
            repository_factory: Arc::new(repository_factory),
            mailer,
            clock: Arc::new(clock),
            conn: Arc::new(conn),
            retention,
        }
    }

    /// The clock used by jobs
    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// The mailer used to notify users
    #[must_use]
    pub fn mailer(&self) -> &Mailer {
        &self.mailer
    }

    /// The connection to the video-conference provider
    pub fn vc_connection(&self) -> &dyn VcProviderConnection {
        self.conn.as_ref()
    }

    /// How long a room's last event may lie in the past before the room is
    /// considered stale
    #[must_use]
    pub fn retention(&self) -> Duration {
        self.retention
    }

    /// Grab a fresh repository, wrapping a new database transaction
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage backend failed
    pub async fn repository(&self) -> Result<BoxRepository, RepositoryError> {
        self.repository_factory.create().await
    }
}

/// Initialise the worker, without running it.
///
/// This is mostly useful for tests.
///
/// # Errors
///
/// Returns an error if a schedule expression is invalid.
pub fn init(
    repository_factory: impl RepositoryFactory + 'static,
    clock: impl Clock + 'static,
    mailer: &Mailer,
    conn: impl VcProviderConnection + 'static,
    retention: Duration,
    cancellation_token: CancellationToken,
) -> Result<QueueWorker, QueueRunnerError> {
    let state = State::new(repository_factory, clock, mailer.clone(), conn, retention);
    let mut worker = QueueWorker::new(state, cancellation_token);

    worker.add_schedule(
        "cleanup-stale-rooms",
        CLEANUP_SCHEDULE.parse()?,
        CleanupStaleRoomsJob::default(),
    );

    Ok(worker)
}

/// Initialise the worker and run it on the task tracker.
///
/// # Errors
///
/// Returns an error if a schedule expression is invalid.
pub fn init_and_run(
    repository_factory: impl RepositoryFactory + 'static,
    clock: impl Clock + 'static,
    mailer: &Mailer,
    conn: impl VcProviderConnection + 'static,
    retention: Duration,
    cancellation_token: CancellationToken,
    task_tracker: &TaskTracker,
) -> Result<(), QueueRunnerError> {
    let worker = init(
        repository_factory,
        clock,
        mailer,
        conn,
        retention,
        cancellation_token,
    )?;

    task_tracker.spawn(worker.run());

    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::{Datelike, Timelike, Utc, Weekday};
    use cron::Schedule;

    use super::CLEANUP_SCHEDULE;

    #[test]
    fn test_cleanup_schedule() {
        let schedule: Schedule = CLEANUP_SCHEDULE.parse().unwrap();
        let next = schedule.after(&Utc::now()).next().unwrap();
        assert_eq!(next.weekday(), Weekday::Mon);
        assert_eq!((next.hour(), next.minute(), next.second()), (3, 0, 0));
    }
}
