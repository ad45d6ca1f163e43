// Copyright 2026 The VCM Authors.
//
// SPDX-License-Identifier: AGPL-3.0-only
// Please see LICENSE in the repository root for full details.

//! The in-process scheduler which drives recurring jobs

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use cron::Schedule;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::State;

/// Errors that can happen when setting up the worker
#[derive(Debug, thiserror::Error)]
pub enum QueueRunnerError {
    /// A schedule expression could not be parsed
    #[error("Invalid schedule expression")]
    InvalidSchedule(#[from] cron::error::Error),
}

/// What to do with a job failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobErrorDecision {
    /// The job should run again on its next scheduled occurrence
    Retry,

    /// The failure is permanent for this run
    Fail,
}

impl std::fmt::Display for JobErrorDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Retry => f.write_str("retry"),
            Self::Fail => f.write_str("fail"),
        }
    }
}

/// An error raised by a [`RunnableJob`]
#[derive(Debug, thiserror::Error)]
#[error("Job failed to run, will {decision}")]
pub struct JobError {
    #[source]
    error: anyhow::Error,
    decision: JobErrorDecision,
}

impl JobError {
    /// Flag the job to be retried on its next scheduled occurrence
    pub fn retry<T: Into<anyhow::Error>>(error: T) -> Self {
        Self {
            error: error.into(),
            decision: JobErrorDecision::Retry,
        }
    }

    /// Flag the job run as permanently failed
    pub fn fail<T: Into<anyhow::Error>>(error: T) -> Self {
        Self {
            error: error.into(),
            decision: JobErrorDecision::Fail,
        }
    }

    /// What the worker does with this failure
    #[must_use]
    pub fn decision(&self) -> JobErrorDecision {
        self.decision
    }
}

/// Per-run context handed to jobs
#[derive(Clone, Default)]
pub struct JobContext {
    /// Signalled when the worker is asked to shut down. Long-running jobs
    /// should check it between units of work.
    pub cancellation_token: CancellationToken,
}

/// A job which can be run by the worker
#[async_trait]
pub trait RunnableJob: Send + Sync + 'static {
    /// Run the job
    async fn run(&self, state: &State, context: JobContext) -> Result<(), JobError>;
}

struct ScheduleDefinition {
    name: &'static str,
    schedule: Schedule,
    next_run: Option<DateTime<Utc>>,
    job: Arc<dyn RunnableJob>,
}

/// The worker which runs jobs on their cron schedule
pub struct QueueWorker {
    state: State,
    schedules: Vec<ScheduleDefinition>,
    cancellation_token: CancellationToken,
}

impl QueueWorker {
    /// Create a new worker with no schedules registered
    #[must_use]
    pub fn new(state: State, cancellation_token: CancellationToken) -> Self {
        Self {
            state,
            schedules: Vec::new(),
            cancellation_token,
        }
    }

    /// Register a job to run on the given schedule
    pub fn add_schedule(
        &mut self,
        name: &'static str,
        schedule: Schedule,
        job: impl RunnableJob,
    ) -> &mut Self {
        let next_run = schedule.after(&self.state.clock().now()).next();
        self.schedules.push(ScheduleDefinition {
            name,
            schedule,
            next_run,
            job: Arc::new(job),
        });

        self
    }

    /// Run the worker until the cancellation token is triggered
    pub async fn run(mut self) {
        tracing::info!("Worker started");

        loop {
            tokio::select! {
                () = self.cancellation_token.cancelled() => break,

                // Wake up every second to check whether a schedule is due
                () = tokio::time::sleep(std::time::Duration::from_secs(1)) => {}
            }

            self.tick().await;
        }

        tracing::info!("Worker stopped");
    }

    async fn tick(&mut self) {
        let now = self.state.clock().now();

        for schedule in &mut self.schedules {
            let Some(next_run) = schedule.next_run else {
                continue;
            };

            if next_run > now {
                continue;
            }

            schedule.next_run = schedule.schedule.after(&now).next();

            let span = tracing::info_span!("job.run", job.name = schedule.name);
            let context = JobContext {
                cancellation_token: self.cancellation_token.child_token(),
            };

            match schedule
                .job
                .run(&self.state, context)
                .instrument(span)
                .await
            {
                Ok(()) => tracing::info!(job.name = schedule.name, "Job completed"),
                Err(e) => tracing::error!(
                    job.name = schedule.name,
                    error = &e as &dyn std::error::Error,
                    "Job failed"
                ),
            }
        }
    }
}
