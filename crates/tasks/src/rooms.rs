// Copyright 2026 The VCM Authors.
//
// SPDX-License-Identifier: AGPL-3.0-only
// Please see LICENSE in the repository root for full details.

//! Cleanup of stale video-conference rooms

use anyhow::Context as _;
use async_trait::async_trait;
use tracing::{debug, error, info, warn};
use vcm_email::{Address, Mailbox, RoomDeletedContext};
use vcm_vc::DeleteRoomError;

use crate::{
    State,
    scheduler::{JobContext, JobError, RunnableJob},
};

/// How many processed rooms to accumulate before committing the transaction
pub const CLEANUP_BATCH_SIZE: usize = 20;

/// Job deleting the rooms whose events all lie outside the retention window
#[derive(Debug, Clone, Copy, Default)]
pub struct CleanupStaleRoomsJob {
    dry_run: bool,
}

impl CleanupStaleRoomsJob {
    /// Create the job, logging the candidates without touching them if
    /// `dry_run` is set
    #[must_use]
    pub fn new(dry_run: bool) -> Self {
        Self { dry_run }
    }
}

#[async_trait]
impl RunnableJob for CleanupStaleRoomsJob {
    #[tracing::instrument(
        name = "job.cleanup_stale_rooms",
        fields(dry_run = self.dry_run),
        skip_all,
    )]
    async fn run(&self, state: &State, context: JobContext) -> Result<(), JobError> {
        let clock = state.clock();
        let mailer = state.mailer();
        let conn = state.vc_connection();
        let cutoff = clock.now() - state.retention();

        let mut repo = state.repository().await.map_err(JobError::retry)?;

        let candidates = repo
            .vc_room()
            .find_stale(conn.provider(), cutoff)
            .await
            .map_err(JobError::retry)?;

        if candidates.is_empty() {
            debug!("no stale rooms to clean up");
            repo.cancel().await.map_err(JobError::retry)?;
            return Ok(());
        }

        info!(count = candidates.len(), "found stale rooms");

        if self.dry_run {
            for room in &candidates {
                info!(
                    vc_room.id = %room.id,
                    vc_room.name = %room.name,
                    "would delete stale room"
                );
            }

            repo.cancel().await.map_err(JobError::retry)?;
            return Ok(());
        }

        let mut processed = 0;
        for room in candidates {
            if context.cancellation_token.is_cancelled() {
                break;
            }

            match conn.delete_room(&room, None).await {
                Ok(()) => {
                    let owner = repo
                        .user()
                        .lookup(room.extension.owned_by_id)
                        .await
                        .map_err(JobError::retry)?
                        .context("Room owner not found")
                        .map_err(JobError::fail)?;

                    let room = repo
                        .vc_room()
                        .mark_deleted(clock, room)
                        .await
                        .map_err(JobError::retry)?;

                    let address: Address = owner.email.parse().map_err(JobError::fail)?;
                    let mailbox = Mailbox::new(Some(owner.username.clone()), address);
                    mailer
                        .send_room_deleted_email(mailbox, &RoomDeletedContext::new(&room, &owner))
                        .await
                        .map_err(JobError::fail)?;

                    info!(vc_room.id = %room.id, "deleted stale room");
                }

                Err(DeleteRoomError::NotFound) => {
                    // The remote side is already gone, only the local record
                    // needs to catch up. No email in that case.
                    warn!(vc_room.id = %room.id, "room is already gone on the provider");

                    repo.vc_room()
                        .mark_deleted(clock, room)
                        .await
                        .map_err(JobError::retry)?;
                }

                Err(DeleteRoomError::Other(e)) => {
                    // Leave the room untouched, it will be picked up again on
                    // the next run
                    error!(vc_room.id = %room.id, "failed to delete room on the provider: {e:#}");
                }
            }

            // Failed rooms count towards the batch size, so a run hitting
            // many of them still commits regularly
            processed += 1;
            if processed % CLEANUP_BATCH_SIZE == 0 {
                repo.save().await.map_err(JobError::retry)?;
                repo = state.repository().await.map_err(JobError::retry)?;
            }
        }

        repo.save().await.map_err(JobError::retry)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    use async_trait::async_trait;
    use chrono::Duration;
    use rand::SeedableRng;
    use rand_chacha::ChaChaRng;
    use sqlx::PgPool;
    use vcm_data_model::{Clock, MockClock, PROVIDER_VIDYO, User, VcRoom, VcRoomStatus};
    use vcm_email::{MailTransport, Mailer, Templates};
    use vcm_storage::{BoxRepository, RepositoryError, RepositoryFactory, VcRoomFilter};
    use vcm_storage_pg::PgRepositoryFactory;
    use vcm_vc::MockVcProviderConnection;

    use super::*;

    /// A repository factory which counts how many transactions were opened
    #[derive(Clone)]
    struct CountingRepositoryFactory {
        inner: PgRepositoryFactory,
        count: Arc<AtomicUsize>,
    }

    impl CountingRepositoryFactory {
        fn new(pool: PgPool) -> Self {
            Self {
                inner: PgRepositoryFactory::new(pool),
                count: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    #[async_trait]
    impl RepositoryFactory for CountingRepositoryFactory {
        async fn create(&self) -> Result<BoxRepository, RepositoryError> {
            self.count.fetch_add(1, Ordering::SeqCst);
            self.inner.create().await
        }
    }

    fn mailer(transport: MailTransport) -> Mailer {
        let mailbox: Mailbox = "Notifier <notifier@example.com>".parse().unwrap();
        Mailer::new(
            Templates::load().unwrap(),
            transport,
            mailbox.clone(),
            mailbox,
        )
    }

    async fn add_owner(repo: &mut BoxRepository, rng: &mut ChaChaRng, clock: &dyn Clock) -> User {
        repo.user()
            .add(
                rng,
                clock,
                "alice".to_owned(),
                "alice@example.com".to_owned(),
            )
            .await
            .unwrap()
    }

    async fn add_room(
        repo: &mut BoxRepository,
        rng: &mut ChaChaRng,
        clock: &dyn Clock,
        extension: &str,
        owner: &User,
    ) -> VcRoom {
        repo.vc_room()
            .add(
                rng,
                clock,
                format!("room {extension}"),
                PROVIDER_VIDYO.to_owned(),
                extension.to_owned(),
                owner,
            )
            .await
            .unwrap()
    }

    /// Attach an event to a room, ending the given number of days in the past
    async fn attach_event(
        repo: &mut BoxRepository,
        rng: &mut ChaChaRng,
        clock: &dyn Clock,
        room: &VcRoom,
        days_ago: i64,
    ) {
        let event = repo
            .event()
            .add(
                rng,
                clock,
                format!("meeting in {}", room.name),
                clock.now() - Duration::days(days_ago),
            )
            .await
            .unwrap();

        repo.vc_room_event()
            .add(rng, clock, room, &event)
            .await
            .unwrap();
    }

    #[sqlx::test(migrator = "vcm_storage_pg::MIGRATOR")]
    async fn test_cleanup(pool: PgPool) {
        let mut rng = ChaChaRng::seed_from_u64(42);
        let clock = MockClock::default();
        let conn = MockVcProviderConnection::new(PROVIDER_VIDYO);
        let transport = MailTransport::recorder();

        let factory = PgRepositoryFactory::new(pool.clone());
        let mut repo = factory.create().await.unwrap();

        let owner = add_owner(&mut repo, &mut rng, &clock).await;

        let stale = add_room(&mut repo, &mut rng, &clock, "stale", &owner).await;
        attach_event(&mut repo, &mut rng, &clock, &stale, 400).await;

        let active = add_room(&mut repo, &mut rng, &clock, "active", &owner).await;
        attach_event(&mut repo, &mut rng, &clock, &active, 400).await;
        attach_event(&mut repo, &mut rng, &clock, &active, 10).await;

        repo.save().await.unwrap();

        conn.add_room("stale").await;
        conn.add_room("active").await;

        let state = State::new(
            factory,
            MockClock::default(),
            mailer(transport.clone()),
            conn.clone(),
            Duration::days(365),
        );

        CleanupStaleRoomsJob::default()
            .run(&state, JobContext::default())
            .await
            .unwrap();

        let mut repo = state.repository().await.unwrap();
        let stale = repo.vc_room().lookup(stale.id).await.unwrap().unwrap();
        assert_eq!(stale.status, VcRoomStatus::Deleted);
        assert_eq!(stale.deleted_at, Some(clock.now()));

        let active = repo.vc_room().lookup(active.id).await.unwrap().unwrap();
        assert_eq!(active.status, VcRoomStatus::Created);
        repo.cancel().await.unwrap();

        // Only the stale room was deleted on the provider, and only its owner
        // got an email
        assert_eq!(conn.delete_calls().await, vec!["stale".to_owned()]);
        let recorded = transport.recorded();
        assert_eq!(recorded.len(), 1);
        assert_eq!(
            recorded[0].envelope.to()[0].to_string(),
            "alice@example.com"
        );
    }

    #[sqlx::test(migrator = "vcm_storage_pg::MIGRATOR")]
    async fn test_cleanup_dry_run(pool: PgPool) {
        let mut rng = ChaChaRng::seed_from_u64(42);
        let clock = MockClock::default();
        let conn = MockVcProviderConnection::new(PROVIDER_VIDYO);
        let transport = MailTransport::recorder();

        let factory = PgRepositoryFactory::new(pool.clone());
        let mut repo = factory.create().await.unwrap();
        let owner = add_owner(&mut repo, &mut rng, &clock).await;
        let room = add_room(&mut repo, &mut rng, &clock, "orphan", &owner).await;
        repo.save().await.unwrap();

        conn.add_room("orphan").await;

        let state = State::new(
            factory,
            MockClock::default(),
            mailer(transport.clone()),
            conn.clone(),
            Duration::days(365),
        );

        CleanupStaleRoomsJob::new(true)
            .run(&state, JobContext::default())
            .await
            .unwrap();

        let mut repo = state.repository().await.unwrap();
        let room = repo.vc_room().lookup(room.id).await.unwrap().unwrap();
        assert_eq!(room.status, VcRoomStatus::Created);
        repo.cancel().await.unwrap();

        assert!(conn.delete_calls().await.is_empty());
        assert!(transport.recorded().is_empty());
    }

    #[sqlx::test(migrator = "vcm_storage_pg::MIGRATOR")]
    async fn test_cleanup_room_gone_on_provider(pool: PgPool) {
        let mut rng = ChaChaRng::seed_from_u64(42);
        let clock = MockClock::default();
        let conn = MockVcProviderConnection::new(PROVIDER_VIDYO);
        let transport = MailTransport::recorder();

        let factory = PgRepositoryFactory::new(pool.clone());
        let mut repo = factory.create().await.unwrap();
        let owner = add_owner(&mut repo, &mut rng, &clock).await;
        let room = add_room(&mut repo, &mut rng, &clock, "ghost", &owner).await;
        repo.save().await.unwrap();

        // The room was never added to the mock provider, so the deletion
        // reports it as missing
        let state = State::new(
            factory,
            MockClock::default(),
            mailer(transport.clone()),
            conn.clone(),
            Duration::days(365),
        );

        CleanupStaleRoomsJob::default()
            .run(&state, JobContext::default())
            .await
            .unwrap();

        let mut repo = state.repository().await.unwrap();
        let room = repo.vc_room().lookup(room.id).await.unwrap().unwrap();
        assert_eq!(room.status, VcRoomStatus::Deleted);
        repo.cancel().await.unwrap();

        assert_eq!(conn.delete_calls().await, vec!["ghost".to_owned()]);
        assert!(transport.recorded().is_empty());
    }

    #[sqlx::test(migrator = "vcm_storage_pg::MIGRATOR")]
    async fn test_cleanup_provider_error(pool: PgPool) {
        let mut rng = ChaChaRng::seed_from_u64(42);
        let clock = MockClock::default();
        let conn = MockVcProviderConnection::new(PROVIDER_VIDYO);
        let transport = MailTransport::recorder();

        let factory = PgRepositoryFactory::new(pool.clone());
        let mut repo = factory.create().await.unwrap();
        let owner = add_owner(&mut repo, &mut rng, &clock).await;
        let room = add_room(&mut repo, &mut rng, &clock, "unlucky", &owner).await;
        repo.save().await.unwrap();

        conn.add_room("unlucky").await;
        conn.fail_all(true).await;

        let state = State::new(
            factory,
            MockClock::default(),
            mailer(transport.clone()),
            conn.clone(),
            Duration::days(365),
        );

        // A provider-side failure is logged but does not fail the run
        CleanupStaleRoomsJob::default()
            .run(&state, JobContext::default())
            .await
            .unwrap();

        let mut repo = state.repository().await.unwrap();
        let room = repo.vc_room().lookup(room.id).await.unwrap().unwrap();
        assert_eq!(room.status, VcRoomStatus::Created);
        repo.cancel().await.unwrap();

        assert_eq!(conn.delete_calls().await, vec!["unlucky".to_owned()]);
        assert!(transport.recorded().is_empty());
    }

    #[sqlx::test(migrator = "vcm_storage_pg::MIGRATOR")]
    async fn test_cleanup_notification_failure(pool: PgPool) {
        let mut rng = ChaChaRng::seed_from_u64(42);
        let clock = MockClock::default();
        let conn = MockVcProviderConnection::new(PROVIDER_VIDYO);
        let transport = MailTransport::recorder();

        let factory = PgRepositoryFactory::new(pool.clone());
        let mut repo = factory.create().await.unwrap();
        let owner = add_owner(&mut repo, &mut rng, &clock).await;
        let first = add_room(&mut repo, &mut rng, &clock, "first", &owner).await;
        let second = add_room(&mut repo, &mut rng, &clock, "second", &owner).await;
        repo.save().await.unwrap();

        conn.add_room("first").await;
        conn.add_room("second").await;
        transport.fail_all(true);

        let state = State::new(
            factory,
            MockClock::default(),
            mailer(transport.clone()),
            conn.clone(),
            Duration::days(365),
        );

        // The send failure aborts the run
        let err = CleanupStaleRoomsJob::default()
            .run(&state, JobContext::default())
            .await
            .unwrap_err();
        assert_eq!(err.decision(), crate::JobErrorDecision::Fail);

        // The uncommitted batch was rolled back, so both rooms are still
        // marked as created and will be picked up on the next run
        let mut repo = state.repository().await.unwrap();
        let first = repo.vc_room().lookup(first.id).await.unwrap().unwrap();
        assert_eq!(first.status, VcRoomStatus::Created);
        let second = repo.vc_room().lookup(second.id).await.unwrap().unwrap();
        assert_eq!(second.status, VcRoomStatus::Created);
        repo.cancel().await.unwrap();

        // Only one deletion was attempted before the run aborted
        assert_eq!(conn.delete_calls().await.len(), 1);
        assert!(transport.recorded().is_empty());
    }

    #[sqlx::test(migrator = "vcm_storage_pg::MIGRATOR")]
    async fn test_cleanup_commits_in_batches(pool: PgPool) {
        let mut rng = ChaChaRng::seed_from_u64(42);
        let clock = MockClock::default();
        let conn = MockVcProviderConnection::new(PROVIDER_VIDYO);
        let transport = MailTransport::recorder();

        let factory = CountingRepositoryFactory::new(pool.clone());
        let mut repo = factory.create().await.unwrap();
        let owner = add_owner(&mut repo, &mut rng, &clock).await;

        for n in 0..41 {
            let extension = format!("room-{n}");
            add_room(&mut repo, &mut rng, &clock, &extension, &owner).await;
            conn.add_room(extension).await;
        }

        repo.save().await.unwrap();
        factory.count.store(0, Ordering::SeqCst);

        let state = State::new(
            factory.clone(),
            MockClock::default(),
            mailer(transport.clone()),
            conn.clone(),
            Duration::days(365),
        );

        CleanupStaleRoomsJob::default()
            .run(&state, JobContext::default())
            .await
            .unwrap();

        // 41 rooms split over two full batches plus a trailing one
        assert_eq!(factory.count.load(Ordering::SeqCst), 3);
        assert_eq!(transport.recorded().len(), 41);

        let mut repo = PgRepositoryFactory::new(pool).create().await.unwrap();
        let deleted = repo
            .vc_room()
            .count(VcRoomFilter::new().with_status(VcRoomStatus::Deleted))
            .await
            .unwrap();
        assert_eq!(deleted, 41);
        repo.cancel().await.unwrap();
    }
}
