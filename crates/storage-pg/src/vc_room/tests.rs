// Copyright 2026 The VCM Authors.
//
// SPDX-License-Identifier: AGPL-3.0-only
// Please see LICENSE in the repository root for full details.

use chrono::Duration;
use rand::SeedableRng;
use rand_chacha::ChaChaRng;
use sqlx::PgPool;
use vcm_data_model::{Clock, MockClock, PROVIDER_VIDYO, User, VcRoom, VcRoomStatus};
use vcm_storage::{BoxRepository, VcRoomFilter};

use crate::PgRepository;

async fn add_user(
    repo: &mut BoxRepository,
    rng: &mut ChaChaRng,
    clock: &MockClock,
    username: &str,
) -> User {
    repo.user()
        .add(
            rng,
            clock,
            username.to_owned(),
            format!("{username}@example.com"),
        )
        .await
        .unwrap()
}

async fn add_room(
    repo: &mut BoxRepository,
    rng: &mut ChaChaRng,
    clock: &MockClock,
    name: &str,
    provider: &str,
    owner: &User,
) -> VcRoom {
    repo.vc_room()
        .add(
            rng,
            clock,
            name.to_owned(),
            provider.to_owned(),
            format!("ext-{name}"),
            owner,
        )
        .await
        .unwrap()
}

#[sqlx::test(migrator = "crate::MIGRATOR")]
async fn test_room_repo(pool: PgPool) {
    let mut rng = ChaChaRng::seed_from_u64(42);
    let clock = MockClock::default();
    let mut repo = PgRepository::from_pool(&pool).await.unwrap().boxed();

    let user = add_user(&mut repo, &mut rng, &clock, "alice").await;
    let room = add_room(&mut repo, &mut rng, &clock, "alpha", PROVIDER_VIDYO, &user).await;
    assert_eq!(room.status, VcRoomStatus::Created);
    assert_eq!(room.extension.owned_by_id, user.id);

    let lookup = repo.vc_room().lookup(room.id).await.unwrap().unwrap();
    assert_eq!(lookup, room);

    let count = repo
        .vc_room()
        .count(VcRoomFilter::new().with_status(VcRoomStatus::Created))
        .await
        .unwrap();
    assert_eq!(count, 1);

    // Marking the room as deleted sets the status and the deletion time
    let deleted = repo.vc_room().mark_deleted(&clock, room).await.unwrap();
    assert_eq!(deleted.status, VcRoomStatus::Deleted);
    assert_eq!(deleted.deleted_at, Some(clock.now()));

    // Marking it again is a no-op
    let again = repo.vc_room().mark_deleted(&clock, deleted).await.unwrap();
    assert_eq!(again.status, VcRoomStatus::Deleted);

    let count = repo
        .vc_room()
        .count(VcRoomFilter::new().with_status(VcRoomStatus::Created))
        .await
        .unwrap();
    assert_eq!(count, 0);

    let count = repo
        .vc_room()
        .count(VcRoomFilter::new().with_status(VcRoomStatus::Deleted))
        .await
        .unwrap();
    assert_eq!(count, 1);

    repo.save().await.unwrap();
}

#[sqlx::test(migrator = "crate::MIGRATOR")]
async fn test_find_stale(pool: PgPool) {
    let mut rng = ChaChaRng::seed_from_u64(42);
    let clock = MockClock::default();
    let mut repo = PgRepository::from_pool(&pool).await.unwrap().boxed();

    let now = clock.now();
    let cutoff = now - Duration::days(365);
    let user = add_user(&mut repo, &mut rng, &clock, "alice").await;

    // A room with no event association at all
    let orphan = add_room(&mut repo, &mut rng, &clock, "orphan", PROVIDER_VIDYO, &user).await;

    // A room only attached to an event which ended long ago
    let old_event = repo
        .event()
        .add(
            &mut rng,
            &clock,
            "old meeting".to_owned(),
            cutoff - Duration::days(30),
        )
        .await
        .unwrap();
    let old_room = add_room(&mut repo, &mut rng, &clock, "old", PROVIDER_VIDYO, &user).await;
    repo.vc_room_event()
        .add(&mut rng, &clock, &old_room, &old_event)
        .await
        .unwrap();

    // A room attached to both an old and a recent event
    let recent_event = repo
        .event()
        .add(
            &mut rng,
            &clock,
            "recent meeting".to_owned(),
            now - Duration::days(7),
        )
        .await
        .unwrap();
    let active_room = add_room(&mut repo, &mut rng, &clock, "active", PROVIDER_VIDYO, &user).await;
    repo.vc_room_event()
        .add(&mut rng, &clock, &active_room, &old_event)
        .await
        .unwrap();
    repo.vc_room_event()
        .add(&mut rng, &clock, &active_room, &recent_event)
        .await
        .unwrap();

    // A room attached to an event ending exactly at the cutoff: not protected
    let boundary_event = repo
        .event()
        .add(&mut rng, &clock, "boundary meeting".to_owned(), cutoff)
        .await
        .unwrap();
    let boundary_room = add_room(
        &mut repo,
        &mut rng,
        &clock,
        "boundary",
        PROVIDER_VIDYO,
        &user,
    )
    .await;
    repo.vc_room_event()
        .add(&mut rng, &clock, &boundary_room, &boundary_event)
        .await
        .unwrap();

    // An already deleted room with no associations
    let gone = add_room(&mut repo, &mut rng, &clock, "gone", PROVIDER_VIDYO, &user).await;
    let gone = repo.vc_room().mark_deleted(&clock, gone).await.unwrap();

    // A room of another provider with no associations
    let other = add_room(&mut repo, &mut rng, &clock, "other", "zoom", &user).await;

    let stale = repo
        .vc_room()
        .find_stale(PROVIDER_VIDYO, cutoff)
        .await
        .unwrap();
    let ids: Vec<_> = stale.iter().map(|room| room.id).collect();

    assert!(ids.contains(&orphan.id));
    assert!(ids.contains(&old_room.id));
    assert!(ids.contains(&boundary_room.id));
    assert!(!ids.contains(&active_room.id));
    assert!(!ids.contains(&gone.id));
    assert!(!ids.contains(&other.id));
    assert_eq!(stale.len(), 3);

    // Results come out in a stable order
    let mut sorted = ids.clone();
    sorted.sort_unstable();
    assert_eq!(ids, sorted);

    // Counting is scoped by the provider filter
    let count = repo
        .vc_room()
        .count(VcRoomFilter::new().for_provider("zoom"))
        .await
        .unwrap();
    assert_eq!(count, 1);

    let count = repo
        .vc_room()
        .count(
            VcRoomFilter::new()
                .for_provider(PROVIDER_VIDYO)
                .with_status(VcRoomStatus::Created),
        )
        .await
        .unwrap();
    assert_eq!(count, 4);

    repo.save().await.unwrap();
}
