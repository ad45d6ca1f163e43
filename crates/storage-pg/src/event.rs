// Copyright 2026 The VCM Authors.
//
// SPDX-License-Identifier: AGPL-3.0-only
// Please see LICENSE in the repository root for full details.

//! A module containing the PostgreSQL implementation of the event repository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rand::RngCore;
use sqlx::PgConnection;
use ulid::Ulid;
use uuid::Uuid;
use vcm_data_model::{Clock, Event};
use vcm_storage::EventRepository;

use crate::{DatabaseError, tracing::ExecuteExt};

/// An implementation of [`EventRepository`] for a PostgreSQL connection
pub struct PgEventRepository<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> PgEventRepository<'c> {
    /// Create a new [`PgEventRepository`] from an active PostgreSQL connection
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct EventLookup {
    event_id: Uuid,
    title: String,
    end_dt: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

impl From<EventLookup> for Event {
    fn from(value: EventLookup) -> Self {
        Self {
            id: value.event_id.into(),
            title: value.title,
            end_dt: value.end_dt,
            created_at: value.created_at,
        }
    }
}

#[async_trait]
impl EventRepository for PgEventRepository<'_> {
    type Error = DatabaseError;

    #[tracing::instrument(
        name = "db.event.lookup",
        skip_all,
        fields(
            db.query.text,
            event.id = %id,
        ),
        err,
    )]
    async fn lookup(&mut self, id: Ulid) -> Result<Option<Event>, Self::Error> {
        let res = sqlx::query_as::<_, EventLookup>(
            r"
                SELECT event_id
                     , title
                     , end_dt
                     , created_at
                FROM events
                WHERE event_id = $1
            ",
        )
        .bind(Uuid::from(id))
        .traced()
        .fetch_optional(&mut *self.conn)
        .await?;

        let Some(res) = res else { return Ok(None) };

        Ok(Some(res.into()))
    }

    #[tracing::instrument(
        name = "db.event.add",
        skip_all,
        fields(
            db.query.text,
            event.title = title,
            event.id,
        ),
        err,
    )]
    async fn add(
        &mut self,
        rng: &mut (dyn RngCore + Send),
        clock: &dyn Clock,
        title: String,
        end_dt: DateTime<Utc>,
    ) -> Result<Event, Self::Error> {
        let created_at = clock.now();
        let id = Ulid::from_datetime_with_source(created_at.into(), rng);
        tracing::Span::current().record("event.id", tracing::field::display(id));

        let res = sqlx::query(
            r"
                INSERT INTO events (event_id, title, end_dt, created_at)
                VALUES ($1, $2, $3, $4)
            ",
        )
        .bind(Uuid::from(id))
        .bind(&title)
        .bind(end_dt)
        .bind(created_at)
        .traced()
        .execute(&mut *self.conn)
        .await?;

        DatabaseError::ensure_affected_rows(&res, 1)?;

        Ok(Event {
            id,
            title,
            end_dt,
            created_at,
        })
    }
}
