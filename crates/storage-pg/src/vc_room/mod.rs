// Copyright 2026 The VCM Authors.
//
// SPDX-License-Identifier: AGPL-3.0-only
// Please see LICENSE in the repository root for full details.

//! A module containing the PostgreSQL implementation of the video-conference
//! room repositories

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rand::RngCore;
use sea_query::{Expr, PostgresQueryBuilder, Query};
use sea_query_binder::SqlxBinder;
use sqlx::PgConnection;
use ulid::Ulid;
use uuid::Uuid;
use vcm_data_model::{Clock, Event, User, VcRoom, VcRoomExtension, VcRoomStatus};
use vcm_storage::{VcRoomEventAssociationRepository, VcRoomFilter, VcRoomRepository};

use crate::{
    DatabaseError,
    errors::DatabaseInconsistencyError,
    filter::{Filter, StatementExt},
    iden::VcRooms,
    tracing::ExecuteExt,
};

#[cfg(test)]
mod tests;

/// An implementation of [`VcRoomRepository`] for a PostgreSQL connection
pub struct PgVcRoomRepository<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> PgVcRoomRepository<'c> {
    /// Create a new [`PgVcRoomRepository`] from an active PostgreSQL
    /// connection
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct VcRoomLookup {
    vc_room_id: Uuid,
    name: String,
    provider: String,
    status: String,
    created_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
    extension: String,
    owned_by_id: Uuid,
}

impl TryFrom<VcRoomLookup> for VcRoom {
    type Error = DatabaseInconsistencyError;

    fn try_from(value: VcRoomLookup) -> Result<Self, Self::Error> {
        let id = Ulid::from(value.vc_room_id);
        let status: VcRoomStatus = value.status.parse().map_err(|e| {
            DatabaseInconsistencyError::on("vc_rooms")
                .column("status")
                .row(id)
                .source(e)
        })?;

        Ok(Self {
            id,
            name: value.name,
            provider: value.provider,
            status,
            created_at: value.created_at,
            deleted_at: value.deleted_at,
            extension: VcRoomExtension {
                extension: value.extension,
                owned_by_id: value.owned_by_id.into(),
            },
        })
    }
}

impl Filter for VcRoomFilter<'_> {
    fn generate_condition(&self) -> impl sea_query::IntoCondition {
        sea_query::Condition::all()
            .add_option(self.status().map(|status| {
                Expr::col((VcRooms::Table, VcRooms::Status)).eq(status.as_str())
            }))
            .add_option(self.provider().map(|provider| {
                Expr::col((VcRooms::Table, VcRooms::Provider)).eq(provider)
            }))
    }
}

#[async_trait]
impl VcRoomRepository for PgVcRoomRepository<'_> {
    type Error = DatabaseError;

    #[tracing::instrument(
        name = "db.vc_room.lookup",
        skip_all,
        fields(
            db.query.text,
            vc_room.id = %id,
        ),
        err,
    )]
    async fn lookup(&mut self, id: Ulid) -> Result<Option<VcRoom>, Self::Error> {
        let res = sqlx::query_as::<_, VcRoomLookup>(
            r"
                SELECT r.vc_room_id
                     , r.name
                     , r.provider
                     , r.status
                     , r.created_at
                     , r.deleted_at
                     , x.extension
                     , x.owned_by_id
                FROM vc_rooms r
                INNER JOIN vc_room_extensions x
                  USING (vc_room_id)
                WHERE r.vc_room_id = $1
            ",
        )
        .bind(Uuid::from(id))
        .traced()
        .fetch_optional(&mut *self.conn)
        .await?;

        let Some(res) = res else { return Ok(None) };

        Ok(Some(res.try_into()?))
    }

    #[tracing::instrument(
        name = "db.vc_room.add",
        skip_all,
        fields(
            db.query.text,
            vc_room.name = name,
            vc_room.provider = provider,
            vc_room.id,
        ),
        err,
    )]
    async fn add(
        &mut self,
        rng: &mut (dyn RngCore + Send),
        clock: &dyn Clock,
        name: String,
        provider: String,
        extension: String,
        owner: &User,
    ) -> Result<VcRoom, Self::Error> {
        let created_at = clock.now();
        let id = Ulid::from_datetime_with_source(created_at.into(), rng);
        tracing::Span::current().record("vc_room.id", tracing::field::display(id));

        let res = sqlx::query(
            r"
                INSERT INTO vc_rooms (vc_room_id, name, provider, status, created_at)
                VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(Uuid::from(id))
        .bind(&name)
        .bind(&provider)
        .bind(VcRoomStatus::Created.as_str())
        .bind(created_at)
        .traced()
        .execute(&mut *self.conn)
        .await?;

        DatabaseError::ensure_affected_rows(&res, 1)?;

        let res = sqlx::query(
            r"
                INSERT INTO vc_room_extensions (vc_room_id, extension, owned_by_id)
                VALUES ($1, $2, $3)
            ",
        )
        .bind(Uuid::from(id))
        .bind(&extension)
        .bind(Uuid::from(owner.id))
        .traced()
        .execute(&mut *self.conn)
        .await?;

        DatabaseError::ensure_affected_rows(&res, 1)?;

        Ok(VcRoom {
            id,
            name,
            provider,
            status: VcRoomStatus::Created,
            created_at,
            deleted_at: None,
            extension: VcRoomExtension {
                extension,
                owned_by_id: owner.id,
            },
        })
    }

    #[tracing::instrument(
        name = "db.vc_room.find_stale",
        skip_all,
        fields(
            db.query.text,
            vc_room.provider = provider,
            %cutoff,
        ),
        err,
    )]
    async fn find_stale(
        &mut self,
        provider: &str,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<VcRoom>, Self::Error> {
        // A room is protected as long as one of its events ends strictly
        // after the cutoff
        let res = sqlx::query_as::<_, VcRoomLookup>(
            r"
                SELECT r.vc_room_id
                     , r.name
                     , r.provider
                     , r.status
                     , r.created_at
                     , r.deleted_at
                     , x.extension
                     , x.owned_by_id
                FROM vc_rooms r
                INNER JOIN vc_room_extensions x
                  USING (vc_room_id)
                WHERE r.provider = $1
                  AND r.status <> $2
                  AND r.vc_room_id NOT IN (
                    SELECT a.vc_room_id
                    FROM vc_room_events a
                    INNER JOIN events e
                      USING (event_id)
                    WHERE e.end_dt > $3
                  )
                ORDER BY r.vc_room_id
            ",
        )
        .bind(provider)
        .bind(VcRoomStatus::Deleted.as_str())
        .bind(cutoff)
        .traced()
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(res
            .into_iter()
            .map(VcRoom::try_from)
            .collect::<Result<Vec<_>, _>>()?)
    }

    #[tracing::instrument(
        name = "db.vc_room.mark_deleted",
        skip_all,
        fields(
            db.query.text,
            vc_room.id = %room.id,
        ),
        err,
    )]
    async fn mark_deleted(
        &mut self,
        clock: &dyn Clock,
        room: VcRoom,
    ) -> Result<VcRoom, Self::Error> {
        if room.is_deleted() {
            return Ok(room);
        }

        let deleted_at = clock.now();

        let res = sqlx::query(
            r"
                UPDATE vc_rooms
                SET status = $1, deleted_at = $2
                WHERE vc_room_id = $3 AND status <> $1
            ",
        )
        .bind(VcRoomStatus::Deleted.as_str())
        .bind(deleted_at)
        .bind(Uuid::from(room.id))
        .traced()
        .execute(&mut *self.conn)
        .await?;

        DatabaseError::ensure_affected_rows(&res, 1)?;

        Ok(VcRoom {
            status: VcRoomStatus::Deleted,
            deleted_at: Some(deleted_at),
            ..room
        })
    }

    #[tracing::instrument(
        name = "db.vc_room.count",
        skip_all,
        fields(
            db.query.text,
        ),
        err,
    )]
    async fn count(&mut self, filter: VcRoomFilter<'_>) -> Result<usize, Self::Error> {
        let (sql, arguments) = Query::select()
            .expr(Expr::col((VcRooms::Table, VcRooms::VcRoomId)).count())
            .from(VcRooms::Table)
            .apply_filter(filter)
            .build_sqlx(PostgresQueryBuilder);

        let count: i64 = sqlx::query_scalar_with(&sql, arguments)
            .traced()
            .fetch_one(&mut *self.conn)
            .await?;

        count
            .try_into()
            .map_err(DatabaseError::to_invalid_operation)
    }
}

/// An implementation of [`VcRoomEventAssociationRepository`] for a PostgreSQL
/// connection
pub struct PgVcRoomEventAssociationRepository<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> PgVcRoomEventAssociationRepository<'c> {
    /// Create a new [`PgVcRoomEventAssociationRepository`] from an active
    /// PostgreSQL connection
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl VcRoomEventAssociationRepository for PgVcRoomEventAssociationRepository<'_> {
    type Error = DatabaseError;

    #[tracing::instrument(
        name = "db.vc_room_event.add",
        skip_all,
        fields(
            db.query.text,
            vc_room.id = %room.id,
            event.id = %event.id,
        ),
        err,
    )]
    async fn add(
        &mut self,
        rng: &mut (dyn RngCore + Send),
        clock: &dyn Clock,
        room: &VcRoom,
        event: &Event,
    ) -> Result<(), Self::Error> {
        let created_at = clock.now();
        let id = Ulid::from_datetime_with_source(created_at.into(), rng);

        let res = sqlx::query(
            r"
                INSERT INTO vc_room_events (vc_room_event_id, vc_room_id, event_id, created_at)
                VALUES ($1, $2, $3, $4)
            ",
        )
        .bind(Uuid::from(id))
        .bind(Uuid::from(room.id))
        .bind(Uuid::from(event.id))
        .bind(created_at)
        .traced()
        .execute(&mut *self.conn)
        .await?;

        DatabaseError::ensure_affected_rows(&res, 1)?;

        Ok(())
    }
}
