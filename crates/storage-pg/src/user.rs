// Copyright 2026 The VCM Authors.
//
// SPDX-License-Identifier: AGPL-3.0-only
// Please see LICENSE in the repository root for full details.

//! A module containing the PostgreSQL implementation of the user repository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rand::RngCore;
use sqlx::PgConnection;
use ulid::Ulid;
use uuid::Uuid;
use vcm_data_model::{Clock, User};
use vcm_storage::UserRepository;

use crate::{DatabaseError, tracing::ExecuteExt};

/// An implementation of [`UserRepository`] for a PostgreSQL connection
pub struct PgUserRepository<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> PgUserRepository<'c> {
    /// Create a new [`PgUserRepository`] from an active PostgreSQL connection
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct UserLookup {
    user_id: Uuid,
    username: String,
    email: String,
    created_at: DateTime<Utc>,
}

impl From<UserLookup> for User {
    fn from(value: UserLookup) -> Self {
        Self {
            id: value.user_id.into(),
            username: value.username,
            email: value.email,
            created_at: value.created_at,
        }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository<'_> {
    type Error = DatabaseError;

    #[tracing::instrument(
        name = "db.user.lookup",
        skip_all,
        fields(
            db.query.text,
            user.id = %id,
        ),
        err,
    )]
    async fn lookup(&mut self, id: Ulid) -> Result<Option<User>, Self::Error> {
        let res = sqlx::query_as::<_, UserLookup>(
            r"
                SELECT user_id
                     , username
                     , email
                     , created_at
                FROM users
                WHERE user_id = $1
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
        name = "db.user.add",
        skip_all,
        fields(
            db.query.text,
            user.username = username,
            user.id,
        ),
        err,
    )]
    async fn add(
        &mut self,
        rng: &mut (dyn RngCore + Send),
        clock: &dyn Clock,
        username: String,
        email: String,
    ) -> Result<User, Self::Error> {
        let created_at = clock.now();
        let id = Ulid::from_datetime_with_source(created_at.into(), rng);
        tracing::Span::current().record("user.id", tracing::field::display(id));

        let res = sqlx::query(
            r"
                INSERT INTO users (user_id, username, email, created_at)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT (username) DO NOTHING
            ",
        )
        .bind(Uuid::from(id))
        .bind(&username)
        .bind(&email)
        .bind(created_at)
        .traced()
        .execute(&mut *self.conn)
        .await?;

        // If the user already exists, we want to return an error but not poison the
        // transaction
        DatabaseError::ensure_affected_rows(&res, 1)?;

        Ok(User {
            id,
            username,
            email,
            created_at,
        })
    }
}
