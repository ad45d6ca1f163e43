// Copyright 2026 The VCM Authors.
//
// SPDX-License-Identifier: AGPL-3.0-only
// Please see LICENSE in the repository root for full details.

//! Repository to interact with events

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rand_core::RngCore;
use ulid::Ulid;
use vcm_data_model::{Clock, Event};

use crate::repository_impl;

/// An [`EventRepository`] helps interacting with [`Event`] saved in the
/// storage backend
#[async_trait]
pub trait EventRepository: Send + Sync {
    /// The error type returned by the repository
    type Error;

    /// Lookup an [`Event`] by its ID
    ///
    /// Returns `None` if no [`Event`] was found
    ///
    /// # Parameters
    ///
    /// * `id`: The ID of the [`Event`] to lookup
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if the underlying repository fails
    async fn lookup(&mut self, id: Ulid) -> Result<Option<Event>, Self::Error>;

    /// Create a new [`Event`]
    ///
    /// Returns the newly-created [`Event`]
    ///
    /// # Parameters
    ///
    /// * `rng`: The random number generator to use
    /// * `clock`: The clock used to generate timestamps
    /// * `title`: The title of the [`Event`]
    /// * `end_dt`: When the [`Event`] ends
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if the underlying repository fails
    async fn add(
        &mut self,
        rng: &mut (dyn RngCore + Send),
        clock: &dyn Clock,
        title: String,
        end_dt: DateTime<Utc>,
    ) -> Result<Event, Self::Error>;
}

repository_impl!(EventRepository:
    async fn lookup(&mut self, id: Ulid) -> Result<Option<Event>, Self::Error>;

    async fn add(
        &mut self,
        rng: &mut (dyn RngCore + Send),
        clock: &dyn Clock,
        title: String,
        end_dt: DateTime<Utc>,
    ) -> Result<Event, Self::Error>;
);
