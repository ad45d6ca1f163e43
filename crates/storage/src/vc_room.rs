// Copyright 2026 The VCM Authors.
//
// SPDX-License-Identifier: AGPL-3.0-only
// Please see LICENSE in the repository root for full details.

//! Repositories to interact with video-conference rooms and their event
//! associations

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rand_core::RngCore;
use ulid::Ulid;
use vcm_data_model::{Clock, Event, User, VcRoom, VcRoomStatus};

use crate::repository_impl;

/// Filter parameters for counting video-conference rooms
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct VcRoomFilter<'a> {
    status: Option<VcRoomStatus>,
    provider: Option<&'a str>,
}

impl<'a> VcRoomFilter<'a> {
    /// Create a new [`VcRoomFilter`] with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter for rooms with the given status
    #[must_use]
    pub fn with_status(mut self, status: VcRoomStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Filter for rooms hosted by the given provider
    #[must_use]
    pub fn for_provider(mut self, provider: &'a str) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Get the status filter
    #[must_use]
    pub fn status(&self) -> Option<VcRoomStatus> {
        self.status
    }

    /// Get the provider filter
    #[must_use]
    pub fn provider(&self) -> Option<&'a str> {
        self.provider
    }
}

/// A [`VcRoomRepository`] helps interacting with [`VcRoom`] saved in the
/// storage backend
#[async_trait]
pub trait VcRoomRepository: Send + Sync {
    /// The error type returned by the repository
    type Error;

    /// Lookup a [`VcRoom`] by its ID
    ///
    /// Returns `None` if no [`VcRoom`] was found
    ///
    /// # Parameters
    ///
    /// * `id`: The ID of the [`VcRoom`] to lookup
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if the underlying repository fails
    async fn lookup(&mut self, id: Ulid) -> Result<Option<VcRoom>, Self::Error>;

    /// Create a new [`VcRoom`] owned by the given [`User`]
    ///
    /// Returns the newly-created [`VcRoom`]
    ///
    /// # Parameters
    ///
    /// * `rng`: The random number generator to use
    /// * `clock`: The clock used to generate timestamps
    /// * `name`: The display name of the room
    /// * `provider`: The provider hosting the room
    /// * `extension`: The vendor-side room handle
    /// * `owner`: The [`User`] owning the room
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if the underlying repository fails
    async fn add(
        &mut self,
        rng: &mut (dyn RngCore + Send),
        clock: &dyn Clock,
        name: String,
        provider: String,
        extension: String,
        owner: &User,
    ) -> Result<VcRoom, Self::Error>;

    /// Find the stale rooms of the given provider
    ///
    /// A room is stale if it is not deleted and is not associated with any
    /// event ending strictly after the cutoff. Results are in a stable ID
    /// order.
    ///
    /// # Parameters
    ///
    /// * `provider`: The provider whose rooms are considered
    /// * `cutoff`: Events ending strictly after this instant protect their
    ///   rooms
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if the underlying repository fails
    async fn find_stale(
        &mut self,
        provider: &str,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<VcRoom>, Self::Error>;

    /// Mark a [`VcRoom`] as deleted
    ///
    /// Returns the updated [`VcRoom`]. Does nothing if the room is already
    /// deleted.
    ///
    /// # Parameters
    ///
    /// * `clock`: The clock used to record the deletion time
    /// * `room`: The [`VcRoom`] to mark as deleted
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if the underlying repository fails
    async fn mark_deleted(&mut self, clock: &dyn Clock, room: VcRoom)
    -> Result<VcRoom, Self::Error>;

    /// Count the [`VcRoom`] matching the given filter
    ///
    /// # Parameters
    ///
    /// * `filter`: The filter to apply
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if the underlying repository fails
    async fn count(&mut self, filter: VcRoomFilter<'_>) -> Result<usize, Self::Error>;
}

repository_impl!(VcRoomRepository:
    async fn lookup(&mut self, id: Ulid) -> Result<Option<VcRoom>, Self::Error>;

    async fn add(
        &mut self,
        rng: &mut (dyn RngCore + Send),
        clock: &dyn Clock,
        name: String,
        provider: String,
        extension: String,
        owner: &User,
    ) -> Result<VcRoom, Self::Error>;

    async fn find_stale(
        &mut self,
        provider: &str,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<VcRoom>, Self::Error>;

    async fn mark_deleted(
        &mut self,
        clock: &dyn Clock,
        room: VcRoom,
    ) -> Result<VcRoom, Self::Error>;

    async fn count(&mut self, filter: VcRoomFilter<'_>) -> Result<usize, Self::Error>;
);

/// A [`VcRoomEventAssociationRepository`] tracks which rooms are attached to
/// which events
#[async_trait]
pub trait VcRoomEventAssociationRepository: Send + Sync {
    /// The error type returned by the repository
    type Error;

    /// Associate a [`VcRoom`] with an [`Event`]
    ///
    /// # Parameters
    ///
    /// * `rng`: The random number generator to use
    /// * `clock`: The clock used to generate timestamps
    /// * `room`: The [`VcRoom`] to associate
    /// * `event`: The [`Event`] to associate the room with
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if the underlying repository fails
    async fn add(
        &mut self,
        rng: &mut (dyn RngCore + Send),
        clock: &dyn Clock,
        room: &VcRoom,
        event: &Event,
    ) -> Result<(), Self::Error>;
}

repository_impl!(VcRoomEventAssociationRepository:
    async fn add(
        &mut self,
        rng: &mut (dyn RngCore + Send),
        clock: &dyn Clock,
        room: &VcRoom,
        event: &Event,
    ) -> Result<(), Self::Error>;
);
