// Copyright 2026 The VCM Authors.
//
// SPDX-License-Identifier: AGPL-3.0-only
// Please see LICENSE in the repository root for full details.

use async_trait::async_trait;
use futures_util::{FutureExt, TryFutureExt, future::BoxFuture};

use crate::{
    MapErr,
    event::EventRepository,
    user::UserRepository,
    vc_room::{VcRoomEventAssociationRepository, VcRoomRepository},
};

/// The error type returned by the [`BoxRepository`], which hides the
/// backend-specific error type
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct RepositoryError {
    source: Box<dyn std::error::Error + Send + Sync + 'static>,
}

impl RepositoryError {
    /// Construct a [`RepositoryError`] out of any error
    pub fn from_error<E>(value: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self {
            source: Box::new(value),
        }
    }
}

/// A factory which can create new repositories, usually backed by a
/// connection pool
#[async_trait]
pub trait RepositoryFactory: Send + Sync {
    /// Create a new repository, starting a new transaction
    ///
    /// # Errors
    ///
    /// Returns a [`RepositoryError`] if a connection could not be acquired or
    /// the transaction could not be started
    async fn create(&self) -> Result<BoxRepository, RepositoryError>;
}

/// A type-erased [`RepositoryFactory`]
pub type BoxRepositoryFactory = Box<dyn RepositoryFactory + Send + Sync + 'static>;

/// A [`Repository`] is a [`RepositoryAccess`] tied to a transaction, which
/// can be saved or cancelled as a whole
pub trait Repository<E>:
    RepositoryAccess<Error = E> + RepositoryTransaction<Error = E> + Send
{
}

/// A type-erased [`Repository`]
pub type BoxRepository = Box<dyn Repository<RepositoryError> + Send>;

/// Operations on the transaction backing a repository
pub trait RepositoryTransaction {
    /// The error type used by [`Self::save`] and [`Self::cancel`]
    type Error;

    /// Commit the transaction, making all changes done through the
    /// repository permanent
    fn save(self: Box<Self>) -> BoxFuture<'static, Result<(), Self::Error>>;

    /// Roll back the transaction, discarding all changes done through the
    /// repository
    fn cancel(self: Box<Self>) -> BoxFuture<'static, Result<(), Self::Error>>;
}

/// Access the various repositories the backend implements.
pub trait RepositoryAccess: Send {
    /// The backend-specific error type used by each repository.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Get an [`UserRepository`]
    fn user<'c>(&'c mut self) -> Box<dyn UserRepository<Error = Self::Error> + 'c>;

    /// Get an [`EventRepository`]
    fn event<'c>(&'c mut self) -> Box<dyn EventRepository<Error = Self::Error> + 'c>;

    /// Get a [`VcRoomRepository`]
    fn vc_room<'c>(&'c mut self) -> Box<dyn VcRoomRepository<Error = Self::Error> + 'c>;

    /// Get a [`VcRoomEventAssociationRepository`]
    fn vc_room_event<'c>(
        &'c mut self,
    ) -> Box<dyn VcRoomEventAssociationRepository<Error = Self::Error> + 'c>;
}

// Implementations of the RepositoryAccess, RepositoryTransaction and
// Repository traits for the MapErr wrapper

impl<R, F, E> RepositoryAccess for MapErr<R, F>
where
    R: RepositoryAccess,
    F: FnMut(R::Error) -> E + Clone + Send + Sync + 'static,
    E: std::error::Error + Send + Sync + 'static,
{
    type Error = E;

    fn user<'c>(&'c mut self) -> Box<dyn UserRepository<Error = Self::Error> + 'c> {
        Box::new(MapErr::new(self.inner.user(), self.mapper.clone()))
    }

    fn event<'c>(&'c mut self) -> Box<dyn EventRepository<Error = Self::Error> + 'c> {
        Box::new(MapErr::new(self.inner.event(), self.mapper.clone()))
    }

    fn vc_room<'c>(&'c mut self) -> Box<dyn VcRoomRepository<Error = Self::Error> + 'c> {
        Box::new(MapErr::new(self.inner.vc_room(), self.mapper.clone()))
    }

    fn vc_room_event<'c>(
        &'c mut self,
    ) -> Box<dyn VcRoomEventAssociationRepository<Error = Self::Error> + 'c> {
        Box::new(MapErr::new(self.inner.vc_room_event(), self.mapper.clone()))
    }
}

impl<R, F, E> RepositoryTransaction for MapErr<R, F>
where
    R: RepositoryTransaction,
    R::Error: 'static,
    F: FnMut(R::Error) -> E + Send + Sync + 'static,
    E: 'static,
{
    type Error = E;

    fn save(self: Box<Self>) -> BoxFuture<'static, Result<(), Self::Error>> {
        let this = *self;
        let mut mapper = this.mapper;
        Box::new(this.inner)
            .save()
            .map_err(move |e| mapper(e))
            .boxed()
    }

    fn cancel(self: Box<Self>) -> BoxFuture<'static, Result<(), Self::Error>> {
        let this = *self;
        let mut mapper = this.mapper;
        Box::new(this.inner)
            .cancel()
            .map_err(move |e| mapper(e))
            .boxed()
    }
}

impl<R, F, E> Repository<E> for MapErr<R, F>
where
    R: RepositoryAccess + RepositoryTransaction<Error = <R as RepositoryAccess>::Error> + Send,
    F: FnMut(<R as RepositoryAccess>::Error) -> E + Clone + Send + Sync + 'static,
    E: std::error::Error + Send + Sync + 'static,
{
}
