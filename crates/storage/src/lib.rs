// Copyright 2026 The VCM Authors.
//
// SPDX-License-Identifier: AGPL-3.0-only
// Please see LICENSE in the repository root for full details.

//! Interactions with the storage backend
//!
//! This crate provides a set of traits that can be implemented to interact with
//! the storage backend. Those traits are called repositories and are grouped by
//! the type of data they manage.
//!
//! Each of those repositories can be accessed via the [`RepositoryAccess`]
//! trait. This trait can be wrapped in a [`BoxRepository`] to allow using it
//! without caring about the underlying storage backend, and without carrying
//! around the generic type parameter.
//!
//! Repositories are transactional: changes made through a repository are only
//! visible to others once [`RepositoryTransaction::save`] is called, and are
//! discarded by [`RepositoryTransaction::cancel`]. New repositories are opened
//! through a [`RepositoryFactory`].
//!
//! # Defining a new repository
//!
//! To define a new repository, you have to:
//!   1. Define a new (async) repository trait, with the methods you need
//!   2. Write an implementation of this trait for each storage backend you want
//!      (currently only for [`vcm-storage-pg`])
//!   3. Make it accessible via the [`RepositoryAccess`] trait
//!
//! All repository methods use `&mut self`, take a [`Clock`] when they record
//! timestamps and a random number generator when they mint new IDs, and return
//! a `Result` with the backend-specific associated error type.
//!
//! [`Clock`]: vcm_data_model::Clock
//! [`vcm-storage-pg`]: ../vcm_storage_pg/index.html

#![deny(clippy::future_not_send, missing_docs)]
#![allow(clippy::module_name_repetitions)]

pub(crate) mod repository;
mod utils;

pub mod event;
pub mod user;
pub mod vc_room;

pub use self::{
    event::EventRepository,
    repository::{
        BoxRepository, BoxRepositoryFactory, Repository, RepositoryAccess, RepositoryError,
        RepositoryFactory, RepositoryTransaction,
    },
    user::UserRepository,
    utils::MapErr,
    vc_room::{VcRoomEventAssociationRepository, VcRoomFilter, VcRoomRepository},
};
