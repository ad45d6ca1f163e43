// Copyright 2026 The VCM Authors.
//
// SPDX-License-Identifier: AGPL-3.0-only
// Please see LICENSE in the repository root for full details.

//! An implementation of the storage traits for a PostgreSQL database
//!
//! This crate implements the repository traits defined in [`vcm-storage`] on
//! top of a PostgreSQL database, using [`sqlx`]. Each repository lives in its
//! own module, and they are all tied together by the [`PgRepository`]
//! structure, backed by a database transaction.
//!
//! [`vcm-storage`]: ../vcm_storage/index.html

#![deny(clippy::future_not_send, missing_docs)]
#![allow(clippy::module_name_repetitions)]

use sqlx::migrate::Migrator;

pub mod errors;
pub(crate) mod filter;
pub(crate) mod iden;
pub(crate) mod repository;
pub(crate) mod tracing;

pub mod event;
pub mod user;
pub mod vc_room;

pub use self::{
    errors::DatabaseError,
    repository::{PgRepository, PgRepositoryFactory},
};

/// Embedded migrations, allowing them to run on startup
pub static MIGRATOR: Migrator = sqlx::migrate!();
