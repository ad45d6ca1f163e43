// Copyright 2026 The VCM Authors.
//
// SPDX-License-Identifier: AGPL-3.0-only
// Please see LICENSE in the repository root for full details.

//! Abstraction over the video-conference provider API
//!
//! Remote operations on vendor-hosted rooms go through the
//! [`VcProviderConnection`] trait, so that the actual vendor client can be
//! swapped out, notably for a mock one in tests.

mod mock;

use std::sync::Arc;

use vcm_data_model::{User, VcRoom};

pub use self::mock::VcProviderConnection as MockVcProviderConnection;

/// Error returned when deleting a room on the provider fails
#[derive(Debug, thiserror::Error)]
pub enum DeleteRoomError {
    /// The room does not exist on the provider. Callers usually treat this as
    /// a success, since the desired end state is reached.
    #[error("room does not exist on the video-conference provider")]
    NotFound,

    /// Any other failure reported by the provider
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// A connection to the remote API of a video-conference provider
#[async_trait::async_trait]
pub trait VcProviderConnection: Send + Sync {
    /// Get the provider tag this connection serves, e.g. `vidyo`.
    fn provider(&self) -> &str;

    /// Delete a room on the provider.
    ///
    /// # Parameters
    ///
    /// * `room` - The room to delete.
    /// * `actor` - The user on whose behalf the deletion happens, if any.
    ///   Scheduled deletions pass `None`.
    ///
    /// # Errors
    ///
    /// Returns [`DeleteRoomError::NotFound`] if the room is already gone on
    /// the provider side, and [`DeleteRoomError::Other`] for any other
    /// failure.
    async fn delete_room(&self, room: &VcRoom, actor: Option<&User>)
    -> Result<(), DeleteRoomError>;
}

#[async_trait::async_trait]
impl<T: VcProviderConnection + Send + Sync + ?Sized> VcProviderConnection for &T {
    fn provider(&self) -> &str {
        (**self).provider()
    }

    async fn delete_room(
        &self,
        room: &VcRoom,
        actor: Option<&User>,
    ) -> Result<(), DeleteRoomError> {
        (**self).delete_room(room, actor).await
    }
}

#[async_trait::async_trait]
impl<T: VcProviderConnection + Send + Sync + ?Sized> VcProviderConnection for Arc<T> {
    fn provider(&self) -> &str {
        (**self).provider()
    }

    async fn delete_room(
        &self,
        room: &VcRoom,
        actor: Option<&User>,
    ) -> Result<(), DeleteRoomError> {
        (**self).delete_room(room, actor).await
    }
}
