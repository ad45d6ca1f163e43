// Copyright 2026 The VCM Authors.
//
// SPDX-License-Identifier: AGPL-3.0-only
// Please see LICENSE in the repository root for full details.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use ulid::Ulid;

/// The provider tag for Vidyo-backed rooms
pub const PROVIDER_VIDYO: &str = "vidyo";

/// Lifecycle status of a video-conference room
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VcRoomStatus {
    Created,
    Deleted,
}

/// Error when parsing an unknown room status from the database
#[derive(Debug, Error)]
#[error("invalid video-conference room status")]
pub struct InvalidVcRoomStatusError;

impl VcRoomStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Deleted => "deleted",
        }
    }

    #[must_use]
    pub fn is_deleted(self) -> bool {
        matches!(self, Self::Deleted)
    }
}

impl std::str::FromStr for VcRoomStatus {
    type Err = InvalidVcRoomStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created" => Ok(Self::Created),
            "deleted" => Ok(Self::Deleted),
            _ => Err(InvalidVcRoomStatusError),
        }
    }
}

/// Provider-specific part of a room record: the vendor-side handle and the
/// owning user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VcRoomExtension {
    /// The room handle on the vendor side, used to address it on the remote
    /// API
    pub extension: String,

    /// The user owning the room, notified when the room is reaped
    pub owned_by_id: Ulid,
}

/// A video-conference room
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VcRoom {
    pub id: Ulid,
    pub name: String,

    /// Which provider hosts the room. Only [`PROVIDER_VIDYO`] rooms are
    /// considered by the stale-room cleanup.
    pub provider: String,

    pub status: VcRoomStatus,
    pub created_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,

    pub extension: VcRoomExtension,
}

impl VcRoom {
    #[must_use]
    pub fn is_deleted(&self) -> bool {
        self.status.is_deleted()
    }
}
