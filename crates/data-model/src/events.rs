// Copyright 2026 The VCM Authors.
//
// SPDX-License-Identifier: AGPL-3.0-only
// Please see LICENSE in the repository root for full details.

use chrono::{DateTime, Utc};
use serde::Serialize;
use ulid::Ulid;

/// An event to which video-conference rooms can be attached
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Event {
    pub id: Ulid,
    pub title: String,

    /// When the event ends. Rooms only attached to events which ended long
    /// ago are considered stale.
    pub end_dt: DateTime<Utc>,

    pub created_at: DateTime<Utc>,
}
