// Copyright 2026 The VCM Authors.
//
// SPDX-License-Identifier: AGPL-3.0-only
// Please see LICENSE in the repository root for full details.

#![allow(clippy::module_name_repetitions)]

pub(crate) mod clock;
pub(crate) mod events;
pub(crate) mod rooms;
pub(crate) mod users;

pub use ulid::Ulid;

pub use self::{
    clock::{Clock, MockClock, SystemClock},
    events::Event,
    rooms::{PROVIDER_VIDYO, VcRoom, VcRoomExtension, VcRoomStatus},
    users::User,
};
