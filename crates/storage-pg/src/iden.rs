// Copyright 2026 The VCM Authors.
//
// SPDX-License-Identifier: AGPL-3.0-only
// Please see LICENSE in the repository root for full details.

//! Table and column identifiers used by [`sea_query`]

#[derive(sea_query::Iden)]
pub enum VcRooms {
    Table,
    VcRoomId,
    Name,
    Provider,
    Status,
    CreatedAt,
    DeletedAt,
}
