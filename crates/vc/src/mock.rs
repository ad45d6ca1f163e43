// Copyright 2026 The VCM Authors.
//
// SPDX-License-Identifier: AGPL-3.0-only
// Please see LICENSE in the repository root for full details.

//! A mock implementation of the [`VcProviderConnection`] trait, which never
//! talks to a real provider

use std::{collections::HashSet, sync::Arc};

use tokio::sync::Mutex;
use vcm_data_model::{User, VcRoom};

use crate::DeleteRoomError;

#[derive(Default)]
struct MockState {
    rooms: HashSet<String>,
    fail_all: bool,
    delete_calls: Vec<String>,
}

/// A mock connection which keeps the set of remote rooms in memory
#[derive(Clone)]
pub struct VcProviderConnection {
    provider: String,
    state: Arc<Mutex<MockState>>,
}

impl VcProviderConnection {
    /// Create a new mock connection for the given provider tag
    #[must_use]
    pub fn new(provider: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            state: Arc::new(Mutex::new(MockState::default())),
        }
    }

    /// Pretend the given room handle exists on the provider
    pub async fn add_room(&self, extension: impl Into<String>) {
        let mut state = self.state.lock().await;
        state.rooms.insert(extension.into());
    }

    /// Make every subsequent deletion fail with a generic error
    pub async fn fail_all(&self, fail: bool) {
        let mut state = self.state.lock().await;
        state.fail_all = fail;
    }

    /// Get the room handles for which a deletion was attempted, in order
    pub async fn delete_calls(&self) -> Vec<String> {
        let state = self.state.lock().await;
        state.delete_calls.clone()
    }
}

#[async_trait::async_trait]
impl crate::VcProviderConnection for VcProviderConnection {
    fn provider(&self) -> &str {
        &self.provider
    }

    async fn delete_room(
        &self,
        room: &VcRoom,
        _actor: Option<&User>,
    ) -> Result<(), DeleteRoomError> {
        let mut state = self.state.lock().await;
        state.delete_calls.push(room.extension.extension.clone());

        if state.fail_all {
            return Err(DeleteRoomError::Other(anyhow::anyhow!(
                "remote API unavailable"
            )));
        }

        if state.rooms.remove(&room.extension.extension) {
            Ok(())
        } else {
            Err(DeleteRoomError::NotFound)
        }
    }
}
