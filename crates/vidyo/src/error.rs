// Copyright 2026 The VCM Authors.
//
// SPDX-License-Identifier: AGPL-3.0-only
// Please see LICENSE in the repository root for full details.

use std::fmt::Display;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

/// Returned by the Vidyo API when the addressed room does not exist.
pub(crate) const ERR_ROOM_NOT_FOUND: &str = "ERR_ROOM_NOT_FOUND";

/// An error body returned by the Vidyo management API
#[derive(Debug, Deserialize)]
struct VidyoApiError {
    errcode: String,
    error: String,
}

/// Represents an error received from the Vidyo API.
/// Where possible, we capture the structured error from the JSON response
/// body.
#[derive(Debug, Error)]
pub(crate) struct Error {
    api_error: Option<VidyoApiError>,

    #[source]
    source: reqwest::Error,
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(api_error) = &self.api_error {
            write!(f, "{}: {}", api_error.errcode, api_error.error)
        } else {
            write!(f, "(no specific error)")
        }
    }
}

impl Error {
    /// Return the error code (`errcode`)
    pub fn errcode(&self) -> Option<&str> {
        let api_error = self.api_error.as_ref()?;
        Some(&api_error.errcode)
    }

    /// Whether the error means the addressed room does not exist on the
    /// Vidyo side
    pub fn is_room_not_found(&self) -> bool {
        if self.errcode() == Some(ERR_ROOM_NOT_FOUND) {
            return true;
        }

        self.source.status() == Some(reqwest::StatusCode::NOT_FOUND)
    }
}

/// An extension trait for [`reqwest::Response`] to help working with errors
/// from the Vidyo API.
#[async_trait]
pub(crate) trait VidyoResponseExt: Sized {
    async fn error_for_vidyo_error(self) -> Result<Self, Error>;
}

#[async_trait]
impl VidyoResponseExt for reqwest::Response {
    async fn error_for_vidyo_error(self) -> Result<Self, Error> {
        match self.error_for_status_ref() {
            Ok(_response) => Ok(self),
            Err(source) => {
                let api_error = self.json().await.ok();
                Err(Error { api_error, source })
            }
        }
    }
}
