// Copyright 2026 The VCM Authors.
//
// SPDX-License-Identifier: AGPL-3.0-only
// Please see LICENSE in the repository root for full details.

//! An implementation of the [`VcProviderConnection`] trait for the Vidyo
//! management API

use anyhow::Context as _;
use url::Url;
use vcm_data_model::{PROVIDER_VIDYO, User, VcRoom};
use vcm_vc::{DeleteRoomError, VcProviderConnection};

mod error;

use self::error::VidyoResponseExt as _;

/// A connection to the Vidyo management API
#[derive(Clone)]
pub struct VidyoConnection {
    endpoint: Url,
    secret: String,
    http_client: reqwest::Client,
}

impl VidyoConnection {
    /// Create a new connection to the Vidyo API at the given endpoint,
    /// authenticating with the given secret
    #[must_use]
    pub fn new(endpoint: Url, secret: String, http_client: reqwest::Client) -> Self {
        Self {
            endpoint,
            secret,
            http_client,
        }
    }

    fn delete(&self, url: &str) -> reqwest::RequestBuilder {
        self.http_client
            .request(
                reqwest::Method::DELETE,
                self.endpoint
                    .join(url)
                    .map(String::from)
                    .unwrap_or_default(),
            )
            .bearer_auth(&self.secret)
    }
}

#[async_trait::async_trait]
impl VcProviderConnection for VidyoConnection {
    fn provider(&self) -> &str {
        PROVIDER_VIDYO
    }

    #[tracing::instrument(
        name = "vidyo.delete_room",
        skip_all,
        fields(
            vc_room.id = %room.id,
            vc_room.extension = room.extension.extension,
        ),
        err(Debug),
    )]
    async fn delete_room(
        &self,
        room: &VcRoom,
        actor: Option<&User>,
    ) -> Result<(), DeleteRoomError> {
        let encoded_extension = urlencoding::encode(&room.extension.extension);
        let url = format!("api/rooms/{encoded_extension}");

        let mut builder = self.delete(&url);
        if let Some(actor) = actor {
            builder = builder.query(&[("actor", actor.username.as_str())]);
        }

        let response = builder
            .send()
            .await
            .context("Failed to delete room on the Vidyo API")?;

        match response.error_for_vidyo_error().await {
            Ok(_response) => Ok(()),
            Err(e) if e.is_room_not_found() => Err(DeleteRoomError::NotFound),
            Err(e) => Err(anyhow::Error::new(e)
                .context("Unexpected HTTP response while deleting room on the Vidyo API")
                .into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use ulid::Ulid;
    use vcm_data_model::{VcRoomExtension, VcRoomStatus};
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path},
    };

    use super::*;

    fn sample_room(extension: &str) -> VcRoom {
        VcRoom {
            id: Ulid::nil(),
            name: "weekly sync".to_owned(),
            provider: PROVIDER_VIDYO.to_owned(),
            status: VcRoomStatus::Created,
            created_at: Utc::now(),
            deleted_at: None,
            extension: VcRoomExtension {
                extension: extension.to_owned(),
                owned_by_id: Ulid::nil(),
            },
        }
    }

    async fn connection(server: &MockServer) -> VidyoConnection {
        let endpoint = Url::parse(&server.uri()).unwrap();
        VidyoConnection::new(endpoint, "secret".to_owned(), reqwest::Client::new())
    }

    #[tokio::test]
    async fn test_delete_room_ok() {
        let server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path("/api/rooms/12345"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let conn = connection(&server).await;
        let res = conn.delete_room(&sample_room("12345"), None).await;
        assert!(res.is_ok());
    }

    #[tokio::test]
    async fn test_delete_room_not_found_errcode() {
        let server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path("/api/rooms/12345"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "errcode": "ERR_ROOM_NOT_FOUND",
                "error": "No such room",
            })))
            .expect(1)
            .mount(&server)
            .await;

        let conn = connection(&server).await;
        let res = conn.delete_room(&sample_room("12345"), None).await;
        assert!(matches!(res, Err(DeleteRoomError::NotFound)));
    }

    #[tokio::test]
    async fn test_delete_room_not_found_without_body() {
        let server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path("/api/rooms/12345"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let conn = connection(&server).await;
        let res = conn.delete_room(&sample_room("12345"), None).await;
        assert!(matches!(res, Err(DeleteRoomError::NotFound)));
    }

    #[tokio::test]
    async fn test_delete_room_server_error() {
        let server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path("/api/rooms/12345"))
            .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
                "errcode": "ERR_INTERNAL",
                "error": "Something went wrong",
            })))
            .expect(1)
            .mount(&server)
            .await;

        let conn = connection(&server).await;
        let res = conn.delete_room(&sample_room("12345"), None).await;
        assert!(matches!(res, Err(DeleteRoomError::Other(_))));
    }
}
