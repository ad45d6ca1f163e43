// Copyright 2026 The VCM Authors.
//
// SPDX-License-Identifier: AGPL-3.0-only
// Please see LICENSE in the repository root for full details.

//! Email templates, rendered with minijinja

use std::sync::Arc;

use minijinja::Environment;
use serde::Serialize;
use thiserror::Error;
use vcm_data_model::{User, VcRoom};

/// Error encountered while loading or rendering a template
#[derive(Debug, Error)]
#[error(transparent)]
pub struct TemplateError(#[from] minijinja::Error);

/// The context used to render the room-deleted notification
#[derive(Serialize)]
pub struct RoomDeletedContext<'a> {
    room: &'a VcRoom,
    user: &'a User,
}

impl<'a> RoomDeletedContext<'a> {
    /// Create a new [`RoomDeletedContext`]
    #[must_use]
    pub fn new(room: &'a VcRoom, user: &'a User) -> Self {
        Self { room, user }
    }

    /// The user the notification is addressed to
    #[must_use]
    pub fn user(&self) -> &User {
        self.user
    }

    /// The deleted room
    #[must_use]
    pub fn room(&self) -> &VcRoom {
        self.room
    }
}

/// The set of email templates, embedded in the binary
#[derive(Clone)]
pub struct Templates {
    environment: Arc<Environment<'static>>,
}

impl Templates {
    /// Load the embedded templates
    ///
    /// # Errors
    ///
    /// Returns an error if one of the templates fails to parse
    pub fn load() -> Result<Self, TemplateError> {
        let mut environment = Environment::new();
        environment.add_template(
            "emails/room_deleted.subject.txt",
            include_str!("../templates/emails/room_deleted.subject.txt"),
        )?;
        environment.add_template(
            "emails/room_deleted.txt",
            include_str!("../templates/emails/room_deleted.txt"),
        )?;
        environment.add_template(
            "emails/room_deleted.html",
            include_str!("../templates/emails/room_deleted.html"),
        )?;

        Ok(Self {
            environment: Arc::new(environment),
        })
    }

    fn render<C: Serialize>(&self, name: &str, context: &C) -> Result<String, TemplateError> {
        let template = self.environment.get_template(name)?;
        let rendered = template.render(context)?;
        Ok(rendered)
    }

    /// Render the subject of the room-deleted email
    ///
    /// # Errors
    ///
    /// Returns an error if the template failed rendering
    pub fn render_room_deleted_subject(
        &self,
        context: &RoomDeletedContext<'_>,
    ) -> Result<String, TemplateError> {
        self.render("emails/room_deleted.subject.txt", context)
    }

    /// Render the plain text part of the room-deleted email
    ///
    /// # Errors
    ///
    /// Returns an error if the template failed rendering
    pub fn render_room_deleted_txt(
        &self,
        context: &RoomDeletedContext<'_>,
    ) -> Result<String, TemplateError> {
        self.render("emails/room_deleted.txt", context)
    }

    /// Render the HTML part of the room-deleted email
    ///
    /// # Errors
    ///
    /// Returns an error if the template failed rendering
    pub fn render_room_deleted_html(
        &self,
        context: &RoomDeletedContext<'_>,
    ) -> Result<String, TemplateError> {
        self.render("emails/room_deleted.html", context)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use ulid::Ulid;
    use vcm_data_model::{PROVIDER_VIDYO, VcRoomExtension, VcRoomStatus};

    use super::*;

    #[test]
    fn test_render_room_deleted() {
        let now = Utc::now();
        let user = User {
            id: Ulid::nil(),
            username: "alice".to_owned(),
            email: "alice@example.com".to_owned(),
            created_at: now,
        };
        let room = VcRoom {
            id: Ulid::nil(),
            name: "weekly sync".to_owned(),
            provider: PROVIDER_VIDYO.to_owned(),
            status: VcRoomStatus::Created,
            created_at: now,
            deleted_at: None,
            extension: VcRoomExtension {
                extension: "12345".to_owned(),
                owned_by_id: Ulid::nil(),
            },
        };

        let templates = Templates::load().unwrap();
        let context = RoomDeletedContext::new(&room, &user);

        let subject = templates.render_room_deleted_subject(&context).unwrap();
        assert!(subject.contains("weekly sync"));

        let plain = templates.render_room_deleted_txt(&context).unwrap();
        assert!(plain.contains("alice"));
        assert!(plain.contains("weekly sync"));

        let html = templates.render_room_deleted_html(&context).unwrap();
        assert!(html.contains("<strong>weekly sync</strong>"));
    }
}
