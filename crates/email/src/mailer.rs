// Copyright 2026 The VCM Authors.
//
// SPDX-License-Identifier: AGPL-3.0-only
// Please see LICENSE in the repository root for full details.

//! Send emails to room owners

use lettre::{
    AsyncTransport, Message,
    message::{Mailbox, MessageBuilder, MultiPart},
};
use thiserror::Error;

use crate::{
    MailTransport,
    templates::{RoomDeletedContext, Templates},
};

/// Helps sending mails to users
#[derive(Clone)]
pub struct Mailer {
    templates: Templates,
    transport: MailTransport,
    from: Mailbox,
    reply_to: Mailbox,
}

/// Error returned when preparing or sending an email failed
#[derive(Debug, Error)]
#[error(transparent)]
pub enum Error {
    /// The transport failed
    Transport(#[from] crate::transport::Error),

    /// The email content failed rendering
    Templates(#[from] crate::templates::TemplateError),

    /// The email message could not be built
    Content(#[from] lettre::error::Error),
}

impl Mailer {
    /// Constructs a new [`Mailer`]
    #[must_use]
    pub fn new(
        templates: Templates,
        transport: MailTransport,
        from: Mailbox,
        reply_to: Mailbox,
    ) -> Self {
        Self {
            templates,
            transport,
            from,
            reply_to,
        }
    }

    fn base_message(&self) -> MessageBuilder {
        Message::builder()
            .from(self.from.clone())
            .reply_to(self.reply_to.clone())
            // By passing `None`, lettre generates a random message ID
            // with a random UUID and the hostname for us
            .message_id(None)
    }

    fn prepare_room_deleted_email(
        &self,
        to: Mailbox,
        context: &RoomDeletedContext<'_>,
    ) -> Result<Message, Error> {
        let plain = self.templates.render_room_deleted_txt(context)?;

        let html = self.templates.render_room_deleted_html(context)?;

        let multipart = MultiPart::alternative_plain_html(plain, html);

        let subject = self.templates.render_room_deleted_subject(context)?;

        let message = self
            .base_message()
            .subject(subject.trim())
            .to(to)
            .multipart(multipart)?;

        Ok(message)
    }

    /// Notify a room owner that their room has been deleted
    ///
    /// # Errors
    ///
    /// Will return `Err` if the email failed rendering or failed sending
    #[tracing::instrument(
        name = "email.room_deleted.send",
        skip_all,
        fields(
            email.to = %to,
            user.id = %context.user().id,
            vc_room.id = %context.room().id,
        ),
    )]
    pub async fn send_room_deleted_email(
        &self,
        to: Mailbox,
        context: &RoomDeletedContext<'_>,
    ) -> Result<(), Error> {
        let message = self.prepare_room_deleted_email(to, context)?;
        self.transport.send(message).await?;
        Ok(())
    }

    /// Test the connection to the mail server
    ///
    /// # Errors
    ///
    /// Returns an error if the connection failed
    #[tracing::instrument(name = "email.test_connection", skip_all)]
    pub async fn test_connection(&self) -> Result<(), crate::transport::Error> {
        self.transport.test_connection().await
    }
}
