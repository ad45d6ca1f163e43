// Copyright 2026 The VCM Authors.
//
// SPDX-License-Identifier: AGPL-3.0-only
// Please see LICENSE in the repository root for full details.

//! Helps sending emails to room owners, with different email backends

#![deny(missing_docs)]

mod mailer;
mod templates;
mod transport;

pub use lettre::{
    Address, message::Mailbox, transport::smtp::authentication::Credentials as SmtpCredentials,
};

pub use self::{
    mailer::{Error as MailerError, Mailer},
    templates::{RoomDeletedContext, TemplateError, Templates},
    transport::{RecordedEmail, SmtpMode, Transport as MailTransport},
};
