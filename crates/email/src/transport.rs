// Copyright 2026 The VCM Authors.
//
// SPDX-License-Identifier: AGPL-3.0-only
// Please see LICENSE in the repository root for full details.

//! Email transport backends

use std::{ffi::OsString, num::NonZeroU16, sync::Arc, sync::Mutex};

use async_trait::async_trait;
use lettre::{
    AsyncTransport, Tokio1Executor,
    address::Envelope,
    transport::{
        sendmail::AsyncSendmailTransport,
        smtp::{AsyncSmtpTransport, authentication::Credentials},
    },
};
use thiserror::Error;

/// Encryption mode to use
#[derive(Debug, Clone, Copy)]
pub enum SmtpMode {
    /// Plain text
    Plain,
    /// `StartTLS` (starts as plain text then upgrade to TLS)
    StartTls,
    /// TLS
    Tls,
}

/// An email recorded by the in-memory transport
#[derive(Debug, Clone)]
pub struct RecordedEmail {
    /// The envelope of the email
    pub envelope: Envelope,

    /// The raw content of the email
    pub content: Vec<u8>,
}

/// A wrapper around many [`AsyncTransport`]s
#[derive(Default, Clone)]
pub struct Transport {
    inner: Arc<TransportInner>,
}

#[derive(Default)]
enum TransportInner {
    #[default]
    Blackhole,
    Smtp(AsyncSmtpTransport<Tokio1Executor>),
    Sendmail(AsyncSendmailTransport<Tokio1Executor>),
    Recorder(Mutex<RecorderState>),
}

#[derive(Default)]
struct RecorderState {
    emails: Vec<RecordedEmail>,
    fail: bool,
}

impl Transport {
    fn new(inner: TransportInner) -> Self {
        let inner = Arc::new(inner);
        Self { inner }
    }

    /// Construct a blackhole transport
    #[must_use]
    pub fn blackhole() -> Self {
        Self::new(TransportInner::Blackhole)
    }

    /// Construct a SMTP transport
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying SMTP transport could not be built
    pub fn smtp(
        mode: SmtpMode,
        hostname: &str,
        port: Option<NonZeroU16>,
        credentials: Option<Credentials>,
    ) -> Result<Self, lettre::transport::smtp::Error> {
        let mut t = match mode {
            SmtpMode::Plain => AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(hostname),
            SmtpMode::StartTls => AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(hostname)?,
            SmtpMode::Tls => AsyncSmtpTransport::<Tokio1Executor>::relay(hostname)?,
        };

        if let Some(credentials) = credentials {
            t = t.credentials(credentials);
        }

        if let Some(port) = port {
            t = t.port(port.into());
        }

        Ok(Self::new(TransportInner::Smtp(t.build())))
    }

    /// Construct a Sendmail transport
    #[must_use]
    pub fn sendmail(command: Option<impl Into<OsString>>) -> Self {
        let transport = if let Some(command) = command {
            AsyncSendmailTransport::new_with_command(command)
        } else {
            AsyncSendmailTransport::new()
        };
        Self::new(TransportInner::Sendmail(transport))
    }

    /// Construct a transport which keeps sent emails in memory, for tests
    #[must_use]
    pub fn recorder() -> Self {
        Self::new(TransportInner::Recorder(Mutex::new(RecorderState::default())))
    }

    /// Get the emails recorded so far. Empty unless the transport was built
    /// with [`Transport::recorder`].
    #[must_use]
    pub fn recorded(&self) -> Vec<RecordedEmail> {
        match self.inner.as_ref() {
            TransportInner::Recorder(state) => state
                .lock()
                .map(|state| state.emails.clone())
                .unwrap_or_default(),
            _ => Vec::new(),
        }
    }

    /// Make every subsequent send fail. Only effective when the transport was
    /// built with [`Transport::recorder`].
    pub fn fail_all(&self, fail: bool) {
        if let TransportInner::Recorder(state) = self.inner.as_ref() {
            if let Ok(mut state) = state.lock() {
                state.fail = fail;
            }
        }
    }
}

impl Transport {
    /// Test the connection to the underlying transport. Only works with the
    /// SMTP backend for now
    ///
    /// # Errors
    ///
    /// Will return `Err` if the connection test failed
    pub async fn test_connection(&self) -> Result<(), Error> {
        match self.inner.as_ref() {
            TransportInner::Smtp(t) => {
                t.test_connection().await?;
            }
            TransportInner::Blackhole
            | TransportInner::Sendmail(_)
            | TransportInner::Recorder(_) => {}
        }

        Ok(())
    }
}

/// Error returned when sending an email failed
#[derive(Debug, Error)]
pub enum Error {
    /// The SMTP backend failed
    #[error(transparent)]
    Smtp(#[from] lettre::transport::smtp::Error),

    /// The sendmail backend failed
    #[error(transparent)]
    Sendmail(#[from] lettre::transport::sendmail::Error),

    /// The recorder transport was told to reject sends
    #[error("email transport is set to reject all emails")]
    Rejected,
}

#[async_trait]
impl AsyncTransport for Transport {
    type Ok = ();
    type Error = Error;

    async fn send_raw(&self, envelope: &Envelope, email: &[u8]) -> Result<Self::Ok, Self::Error> {
        match self.inner.as_ref() {
            TransportInner::Blackhole => {
                tracing::warn!(
                    "An email was supposed to be sent but no email backend is configured"
                );
            }
            TransportInner::Smtp(t) => {
                t.send_raw(envelope, email).await?;
            }
            TransportInner::Sendmail(t) => {
                t.send_raw(envelope, email).await?;
            }
            TransportInner::Recorder(state) => {
                if let Ok(mut state) = state.lock() {
                    if state.fail {
                        return Err(Error::Rejected);
                    }

                    state.emails.push(RecordedEmail {
                        envelope: envelope.clone(),
                        content: email.to_vec(),
                    });
                }
            }
        }

        Ok(())
    }
}
