// Copyright 2026 The VCM Authors.
//
// SPDX-License-Identifier: AGPL-3.0-only
// Please see LICENSE in the repository root for full details.

use std::num::NonZeroU16;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::ConfigurationSection;

fn default_email() -> String {
    r#""Video Conference Rooms" <root@localhost>"#.to_owned()
}

/// What backend should be used when sending emails
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EmailTransportKind {
    /// Don't send emails anywhere
    #[default]
    Blackhole,

    /// Send emails via an SMTP relay
    Smtp,

    /// Send emails by calling a local sendmail binary
    Sendmail,
}

/// Encryption mode used when connecting to the SMTP server
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EmailSmtpMode {
    /// Plain text
    Plain,

    /// `StartTLS`
    StartTls,

    /// TLS
    Tls,
}

/// Configuration related to sending emails
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct EmailConfig {
    /// The `From` mailbox used in outgoing emails
    #[serde(default = "default_email")]
    pub from: String,

    /// The `Reply-To` mailbox used in outgoing emails
    #[serde(default = "default_email")]
    pub reply_to: String,

    /// What backend to use when sending emails
    #[serde(default)]
    pub transport: EmailTransportKind,

    /// Encryption mode for the SMTP connection. Only relevant for the `smtp`
    /// transport.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<EmailSmtpMode>,

    /// Hostname of the SMTP server. Only relevant for the `smtp` transport.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,

    /// Port of the SMTP server. Only relevant for the `smtp` transport,
    /// defaults to the standard port of the selected mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<NonZeroU16>,

    /// Username for the SMTP server. Only relevant for the `smtp` transport.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Password for the SMTP server. Only relevant for the `smtp` transport.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Command to call for the `sendmail` transport. Defaults to `sendmail`
    /// from the `$PATH`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            from: default_email(),
            reply_to: default_email(),
            transport: EmailTransportKind::Blackhole,
            mode: None,
            hostname: None,
            port: None,
            username: None,
            password: None,
            command: None,
        }
    }
}

impl ConfigurationSection for EmailConfig {
    const PATH: Option<&'static str> = Some("email");

    fn validate(
        &self,
        _figment: &figment::Figment,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
        match self.transport {
            EmailTransportKind::Blackhole => {}

            EmailTransportKind::Smtp => {
                if self.hostname.is_none() {
                    return Err("The `smtp` transport requires a `hostname`".into());
                }

                if self.mode.is_none() {
                    return Err("The `smtp` transport requires a `mode`".into());
                }

                if self.username.is_some() != self.password.is_some() {
                    return Err(
                        "The `username` and `password` fields must be set together".into(),
                    );
                }

                if self.command.is_some() {
                    return Err("The `command` field is only valid for the `sendmail` transport"
                        .into());
                }
            }

            EmailTransportKind::Sendmail => {
                if self.hostname.is_some()
                    || self.mode.is_some()
                    || self.port.is_some()
                    || self.username.is_some()
                    || self.password.is_some()
                {
                    return Err(
                        "SMTP fields are not valid for the `sendmail` transport".into()
                    );
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use figment::{
        Figment, Jail,
        providers::{Format, Yaml},
    };

    use super::*;
    use crate::ConfigurationSection;

    #[test]
    fn load_config() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.yaml",
                r"
                    email:
                      from: 'Notifier <notifier@example.com>'
                      transport: smtp
                      mode: start_tls
                      hostname: mail.example.com
                      username: user
                      password: hunter2
                ",
            )?;

            let figment = Figment::new().merge(Yaml::file("config.yaml"));
            let config = EmailConfig::extract(&figment).map_err(|e| e.to_string())?;

            assert_eq!(config.transport, EmailTransportKind::Smtp);
            assert_eq!(config.mode, Some(EmailSmtpMode::StartTls));
            assert_eq!(config.hostname.as_deref(), Some("mail.example.com"));

            Ok(())
        });
    }

    #[test]
    fn smtp_requires_hostname() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.yaml",
                r"
                    email:
                      transport: smtp
                      mode: plain
                ",
            )?;

            let figment = Figment::new().merge(Yaml::file("config.yaml"));
            let res = EmailConfig::extract(&figment);
            assert!(res.is_err());

            Ok(())
        });
    }
}
