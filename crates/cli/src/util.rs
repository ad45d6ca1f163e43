// Copyright 2026 The VCM Authors.
//
// SPDX-License-Identifier: AGPL-3.0-only
// Please see LICENSE in the repository root for full details.

use std::time::Duration;

use anyhow::Context;
use sqlx::{
    ConnectOptions, PgConnection, PgPool,
    postgres::{PgConnectOptions, PgPoolOptions},
};
use tracing::Instrument;
use vcm_config::{DatabaseConfig, EmailConfig, EmailSmtpMode, EmailTransportKind, VidyoConfig};
use vcm_email::{MailTransport, Mailer, SmtpCredentials, SmtpMode, Templates};
use vcm_vidyo::VidyoConnection;

pub fn mailer_from_config(
    config: &EmailConfig,
    templates: &Templates,
) -> Result<Mailer, anyhow::Error> {
    let from = config
        .from
        .parse()
        .context("invalid email configuration: invalid 'from' address")?;
    let reply_to = config
        .reply_to
        .parse()
        .context("invalid email configuration: invalid 'reply_to' address")?;

    let transport = match config.transport {
        EmailTransportKind::Blackhole => MailTransport::blackhole(),

        EmailTransportKind::Smtp => {
            let hostname = config
                .hostname
                .as_deref()
                .context("invalid email configuration: missing hostname")?;

            let mode = config
                .mode
                .context("invalid email configuration: missing mode")?;

            let credentials = match (config.username.as_deref(), config.password.as_deref()) {
                (Some(username), Some(password)) => Some(SmtpCredentials::new(
                    username.to_owned(),
                    password.to_owned(),
                )),
                (None, None) => None,
                _ => {
                    anyhow::bail!("invalid email configuration: missing username or password");
                }
            };

            let mode = match mode {
                EmailSmtpMode::Plain => SmtpMode::Plain,
                EmailSmtpMode::StartTls => SmtpMode::StartTls,
                EmailSmtpMode::Tls => SmtpMode::Tls,
            };

            MailTransport::smtp(mode, hostname, config.port, credentials)
                .context("failed to build SMTP transport")?
        }

        EmailTransportKind::Sendmail => MailTransport::sendmail(config.command.clone()),
    };

    Ok(Mailer::new(templates.clone(), transport, from, reply_to))
}

/// Test the connection to the mailer in a background task
pub fn test_mailer_in_background(mailer: &Mailer, timeout: Duration) {
    let mailer = mailer.clone();

    let span = tracing::info_span!("cli.test_mailer");
    tokio::spawn(
        async move {
            match tokio::time::timeout(timeout, mailer.test_connection()).await {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    tracing::warn!(
                        error = &err as &dyn std::error::Error,
                        "Could not connect to the mail backend, jobs sending mails may fail!"
                    );
                }
                Err(_) => {
                    tracing::warn!(
                        "Timed out while testing the mail backend connection, jobs sending mails may fail!"
                    );
                }
            }
        }
        .instrument(span),
    );
}

pub fn vc_connection_from_config(config: &VidyoConfig) -> VidyoConnection {
    VidyoConnection::new(
        config.endpoint.clone(),
        config.secret.clone(),
        reqwest::Client::new(),
    )
}

fn database_connect_options_from_config(
    config: &DatabaseConfig,
) -> Result<PgConnectOptions, anyhow::Error> {
    let options: PgConnectOptions = config
        .uri
        .parse()
        .context("could not parse database connection string")?;

    Ok(options.application_name(env!("CARGO_PKG_NAME")))
}

/// Create a database connection pool from the configuration
#[tracing::instrument(name = "db.connect", skip_all)]
pub async fn database_pool_from_config(config: &DatabaseConfig) -> Result<PgPool, anyhow::Error> {
    let options = database_connect_options_from_config(config)?;

    PgPoolOptions::new()
        .max_connections(config.max_connections.into())
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout))
        .connect_with(options)
        .await
        .context("could not connect to the database")
}

/// Create a single database connection from the configuration
#[tracing::instrument(name = "db.connect", skip_all)]
pub async fn database_connection_from_config(
    config: &DatabaseConfig,
) -> Result<PgConnection, anyhow::Error> {
    database_connect_options_from_config(config)?
        .connect()
        .await
        .context("could not connect to the database")
}
