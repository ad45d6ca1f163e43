// Copyright 2026 The VCM Authors.
//
// SPDX-License-Identifier: AGPL-3.0-only
// Please see LICENSE in the repository root for full details.

use std::{process::ExitCode, time::Duration};

use clap::Parser;
use figment::Figment;
use tracing::{info, info_span};
use vcm_config::{ConfigurationSection, RootConfig};
use vcm_data_model::SystemClock;
use vcm_email::Templates;
use vcm_storage_pg::PgRepositoryFactory;

use crate::{
    shutdown::ShutdownManager,
    util::{
        database_pool_from_config, mailer_from_config, test_mailer_in_background,
        vc_connection_from_config,
    },
};

#[derive(Parser, Debug, Default)]
pub(super) struct Options {}

impl Options {
    pub async fn run(self, figment: &Figment) -> anyhow::Result<ExitCode> {
        let shutdown = ShutdownManager::new()?;
        let span = info_span!("cli.worker.init").entered();
        let config = RootConfig::extract(figment).map_err(anyhow::Error::from_boxed)?;

        // Connect to the database
        info!("Connecting to the database");
        let pool = database_pool_from_config(&config.database).await?;

        // Load and compile the templates
        let templates = Templates::load()?;

        let mailer = mailer_from_config(&config.email, &templates)?;
        test_mailer_in_background(&mailer, Duration::from_secs(30));

        let conn = vc_connection_from_config(&config.vidyo);
        let retention = config.cleanup.retention();

        drop(config);

        info!("Starting the worker");
        vcm_tasks::init_and_run(
            PgRepositoryFactory::new(pool),
            SystemClock::default(),
            &mailer,
            conn,
            retention,
            shutdown.soft_shutdown_token(),
            shutdown.task_tracker(),
        )?;

        span.exit();

        shutdown.run().await;

        Ok(ExitCode::SUCCESS)
    }
}
