// Copyright 2026 The VCM Authors.
//
// SPDX-License-Identifier: AGPL-3.0-only
// Please see LICENSE in the repository root for full details.

use std::process::ExitCode;

use clap::Parser;
use figment::Figment;
use tracing::{info, info_span};
use vcm_config::{ConfigurationSection, RootConfig};
use vcm_data_model::SystemClock;
use vcm_email::Templates;
use vcm_storage_pg::PgRepositoryFactory;
use vcm_tasks::{CleanupStaleRoomsJob, JobContext, RunnableJob, State};

use crate::util::{database_pool_from_config, mailer_from_config, vc_connection_from_config};

#[derive(Parser, Debug)]
pub(super) struct Options {
    #[command(subcommand)]
    subcommand: Subcommand,
}

#[derive(Parser, Debug)]
enum Subcommand {
    /// Delete the stale rooms now, without waiting for the schedule
    Cleanup {
        /// Log the rooms which would be deleted, without deleting anything
        #[clap(long)]
        dry_run: bool,
    },
}

impl Options {
    pub async fn run(self, figment: &Figment) -> anyhow::Result<ExitCode> {
        use Subcommand as SC;
        match self.subcommand {
            SC::Cleanup { dry_run } => {
                let span = info_span!("cli.rooms.cleanup").entered();
                let config = RootConfig::extract(figment).map_err(anyhow::Error::from_boxed)?;

                info!("Connecting to the database");
                let pool = database_pool_from_config(&config.database).await?;

                let templates = Templates::load()?;
                let mailer = mailer_from_config(&config.email, &templates)?;
                let conn = vc_connection_from_config(&config.vidyo);

                let state = State::new(
                    PgRepositoryFactory::new(pool),
                    SystemClock::default(),
                    mailer,
                    conn,
                    config.cleanup.retention(),
                );
                span.exit();

                CleanupStaleRoomsJob::new(dry_run)
                    .run(&state, JobContext::default())
                    .await?;
            }
        }

        Ok(ExitCode::SUCCESS)
    }
}
