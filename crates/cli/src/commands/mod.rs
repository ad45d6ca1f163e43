// Copyright 2026 The VCM Authors.
//
// SPDX-License-Identifier: AGPL-3.0-only
// Please see LICENSE in the repository root for full details.

use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::Parser;
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};

mod config;
mod database;
mod rooms;
mod worker;

#[derive(Parser, Debug)]
enum Subcommand {
    /// Configuration-related commands
    Config(self::config::Options),

    /// Manage the database
    Database(self::database::Options),

    /// Manage video-conference rooms
    Rooms(self::rooms::Options),

    /// Run the background worker
    Worker(self::worker::Options),
}

#[derive(Parser, Debug)]
#[command(version)]
pub struct Options {
    /// Path to the configuration file, can be repeated to merge multiple
    /// files
    #[arg(
        short,
        long,
        global = true,
        env = "VCM_CONFIG",
        action = clap::ArgAction::Append,
    )]
    config: Vec<Utf8PathBuf>,

    #[command(subcommand)]
    subcommand: Option<Subcommand>,
}

impl Options {
    /// Load the configuration sources, without extracting anything yet
    pub fn figment(&self) -> Figment {
        let configs = if self.config.is_empty() {
            vec![Utf8PathBuf::from("config.yaml")]
        } else {
            self.config.clone()
        };

        let base = configs
            .into_iter()
            .fold(Figment::new(), |figment, path| {
                figment.merge(Yaml::file(path))
            });

        base.merge(Env::prefixed("VCM_").split("_"))
    }

    pub async fn run(self, figment: &Figment) -> anyhow::Result<ExitCode> {
        use Subcommand as S;
        match self.subcommand {
            Some(S::Config(c)) => c.run(figment).await,
            Some(S::Database(c)) => c.run(figment).await,
            Some(S::Rooms(c)) => c.run(figment).await,
            Some(S::Worker(c)) => c.run(figment).await,

            // Run the worker by default
            None => self::worker::Options::default().run(figment).await,
        }
    }
}
