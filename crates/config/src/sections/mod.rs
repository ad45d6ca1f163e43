// Copyright 2026 The VCM Authors.
//
// SPDX-License-Identifier: AGPL-3.0-only
// Please see LICENSE in the repository root for full details.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

mod cleanup;
mod database;
mod email;
mod vidyo;

pub use self::{
    cleanup::CleanupConfig,
    database::DatabaseConfig,
    email::{EmailConfig, EmailSmtpMode, EmailTransportKind},
    vidyo::VidyoConfig,
};
use crate::util::ConfigurationSection;

/// Application configuration root
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct RootConfig {
    /// Database connection configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Configuration related to sending emails
    #[serde(default)]
    pub email: EmailConfig,

    /// Configuration related to the Vidyo API
    pub vidyo: VidyoConfig,

    /// Configuration of the stale-room cleanup
    #[serde(default)]
    pub cleanup: CleanupConfig,
}

impl ConfigurationSection for RootConfig {
    fn validate(
        &self,
        figment: &figment::Figment,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
        self.database.validate(figment)?;
        self.email.validate(figment)?;
        self.vidyo.validate(figment)?;
        self.cleanup.validate(figment)?;

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

    #[test]
    fn load_config() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.yaml",
                r"
                    database:
                      uri: postgresql://localhost/vcm
                    vidyo:
                      endpoint: https://vidyo.example.com/
                      secret: verysecret
                ",
            )?;

            let figment = Figment::new().merge(Yaml::file("config.yaml"));
            let config = RootConfig::extract(&figment).map_err(|e| e.to_string())?;

            assert_eq!(&config.database.uri, "postgresql://localhost/vcm");
            assert_eq!(&config.vidyo.secret, "verysecret");

            // Sections which are not in the file get their defaults
            assert_eq!(config.email.transport, EmailTransportKind::Blackhole);
            assert_eq!(config.cleanup.num_days_old, 365);

            Ok(())
        });
    }
}
