// Copyright 2026 The VCM Authors.
//
// SPDX-License-Identifier: AGPL-3.0-only
// Please see LICENSE in the repository root for full details.

use chrono::Duration;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::ConfigurationSection;

fn default_num_days_old() -> u32 {
    365
}

/// Configuration of the stale-room cleanup
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CleanupConfig {
    /// Rooms whose last event ended more than this many days ago are
    /// considered stale
    #[serde(default = "default_num_days_old")]
    pub num_days_old: u32,
}

impl CleanupConfig {
    /// The retention window as a [`Duration`]
    #[must_use]
    pub fn retention(&self) -> Duration {
        Duration::days(i64::from(self.num_days_old))
    }
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            num_days_old: default_num_days_old(),
        }
    }
}

impl ConfigurationSection for CleanupConfig {
    const PATH: Option<&'static str> = Some("cleanup");
}

#[cfg(test)]
mod tests {
    use figment::{
        Figment, Jail,
        providers::{Format, Yaml},
    };

    use super::*;
    use crate::ConfigurationSectionExt;

    #[test]
    fn load_config() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.yaml",
                r"
                    cleanup:
                      num_days_old: 180
                ",
            )?;

            let figment = Figment::new().merge(Yaml::file("config.yaml"));
            let config = CleanupConfig::extract_or_default(&figment).map_err(|e| e.to_string())?;

            assert_eq!(config.num_days_old, 180);
            assert_eq!(config.retention(), Duration::days(180));

            Ok(())
        });
    }

    #[test]
    fn defaults_when_absent() {
        Jail::expect_with(|jail| {
            jail.create_file("config.yaml", "{}")?;

            let figment = Figment::new().merge(Yaml::file("config.yaml"));
            let config = CleanupConfig::extract_or_default(&figment).map_err(|e| e.to_string())?;

            assert_eq!(config.num_days_old, 365);

            Ok(())
        });
    }
}
