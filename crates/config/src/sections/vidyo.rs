// Copyright 2026 The VCM Authors.
//
// SPDX-License-Identifier: AGPL-3.0-only
// Please see LICENSE in the repository root for full details.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use url::Url;

use super::ConfigurationSection;

fn default_endpoint() -> Url {
    Url::parse("http://localhost:8009/").expect("valid URL")
}

/// Configuration related to the Vidyo API
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct VidyoConfig {
    /// The base URL of the Vidyo management API
    #[serde(default = "default_endpoint")]
    pub endpoint: Url,

    /// The bearer token used to authenticate against the Vidyo API
    pub secret: String,
}

impl ConfigurationSection for VidyoConfig {
    const PATH: Option<&'static str> = Some("vidyo");
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
                    vidyo:
                      endpoint: https://vidyo.example.com/
                      secret: verysecret
                ",
            )?;

            let figment = Figment::new().merge(Yaml::file("config.yaml"));
            let config = VidyoConfig::extract(&figment).map_err(|e| e.to_string())?;

            assert_eq!(config.endpoint.as_str(), "https://vidyo.example.com/");
            assert_eq!(&config.secret, "verysecret");

            Ok(())
        });
    }
}
