// Copyright 2026 The VCM Authors.
//
// SPDX-License-Identifier: AGPL-3.0-only
// Please see LICENSE in the repository root for full details.

//! Application configuration
//!
//! Sections are loaded out of YAML files and `VCM_`-prefixed environment
//! variables through [figment]. Each section implements
//! [`ConfigurationSection`].

#![deny(missing_docs)]
#![allow(clippy::module_name_repetitions)]

mod sections;
mod util;

pub use self::{
    sections::{
        CleanupConfig, DatabaseConfig, EmailConfig, EmailSmtpMode, EmailTransportKind, RootConfig,
        VidyoConfig,
    },
    util::{ConfigurationSection, ConfigurationSectionExt},
};
