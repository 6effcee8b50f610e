// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0
//! # krb5check configuration
//!
//! Parsing of the krb5check configuration file. The file is optional: every
//! option has a default and may additionally be overridden with the
//! `KRB5CHECK__<SECTION>__<KEY>` environment variables.
use config::{Environment, File, FileFormat};
use eyre::{Report, WrapErr, ensure};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable pointing to the configuration file.
pub const CONFIG_PATH_ENV: &str = "KRB5CHECK_CONFIG";

/// Configuration file location used when [`CONFIG_PATH_ENV`] is not set.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/krb5check/krb5check.conf";

/// Smallest accepted `[handshake] max_line_length`. Both field markers
/// must always fit into the line buffer.
const MIN_LINE_LENGTH: usize = 64;

#[derive(Debug, Default, Deserialize, Clone)]
pub struct Config {
    /// Global configuration options
    #[serde(rename = "DEFAULT", alias = "default", default)]
    pub default: DefaultSection,

    /// Input handshake parsing.
    #[serde(default)]
    pub handshake: HandshakeSection,

    /// Credential verification.
    #[serde(default)]
    pub verifier: VerifierSection,

    /// Realm (authentication context) configuration.
    #[serde(default)]
    pub realm: RealmSection,
}

#[derive(Debug, Default, Deserialize, Clone)]
pub struct DefaultSection {
    /// Debug logging
    #[serde(default)]
    pub debug: bool,
}

/// Handshake reader configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct HandshakeSection {
    /// Maximal length of a single input line in bytes. Longer lines are
    /// never buffered completely.
    #[serde(default = "default_max_line_length")]
    pub max_line_length: usize,
}

impl Default for HandshakeSection {
    fn default() -> Self {
        Self {
            max_line_length: default_max_line_length(),
        }
    }
}

/// Credential verifier configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct VerifierSection {
    /// Lifetime (in seconds) of the requested initial ticket. The ticket is
    /// never used after the check, so there is no reason to ask for more
    /// than a few minutes.
    #[serde(default = "default_ticket_lifetime")]
    pub ticket_lifetime: u64,

    /// Maximal length of the composed identity text (`name[/instance]`) in
    /// bytes.
    #[serde(default = "default_max_principal_length")]
    pub max_principal_length: usize,
}

impl VerifierSection {
    pub fn ticket_lifetime(&self) -> Duration {
        Duration::from_secs(self.ticket_lifetime)
    }
}

impl Default for VerifierSection {
    fn default() -> Self {
        Self {
            ticket_lifetime: default_ticket_lifetime(),
            max_principal_length: default_max_principal_length(),
        }
    }
}

/// Realm provider configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct RealmSection {
    /// Realm exchange driver. Only `kinit` is provided.
    #[serde(default = "default_realm_driver")]
    pub driver: String,

    /// Realm to authenticate against. When unset the `default_realm` of the
    /// Kerberos profile is used.
    pub default_realm: Option<String>,

    /// Kerberos profile location.
    #[serde(default = "default_krb5_config")]
    pub krb5_config: PathBuf,

    /// The `kinit` program to use for the exchange.
    #[serde(default = "default_kinit_path")]
    pub kinit_path: PathBuf,

    /// Kerberos implementation the `kinit` program belongs to.
    #[serde(default)]
    pub kinit_flavor: KinitFlavor,

    /// Time (in seconds) after which the exchange with the KDC is abandoned.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl RealmSection {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

impl Default for RealmSection {
    fn default() -> Self {
        Self {
            driver: default_realm_driver(),
            default_realm: None,
            krb5_config: default_krb5_config(),
            kinit_path: default_kinit_path(),
            kinit_flavor: KinitFlavor::default(),
            timeout: default_timeout(),
        }
    }
}

/// Kerberos implementation of the `kinit` program.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum KinitFlavor {
    /// MIT Kerberos. The password is read from stdin by the prompter.
    #[default]
    Mit,
    /// Heimdal. The password is read with `--password-file=STDIN`.
    Heimdal,
}

fn default_max_line_length() -> usize {
    1024
}

fn default_ticket_lifetime() -> u64 {
    // 5 minutes
    60 * 5
}

fn default_max_principal_length() -> usize {
    1024
}

fn default_realm_driver() -> String {
    "kinit".into()
}

fn default_krb5_config() -> PathBuf {
    PathBuf::from("/etc/krb5.conf")
}

fn default_kinit_path() -> PathBuf {
    PathBuf::from("kinit")
}

fn default_timeout() -> u64 {
    30
}

impl Config {
    pub fn new(path: PathBuf) -> Result<Self, Report> {
        let mut builder = config::Config::builder();

        if Path::new(&path).is_file() {
            builder = builder.add_source(File::from(path).format(FileFormat::Ini));
        }
        builder = builder.add_source(
            Environment::with_prefix("KRB5CHECK")
                .prefix_separator("__")
                .separator("__"),
        );

        builder.try_into()
    }

    /// Location of the configuration file.
    pub fn path_from_env() -> PathBuf {
        std::env::var_os(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
    }

    fn validate(self) -> Result<Self, Report> {
        ensure!(
            self.handshake.max_line_length >= MIN_LINE_LENGTH,
            "[handshake].max_line_length must be at least {MIN_LINE_LENGTH}"
        );
        ensure!(
            self.verifier.ticket_lifetime > 0,
            "[verifier].ticket_lifetime must be positive"
        );
        ensure!(
            self.verifier.max_principal_length > 0,
            "[verifier].max_principal_length must be positive"
        );
        ensure!(self.realm.timeout > 0, "[realm].timeout must be positive");
        Ok(self)
    }
}

impl TryFrom<config::ConfigBuilder<config::builder::DefaultState>> for Config {
    type Error = Report;
    fn try_from(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self, Self::Error> {
        let mut builder = builder;
        builder = builder
            .set_default("handshake.max_line_length", 1024)?
            .set_default("verifier.ticket_lifetime", 300)?
            .set_default("verifier.max_principal_length", 1024)?
            .set_default("realm.driver", "kinit")?
            .set_default("realm.timeout", 30)?;

        let config: Config = builder
            .build()
            .wrap_err("Failed to read configuration file")?
            .try_deserialize()
            .wrap_err("Failed to parse configuration file")?;
        config.validate()
    }
}
