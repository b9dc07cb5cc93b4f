// This file is part of the product NavDeck.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use crate::config::{Config, ConfigError, ValidatedConfig};
use crate::iam::PasswordError;
use crate::runtime_paths::RuntimePaths;
use std::error::Error;
use std::fmt;
use std::path::Path;

pub mod config;

#[derive(Debug)]
pub struct BootstrapResult {
    pub validated_config: ValidatedConfig,
    pub runtime_paths: RuntimePaths,
    pub created_config: bool,
}

#[derive(Debug)]
pub enum BootstrapError {
    Config(ConfigError),
    Io(std::io::Error),
    Password(PasswordError),
}

impl fmt::Display for BootstrapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BootstrapError::Config(err) => write!(f, "{}", err),
            BootstrapError::Io(err) => write!(f, "Bootstrap I/O error: {}", err),
            BootstrapError::Password(err) => write!(f, "Bootstrap password error: {}", err),
        }
    }
}

impl Error for BootstrapError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            BootstrapError::Config(err) => Some(err),
            BootstrapError::Io(err) => Some(err),
            BootstrapError::Password(err) => Some(err),
        }
    }
}

impl From<ConfigError> for BootstrapError {
    fn from(err: ConfigError) -> Self {
        BootstrapError::Config(err)
    }
}

impl From<std::io::Error> for BootstrapError {
    fn from(err: std::io::Error) -> Self {
        BootstrapError::Io(err)
    }
}

impl From<PasswordError> for BootstrapError {
    fn from(err: PasswordError) -> Self {
        BootstrapError::Password(err)
    }
}

/// Prepares a runtime root: default config on first run, validated
/// configuration, and the data and icon directories.
pub fn bootstrap_runtime(root: &Path) -> Result<BootstrapResult, BootstrapError> {
    let generated_password = config::ensure_config(root)?;
    let validated_config = Config::load_and_validate(root)?;
    let runtime_paths = RuntimePaths::from_root(root, &validated_config)?;

    Ok(BootstrapResult {
        validated_config,
        runtime_paths,
        created_config: generated_password.is_some(),
    })
}

pub(crate) fn log_action(message: impl AsRef<str>) {
    eprintln!("[bootstrap] {}", message.as_ref());
}

pub(crate) fn log_warning(message: impl AsRef<str>) {
    eprintln!("[bootstrap] WARNING: {}", message.as_ref());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::iam::verify_admin_password;
    use crate::util::test_fixtures::TestFixtureRoot;
    use std::fs;

    #[test]
    fn bootstrap_creates_defaults_when_missing() {
        let fixture = TestFixtureRoot::new_unique("bootstrap-default").unwrap();

        let password = config::ensure_config(fixture.path())
            .unwrap()
            .expect("fresh root generates a password");
        let result = bootstrap_runtime(fixture.path()).expect("bootstrap should succeed");

        assert!(!result.created_config);
        assert!(fixture.path().join("config.yaml").exists());
        assert!(result.runtime_paths.icons_dir.is_dir());
        assert!(result.runtime_paths.data_file.parent().unwrap().is_dir());
        assert_eq!(password.chars().count(), 16);
        if std::env::var(crate::config::ADMIN_PASSWORD_ENV).is_err() {
            assert!(verify_admin_password(
                &password,
                &result.validated_config.auth.password_hash
            ));
        }
    }

    #[test]
    fn bootstrap_keeps_existing_config() {
        let fixture = TestFixtureRoot::new_unique("bootstrap-existing").unwrap();
        bootstrap_runtime(fixture.path()).expect("first run");
        let before = fs::read_to_string(fixture.path().join("config.yaml")).unwrap();

        let second = bootstrap_runtime(fixture.path()).expect("second run");

        assert!(!second.created_config);
        let after = fs::read_to_string(fixture.path().join("config.yaml")).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn bootstrap_rejects_file_as_root() {
        let fixture = TestFixtureRoot::new_unique("bootstrap-file-root").unwrap();
        let file_root = fixture.path().join("not-a-dir");
        fs::write(&file_root, "x").unwrap();

        let err = bootstrap_runtime(&file_root).unwrap_err();

        assert!(matches!(err, BootstrapError::Io(_)));
    }
}
