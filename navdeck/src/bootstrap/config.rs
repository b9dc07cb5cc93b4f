// This file is part of the product NavDeck.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::{BootstrapError, log_action, log_warning};
use crate::config::ADMIN_PASSWORD_ENV;
use crate::iam::{generate_admin_password, generate_secret_hex, hash_admin_password};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_WORKERS: u16 = 2;
const JWT_SECRET_BYTES: usize = 32;
const GENERATED_PASSWORD_LEN: usize = 16;

/// Writes a default `config.yaml` when none exists. Returns the generated
/// admin password, which is never stored in clear text.
pub fn ensure_config(root: &Path) -> Result<Option<String>, BootstrapError> {
    let root_path = normalize_root(root)?;
    let config_path = root_path.join("config.yaml");

    if config_path.exists() {
        return Ok(None);
    }

    let jwt_secret = generate_secret_hex(JWT_SECRET_BYTES);
    let password = generate_admin_password(GENERATED_PASSWORD_LEN);
    let password_hash = hash_admin_password(&password)?;
    let contents = default_config_yaml(&jwt_secret, &password_hash);

    let mut file = match OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&config_path)
    {
        Ok(file) => file,
        Err(err) if err.kind() == io::ErrorKind::AlreadyExists => return Ok(None),
        Err(err) => return Err(BootstrapError::Io(err)),
    };

    file.write_all(contents.as_bytes())?;
    file.sync_all()?;

    log_action(format!(
        "created config.yaml (http://{}:{}/)",
        DEFAULT_HOST, DEFAULT_PORT
    ));
    log_warning(format!(
        "generated admin password: {} (shown once; set {} to override)",
        password, ADMIN_PASSWORD_ENV
    ));

    Ok(Some(password))
}

fn normalize_root(root: &Path) -> Result<PathBuf, BootstrapError> {
    let root_path = if root.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        root.to_path_buf()
    };

    if root_path.exists() {
        if !root_path.is_dir() {
            return Err(BootstrapError::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("Runtime root is not a directory: {}", root_path.display()),
            )));
        }
        return Ok(root_path);
    }

    fs::create_dir_all(&root_path)?;
    log_action(format!(
        "created runtime root directory {}",
        root_path.display()
    ));
    Ok(root_path)
}

fn default_config_yaml(jwt_secret: &str, password_hash: &str) -> String {
    format!(
        "server:\n  host: \"{host}\"\n  port: {port}\n  workers: {workers}\n\nadmin:\n  path: \"/config\"\n\nauth:\n  password_hash: \"{password_hash}\"\n  jwt:\n    secret: \"{jwt_secret}\"\n    expiration_hours: 168\n    cookie_name: \"auth_token\"\n\nstorage:\n  data_file: \"data/data.json\"\n  public_dir: \"public\"\n\nupload:\n  max_file_size_mb: 5\n  allowed_extensions: [\"png\", \"jpg\", \"jpeg\", \"gif\", \"svg\", \"webp\", \"ico\", \"avif\"]\n\nlogging:\n  level: \"info\"\n\napp:\n  name: \"NavDeck\"\n  description: \"Personal navigation page\"\n",
        host = DEFAULT_HOST,
        port = DEFAULT_PORT,
        workers = DEFAULT_WORKERS,
        password_hash = password_hash,
        jwt_secret = jwt_secret,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn default_config_parses_and_validates() {
        let hash = hash_admin_password("pw").unwrap();
        let yaml = default_config_yaml(&"ab".repeat(32), &hash);

        let validated = Config::parse(&yaml).unwrap().validate(None).unwrap();

        assert_eq!(validated.server.port, DEFAULT_PORT);
        assert_eq!(validated.admin.path, "/config");
        assert_eq!(validated.auth.password_hash, hash);
        assert_eq!(validated.auth.jwt.cookie_name, "auth_token");
        assert!(validated.is_localhost_only());
    }
}
