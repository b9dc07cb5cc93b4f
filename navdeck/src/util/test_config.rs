// This file is part of the product NavDeck.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

#![allow(dead_code)]

use crate::config::{
    AdminConfig, AppConfig, JwtConfig, LoggingConfig, ServerConfig, StorageConfig, UploadConfig,
    ValidatedAuthConfig, ValidatedConfig,
};
use std::sync::OnceLock;

pub const TEST_ADMIN_PASSWORD: &str = "admin-password";

static TEST_PASSWORD_HASH: OnceLock<String> = OnceLock::new();

/// Argon2 hash of [`TEST_ADMIN_PASSWORD`], computed once per test binary.
pub fn test_password_hash() -> String {
    TEST_PASSWORD_HASH
        .get_or_init(|| {
            crate::iam::hash_admin_password(TEST_ADMIN_PASSWORD)
                .expect("hash test admin password")
        })
        .clone()
}

#[derive(Debug, Clone)]
pub struct TestConfigBuilder {
    config: ValidatedConfig,
}

impl Default for TestConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: ValidatedConfig {
                server: ServerConfig {
                    host: "127.0.0.1".to_string(),
                    port: 5466,
                    workers: 1,
                },
                admin: AdminConfig {
                    path: "/config".to_string(),
                },
                auth: ValidatedAuthConfig {
                    password_hash: test_password_hash(),
                    jwt: JwtConfig {
                        secret: "test-secret".to_string(),
                        issuer: "navdeck".to_string(),
                        audience: "navdeck-admin".to_string(),
                        expiration_hours: 168,
                        cookie_name: "auth_token".to_string(),
                    },
                },
                storage: StorageConfig::default(),
                upload: UploadConfig {
                    max_file_size_mb: 1,
                    allowed_extensions: vec!["png".to_string(), "svg".to_string()],
                },
                logging: LoggingConfig::default(),
                app: AppConfig {
                    name: "Test Deck".to_string(),
                    description: "Test Description".to_string(),
                },
            },
        }
    }

    pub fn with_admin_path(mut self, path: &str) -> Self {
        self.config.admin.path = path.to_string();
        self
    }

    pub fn with_host(mut self, host: &str) -> Self {
        self.config.server.host = host.to_string();
        self
    }

    pub fn with_storage(mut self, data_file: &str, public_dir: &str) -> Self {
        self.config.storage.data_file = data_file.to_string();
        self.config.storage.public_dir = public_dir.to_string();
        self
    }

    pub fn with_jwt_secret(mut self, secret: &str) -> Self {
        self.config.auth.jwt.secret = secret.to_string();
        self
    }

    pub fn build(self) -> ValidatedConfig {
        self.config
    }
}

pub fn test_config() -> ValidatedConfig {
    TestConfigBuilder::new().build()
}
