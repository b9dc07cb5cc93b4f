// This file is part of the product NavDeck.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::jwt::{Claims, JwtError, JwtService};
use super::password::verify_admin_password;
use super::revocation::RevokedSessions;
use crate::config::ValidatedConfig;
use log::{debug, info, warn};

#[derive(Debug)]
pub enum AuthError {
    InvalidPassword,
    Token(JwtError),
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::InvalidPassword => write!(f, "Incorrect password"),
            AuthError::Token(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for AuthError {}

impl From<JwtError> for AuthError {
    fn from(err: JwtError) -> Self {
        AuthError::Token(err)
    }
}

/// The admin access gate: one configured password, session tokens and the
/// list of tokens signed out early.
pub struct AdminAuth {
    password_hash: String,
    jwt: JwtService,
    revoked: RevokedSessions,
}

impl AdminAuth {
    pub fn new(config: &ValidatedConfig) -> Self {
        Self {
            password_hash: config.auth.password_hash.clone(),
            jwt: JwtService::new(config),
            revoked: RevokedSessions::new(),
        }
    }

    pub fn jwt(&self) -> &JwtService {
        &self.jwt
    }

    /// Checks the password and issues a session token on a match.
    pub fn login(&self, password: &str) -> Result<(String, Claims), AuthError> {
        if !verify_admin_password(password, &self.password_hash) {
            warn!("Admin login rejected: incorrect password");
            return Err(AuthError::InvalidPassword);
        }
        let (token, claims) = self.jwt.create_token()?;
        info!("Admin signed in (session {})", claims.jti);
        Ok((token, claims))
    }

    /// Claims of a token that verifies and has not been signed out.
    pub fn authenticate(&self, token: &str) -> Option<Claims> {
        match self.jwt.verify_token(token) {
            Ok(claims) if self.revoked.is_revoked(&claims.jti) => {
                debug!("Rejected signed-out session {}", claims.jti);
                None
            }
            Ok(claims) => Some(claims),
            Err(err) => {
                debug!("Ignoring session cookie: {}", err);
                None
            }
        }
    }

    pub fn logout(&self, claims: &Claims) {
        self.revoked.revoke(&claims.jti, claims.exp);
        info!("Admin signed out (session {})", claims.jti);
    }
}
