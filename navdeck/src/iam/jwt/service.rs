// This file is part of the product NavDeck.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::types::{Claims, JwtError};
use crate::config::{JwtConfig, ValidatedConfig};
use actix_web::cookie::{Cookie, SameSite, time::Duration as CookieDuration, time::OffsetDateTime};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

/// Subject carried by every session token; there is a single admin.
pub const ADMIN_SUBJECT: &str = "admin";

pub struct JwtService {
    secret: String,
    issuer: String,
    audience: String,
    expiration_hours: u64,
    cookie_name: String,
    is_localhost: bool,
}

impl JwtService {
    /// Create a new JwtService from configuration
    pub fn new(config: &ValidatedConfig) -> Self {
        Self::from_parts(&config.auth.jwt, config.is_localhost_only())
    }

    fn from_parts(jwt_config: &JwtConfig, is_localhost: bool) -> Self {
        JwtService {
            secret: jwt_config.secret.clone(),
            issuer: jwt_config.issuer.clone(),
            audience: jwt_config.audience.clone(),
            expiration_hours: jwt_config.expiration_hours,
            cookie_name: jwt_config.cookie_name.clone(),
            is_localhost,
        }
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    /// Issue a fresh admin session token
    pub fn create_token(&self) -> Result<(String, Claims), JwtError> {
        let now = Utc::now();
        let expiration = now + Duration::hours(self.expiration_hours as i64);

        let claims = Claims {
            sub: ADMIN_SUBJECT.to_string(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            jti: Uuid::new_v4().to_string(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_ref()),
        )
        .map_err(|e| JwtError::TokenCreationError(e.to_string()))?;

        Ok((token, claims))
    }

    /// Verify signature, issuer, audience and expiry, returning the claims
    pub fn verify_token(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);

        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_ref()),
            &validation,
        )
        .map_err(|e| JwtError::TokenVerificationError(e.to_string()))?;

        if token_data.claims.sub != ADMIN_SUBJECT {
            return Err(JwtError::TokenVerificationError(
                "unexpected subject".to_string(),
            ));
        }

        Ok(token_data.claims)
    }

    /// HTTP-only session cookie carrying the token, expiring with it
    pub fn create_auth_cookie<'a>(&self, token: &str, claims: &Claims) -> Cookie<'a> {
        let expires = match OffsetDateTime::from_unix_timestamp(claims.exp) {
            Ok(val) => val,
            Err(e) => {
                log::error!(
                    "Failed to convert expiration timestamp for auth cookie: {}",
                    e
                );
                OffsetDateTime::UNIX_EPOCH
            }
        };

        Cookie::build(self.cookie_name.clone(), token.to_string())
            .path("/")
            .secure(!self.is_localhost) // Plain HTTP is only tolerated on localhost
            .http_only(true)
            .same_site(SameSite::Lax)
            .max_age(CookieDuration::hours(self.expiration_hours as i64))
            .expires(expires)
            .finish()
    }

    /// Create a cookie for logout (removes the JWT)
    pub fn create_logout_cookie<'a>(&self) -> Cookie<'a> {
        Cookie::build(self.cookie_name.clone(), "")
            .path("/")
            .secure(!self.is_localhost)
            .http_only(true)
            .same_site(SameSite::Lax)
            .max_age(CookieDuration::seconds(0))
            .expires(OffsetDateTime::UNIX_EPOCH)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jwt_config(secret: &str) -> JwtConfig {
        JwtConfig {
            secret: secret.to_string(),
            issuer: "test-issuer".to_string(),
            audience: "test-audience".to_string(),
            expiration_hours: 168,
            cookie_name: "test_auth".to_string(),
        }
    }

    fn service(secret: &str, is_localhost: bool) -> JwtService {
        JwtService::from_parts(&jwt_config(secret), is_localhost)
    }

    #[test]
    fn issued_token_verifies() {
        let service = service("test-secret-key", true);
        let (token, claims) = service.create_token().unwrap();

        let verified = service.verify_token(&token).unwrap();

        assert_eq!(verified, claims);
        assert_eq!(verified.sub, ADMIN_SUBJECT);
        assert_eq!(verified.exp - verified.iat, 168 * 3600);
    }

    #[test]
    fn every_token_gets_its_own_id() {
        let service = service("test-secret-key", true);
        let (_, first) = service.create_token().unwrap();
        let (_, second) = service.create_token().unwrap();
        assert_ne!(first.jti, second.jti);
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let (token, _) = service("one-secret", true).create_token().unwrap();
        assert!(service("another-secret", true).verify_token(&token).is_err());
    }

    #[test]
    fn wrong_audience_is_rejected() {
        let issuer = service("shared", true);
        let mut other = jwt_config("shared");
        other.audience = "someone-else".to_string();
        let verifier = JwtService::from_parts(&other, true);

        let (token, _) = issuer.create_token().unwrap();

        assert!(verifier.verify_token(&token).is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let service = service("test-secret-key", true);
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: ADMIN_SUBJECT.to_string(),
            iat: now - 7200,
            exp: now - 3600,
            iss: "test-issuer".to_string(),
            aud: "test-audience".to_string(),
            jti: "old".to_string(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret("test-secret-key".as_ref()),
        )
        .unwrap();

        assert!(service.verify_token(&token).is_err());
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(service("k", true).verify_token("not.a.jwt").is_err());
        assert!(service("k", true).verify_token("").is_err());
    }

    #[test]
    fn auth_cookie_attributes() {
        let service = service("test-secret-key", true);
        let (token, claims) = service.create_token().unwrap();

        let cookie = service.create_auth_cookie(&token, &claims);

        assert_eq!(cookie.name(), "test_auth");
        assert_eq!(cookie.value(), token);
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.secure(), Some(false));
        assert_eq!(cookie.max_age(), Some(CookieDuration::hours(168)));
    }

    #[test]
    fn cookies_are_secure_off_localhost() {
        let service = service("test-secret-key", false);
        let (token, claims) = service.create_token().unwrap();

        assert_eq!(service.create_auth_cookie(&token, &claims).secure(), Some(true));
        assert_eq!(service.create_logout_cookie().secure(), Some(true));
    }

    #[test]
    fn logout_cookie_expires_immediately() {
        let cookie = service("k", true).create_logout_cookie();
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(CookieDuration::seconds(0)));
    }
}
