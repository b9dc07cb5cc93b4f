// This file is part of the product NavDeck.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use argon2::Argon2;
use argon2::password_hash::{
    PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng,
    rand_core::RngCore,
};

const GENERATED_PASSWORD_ALPHABET: &[u8] =
    b"ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz23456789";

#[derive(Debug)]
pub enum PasswordError {
    HashError(String),
}

impl std::fmt::Display for PasswordError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PasswordError::HashError(msg) => write!(f, "Password hashing failed: {}", msg),
        }
    }
}

impl std::error::Error for PasswordError {}

/// Hashes the admin password into an Argon2id PHC string.
pub fn hash_admin_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|err| PasswordError::HashError(err.to_string()))?;
    Ok(hash.to_string())
}

/// A malformed stored hash never verifies.
pub fn verify_admin_password(password: &str, stored_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        log::error!("Stored admin password hash is not a valid PHC string");
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// Random password for a freshly bootstrapped install. Ambiguous glyphs
/// (0/O, 1/l/I) are left out.
pub fn generate_admin_password(length: usize) -> String {
    let mut bytes = vec![0u8; length];
    OsRng.fill_bytes(&mut bytes);
    bytes
        .iter()
        .map(|b| {
            GENERATED_PASSWORD_ALPHABET[*b as usize % GENERATED_PASSWORD_ALPHABET.len()] as char
        })
        .collect()
}

/// Random hex string of `bytes` bytes, used for the JWT signing secret.
pub fn generate_secret_hex(bytes: usize) -> String {
    let mut buffer = vec![0u8; bytes];
    OsRng.fill_bytes(&mut buffer);
    buffer.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let hash = hash_admin_password("correct horse").expect("hash");
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_admin_password("correct horse", &hash));
        assert!(!verify_admin_password("wrong horse", &hash));
    }

    #[test]
    fn hashes_are_salted() {
        let a = hash_admin_password("same").expect("hash");
        let b = hash_admin_password("same").expect("hash");
        assert_ne!(a, b);
    }

    #[test]
    fn malformed_hash_never_verifies() {
        assert!(!verify_admin_password("anything", "not-a-phc-string"));
        assert!(!verify_admin_password("", ""));
    }

    #[test]
    fn generated_password_uses_alphabet() {
        let password = generate_admin_password(16);
        assert_eq!(password.chars().count(), 16);
        assert!(
            password
                .bytes()
                .all(|b| GENERATED_PASSWORD_ALPHABET.contains(&b))
        );
    }

    #[test]
    fn generated_secret_is_hex() {
        let secret = generate_secret_hex(32);
        assert_eq!(secret.len(), 64);
        assert!(secret.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
