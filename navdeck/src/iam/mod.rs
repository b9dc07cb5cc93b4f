// This file is part of the product NavDeck.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

pub mod gate;
pub mod jwt;
mod password;
mod revocation;
mod service;

pub use gate::{AccessGate, AuthRequest, LOGIN_PATH, is_admin_path};
pub use password::{
    PasswordError, generate_admin_password, generate_secret_hex, hash_admin_password,
    verify_admin_password,
};
pub use revocation::RevokedSessions;
pub use service::{AdminAuth, AuthError};
