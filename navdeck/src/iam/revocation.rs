// This file is part of the product NavDeck.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use chrono::Utc;
use std::collections::HashMap;
use std::sync::Mutex;

/// Token ids signed out before their expiry. An entry is kept only until
/// the token it names would have expired anyway.
///
/// The list lives in process memory only. After a restart a signed-out
/// cookie that has not yet expired is accepted again; rotating
/// `auth.jwt.secret` invalidates every outstanding session.
#[derive(Debug, Default)]
pub struct RevokedSessions {
    entries: Mutex<HashMap<String, i64>>,
}

impl RevokedSessions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn revoke(&self, jti: &str, expires_at: i64) {
        let mut entries = self.lock();
        prune(&mut entries, Utc::now().timestamp());
        entries.insert(jti.to_string(), expires_at);
    }

    pub fn is_revoked(&self, jti: &str) -> bool {
        self.lock().contains_key(jti)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, i64>> {
        match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

fn prune(entries: &mut HashMap<String, i64>, now: i64) {
    entries.retain(|_, expires_at| *expires_at > now);
}
