// This file is part of the product NavDeck.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::store::StoreError;
use std::fmt;

#[derive(Debug)]
pub enum CatalogError {
    /// A category id or site position did not resolve; nothing was written.
    NotFound(&'static str),
    /// Input rejected before the store was touched.
    Validation(String),
    /// The document could not be persisted; the file on disk is unchanged.
    Io(StoreError),
}

impl CatalogError {
    pub fn category_not_found() -> Self {
        CatalogError::NotFound("category not found")
    }

    pub fn site_not_found() -> Self {
        CatalogError::NotFound("site not found")
    }
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::NotFound(what) => write!(f, "{}", what),
            CatalogError::Validation(msg) => write!(f, "{}", msg),
            CatalogError::Io(err) => write!(f, "save failed: {}", err),
        }
    }
}

impl std::error::Error for CatalogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CatalogError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for CatalogError {
    fn from(err: StoreError) -> Self {
        CatalogError::Io(err)
    }
}
