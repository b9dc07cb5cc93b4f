// This file is part of the product NavDeck.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

//! Categories and sites persisted as one JSON document.

pub mod error;
pub mod ids;
pub mod operations;
pub mod search;
pub mod service;
pub mod store;
pub mod types;

pub use error::CatalogError;
pub use ids::{IdClock, ManualClock, SystemClock};
pub use service::{Catalog, CatalogObserver};
pub use store::{CatalogStore, StoreError};
pub use types::{Category, Document, Site};
