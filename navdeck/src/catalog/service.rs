// This file is part of the product NavDeck.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::error::CatalogError;
use super::ids::IdClock;
use super::operations;
use super::store::{CatalogStore, StoreError};
use super::types::{Category, Document, Site};
use log::{info, warn};
use std::sync::Arc;

/// Told about every successful change to the persisted document.
pub trait CatalogObserver: Send + Sync {
    fn catalog_changed(&self, reason: &str);
}

/// The store operations bound to one data file, clock and observer.
///
/// Cheap to clone; each handler moves a clone into `spawn_blocking`.
#[derive(Clone)]
pub struct Catalog {
    store: CatalogStore,
    clock: Arc<dyn IdClock>,
    observer: Option<Arc<dyn CatalogObserver>>,
}

impl Catalog {
    pub fn new(store: CatalogStore, clock: Arc<dyn IdClock>) -> Self {
        Self {
            store,
            clock,
            observer: None,
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn CatalogObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn store(&self) -> &CatalogStore {
        &self.store
    }

    /// Runs `task` against this catalog on tokio's blocking pool, keeping
    /// file I/O off the async workers.
    pub async fn run_blocking<F, T>(&self, task: F) -> Result<T, CatalogError>
    where
        F: FnOnce(&Catalog) -> Result<T, CatalogError> + Send + 'static,
        T: Send + 'static,
    {
        let catalog = self.clone();
        tokio::task::spawn_blocking(move || task(&catalog))
            .await
            .map_err(|err| {
                CatalogError::Io(StoreError::new(format!("catalog task failed: {}", err)))
            })?
    }

    pub fn get_categories(&self) -> Document {
        operations::get_categories(&self.store)
    }

    pub fn add_category(&self, name: &str, icon: Option<String>) -> Result<Category, CatalogError> {
        let category =
            operations::add_category(&self.store, self.clock.as_ref(), name, icon).inspect_err(
                |err| warn!("add_category failed: {}", err),
            )?;
        info!("Added category {} ({})", category.id, category.title);
        self.changed("category added");
        Ok(category)
    }

    pub fn delete_category(&self, id: &str) -> Result<bool, CatalogError> {
        let removed = operations::delete_category(&self.store, id)
            .inspect_err(|err| warn!("delete_category {} failed: {}", id, err))?;
        if removed {
            info!("Deleted category {}", id);
            self.changed("category deleted");
        }
        Ok(removed)
    }

    pub fn update_category(
        &self,
        id: &str,
        name: &str,
        icon: Option<String>,
    ) -> Result<Category, CatalogError> {
        let category = operations::update_category(&self.store, id, name, icon)
            .inspect_err(|err| warn!("update_category {} failed: {}", id, err))?;
        info!("Updated category {}", id);
        self.changed("category updated");
        Ok(category)
    }

    pub fn add_site(&self, category_id: &str, site: Site) -> Result<Site, CatalogError> {
        let site = operations::add_site(&self.store, category_id, site)
            .inspect_err(|err| warn!("add_site to {} failed: {}", category_id, err))?;
        info!("Added site '{}' to category {}", site.name, category_id);
        self.changed("site added");
        Ok(site)
    }

    pub fn delete_site(&self, category_id: &str, index: usize) -> Result<bool, CatalogError> {
        let removed = operations::delete_site(&self.store, category_id, index).inspect_err(
            |err| warn!("delete_site {}[{}] failed: {}", category_id, index, err),
        )?;
        if removed {
            info!("Deleted site {} from category {}", index, category_id);
            self.changed("site deleted");
        }
        Ok(removed)
    }

    fn changed(&self, reason: &str) {
        if let Some(observer) = &self.observer {
            observer.catalog_changed(reason);
        }
    }
}
