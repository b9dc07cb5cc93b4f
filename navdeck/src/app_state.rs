// This file is part of the product NavDeck.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use std::sync::Arc;

use crate::catalog::{Catalog, CatalogStore, IdClock, SystemClock};
use crate::public::cache::PageCache;
use crate::public::error::ErrorRenderer;
use crate::runtime_paths::RuntimePaths;
use crate::templates::{MiniJinjaEngine, TemplateEngine};

pub struct AppState {
    pub templates: Arc<dyn TemplateEngine>,
    pub error_renderer: ErrorRenderer,
    pub page_cache: Arc<PageCache>,
    pub catalog: Catalog,
    pub runtime_paths: RuntimePaths,
}

impl AppState {
    pub fn new(app_name: &str, runtime_paths: RuntimePaths) -> Self {
        Self::with_clock(app_name, runtime_paths, Arc::new(SystemClock))
    }

    /// Same as [`AppState::new`] with an explicit id clock.
    pub fn with_clock(
        app_name: &str,
        runtime_paths: RuntimePaths,
        clock: Arc<dyn IdClock>,
    ) -> Self {
        let page_cache = Arc::new(PageCache::new());
        let catalog = Catalog::new(CatalogStore::new(runtime_paths.data_file.clone()), clock)
            .with_observer(page_cache.clone());
        Self {
            templates: Arc::new(MiniJinjaEngine::new()),
            error_renderer: ErrorRenderer::new(app_name.to_string()),
            page_cache,
            catalog,
            runtime_paths,
        }
    }
}
