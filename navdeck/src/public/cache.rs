// This file is part of the product NavDeck.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use crate::catalog::CatalogObserver;
use crate::headers::{CacheDirective, set_cache_directive};
use actix_web::http::header::{ETAG, HeaderName, HeaderValue, IF_NONE_MATCH, VARY};
use actix_web::{HttpRequest, HttpResponse};
use log::info;
use std::cmp::max;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::{SystemTime, UNIX_EPOCH};

const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// Rendered public pages plus the generation counter they were rendered at.
///
/// The generation starts at the process start time in epoch milliseconds and
/// only ever grows, so an `ETag` from before a restart never matches.
pub struct PageCache {
    generation: AtomicU64,
    pages: RwLock<HashMap<String, Arc<str>>>,
}

impl PageCache {
    pub fn new() -> Self {
        Self {
            generation: AtomicU64::new(current_epoch_millis()),
            pages: RwLock::new(HashMap::new()),
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    pub fn generation_hex(&self) -> String {
        format!("{:x}", self.generation())
    }

    pub fn get(&self, key: &str) -> Option<Arc<str>> {
        match self.pages.read() {
            Ok(pages) => pages.get(key).cloned(),
            Err(poisoned) => poisoned.into_inner().get(key).cloned(),
        }
    }

    /// Stores a page rendered from data read at generation `rendered_at`.
    /// A page rendered before the latest invalidation is returned but not kept.
    pub fn insert(&self, key: &str, html: String, rendered_at: u64) -> Arc<str> {
        let html: Arc<str> = Arc::from(html);
        let mut pages = match self.pages.write() {
            Ok(pages) => pages,
            Err(poisoned) => poisoned.into_inner(),
        };
        if self.generation() == rendered_at {
            pages.insert(key.to_string(), html.clone());
        }
        html
    }

    pub fn len(&self) -> usize {
        match self.pages.read() {
            Ok(pages) => pages.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every cached page and moves to a new generation.
    pub fn invalidate(&self, reason: &str) -> u64 {
        // Held across the bump so `insert` never sees cleared pages with
        // the old generation.
        let mut pages = match self.pages.write() {
            Ok(pages) => pages,
            Err(poisoned) => poisoned.into_inner(),
        };
        pages.clear();

        let now = current_epoch_millis();
        let mut previous = self.generation.load(Ordering::SeqCst);
        loop {
            let next = max(now, previous.saturating_add(1));
            match self.generation.compare_exchange(
                previous,
                next,
                Ordering::SeqCst,
                Ordering::SeqCst,
            ) {
                Ok(_) => {
                    info!("Page cache invalidated, generation {:x} ({})", next, reason);
                    return next;
                }
                Err(observed) => previous = observed,
            }
        }
    }

    fn etag(&self) -> String {
        format!("\"{}\"", self.generation_hex())
    }
}

impl Default for PageCache {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogObserver for PageCache {
    fn catalog_changed(&self, reason: &str) {
        self.invalidate(reason);
    }
}

/// Builds a revalidatable HTML response tagged with the current generation,
/// answering `304 Not Modified` when the client already holds it.
pub fn cached_html_response(req: &HttpRequest, cache: &PageCache, body: Arc<str>) -> HttpResponse {
    set_cache_directive(req, CacheDirective::StaticHtml);

    let etag_value = cache.etag();
    let x_release = HeaderName::from_static("x-release");
    let release_value = HeaderValue::from_str(&cache.generation_hex())
        .unwrap_or_else(|_| HeaderValue::from_static("invalid-release"));
    let etag_header = HeaderValue::from_str(&etag_value)
        .unwrap_or_else(|_| HeaderValue::from_static("\"invalid-etag\""));

    if let Some(candidate) = req.headers().get(IF_NONE_MATCH)
        && let Ok(tag_str) = candidate.to_str()
        && tag_str
            .split(',')
            .any(|candidate_tag| candidate_tag.trim() == etag_value)
    {
        return HttpResponse::NotModified()
            .insert_header((VARY, HeaderValue::from_static("Accept-Encoding")))
            .insert_header((ETAG, etag_header))
            .insert_header((x_release, release_value))
            .finish();
    }

    HttpResponse::Ok()
        .content_type(HTML_CONTENT_TYPE)
        .insert_header((VARY, HeaderValue::from_static("Accept-Encoding")))
        .insert_header((ETAG, etag_header))
        .insert_header((x_release, release_value))
        .body(body.to_string())
}

/// HTML that must not be stored anywhere (filtered views, admin, login).
pub fn uncached_html_response(req: &HttpRequest, body: String) -> HttpResponse {
    set_cache_directive(req, CacheDirective::NoStore);
    HttpResponse::Ok().content_type(HTML_CONTENT_TYPE).body(body)
}

fn current_epoch_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_millis() as u64)
        .unwrap_or(0)
}
