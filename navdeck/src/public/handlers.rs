// This file is part of the product NavDeck.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::cache::{cached_html_response, uncached_html_response};
use super::error;
use crate::app_state::AppState;
use crate::catalog::search::{all_tags, filter_by_tag, search};
use crate::config::ValidatedConfig;
use crate::headers::{CacheDirective, set_cache_directive};
use crate::templates::{IndexPageContext, render_minijinja_template};
use actix_web::{HttpRequest, HttpResponse, Result, web};
use log::{debug, error};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct IndexQuery {
    q: Option<String>,
    tag: Option<String>,
}

impl IndexQuery {
    fn query(&self) -> Option<&str> {
        self.q.as_deref().map(str::trim).filter(|q| !q.is_empty())
    }

    fn tag(&self) -> Option<&str> {
        self.tag.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }
}

pub async fn index(
    req: HttpRequest,
    query: web::Query<IndexQuery>,
    config: web::Data<ValidatedConfig>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let filtered = query.query().is_some() || query.tag().is_some();
    let cache = app_state.page_cache.as_ref();

    if !filtered && let Some(html) = cache.get(req.path()) {
        debug!("Serving {} from page cache", req.path());
        return Ok(cached_html_response(&req, cache, html));
    }

    let rendered_at = cache.generation();
    let document = match app_state
        .catalog
        .run_blocking(|catalog| Ok(catalog.get_categories()))
        .await
    {
        Ok(document) => document,
        Err(err) => {
            error!("Failed to load categories: {}", err);
            return error::serve_500(
                &app_state.error_renderer,
                Some(app_state.templates.as_ref()),
            );
        }
    };

    let tags = all_tags(&document);
    let mut view = document;
    if let Some(tag) = query.tag() {
        view = filter_by_tag(&view, tag);
    }
    if let Some(q) = query.query() {
        view = search(&view, q);
    }

    let context = IndexPageContext {
        app_name: &config.app.name,
        description: &config.app.description,
        admin_path: &config.admin.path,
        categories: &view,
        tags: &tags,
        query: query.query(),
        active_tag: query.tag(),
    }
    .to_value();

    let html = match render_minijinja_template(
        app_state.templates.as_ref(),
        "public/index.html",
        context,
    ) {
        Ok(html) => html,
        Err(err) => {
            error!("Failed to render index page: {}", err);
            return error::serve_500(
                &app_state.error_renderer,
                Some(app_state.templates.as_ref()),
            );
        }
    };

    if filtered {
        return Ok(uncached_html_response(&req, html));
    }

    let html = cache.insert(req.path(), html, rendered_at);
    if cache.generation() != rendered_at {
        return Ok(uncached_html_response(&req, html.to_string()));
    }
    Ok(cached_html_response(&req, cache, html))
}

/// `GET /api/categories`: the whole document as JSON.
pub async fn categories_json(
    req: HttpRequest,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse> {
    set_cache_directive(&req, CacheDirective::NoStore);
    match app_state
        .catalog
        .run_blocking(|catalog| Ok(catalog.get_categories()))
        .await
    {
        Ok(document) => Ok(HttpResponse::Ok().json(document)),
        Err(err) => {
            error!("Failed to load categories: {}", err);
            Ok(HttpResponse::InternalServerError()
                .json(serde_json::json!({"success": false, "error": err.to_string()})))
        }
    }
}

pub async fn not_found(app_state: web::Data<AppState>) -> Result<HttpResponse> {
    error::serve_404(
        &app_state.error_renderer,
        Some(app_state.templates.as_ref()),
    )
}
