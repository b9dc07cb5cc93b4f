// This file is part of the product NavDeck.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::types::{ApiResult, CategoryPayload, SitePayload};
use crate::app_state::AppState;
use crate::catalog::CatalogError;
use crate::config::ValidatedConfig;
use crate::headers::{CacheDirective, set_cache_directive};
use crate::public::cache::uncached_html_response;
use crate::public::error;
use crate::templates::{AdminPageContext, render_minijinja_template};
use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, Result, web};
use serde_json::{Value, json};

/// `GET {admin}`: the management page.
pub(super) async fn admin_page(
    req: HttpRequest,
    config: web::Data<ValidatedConfig>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let document = match app_state
        .catalog
        .run_blocking(|catalog| Ok(catalog.get_categories()))
        .await
    {
        Ok(document) => document,
        Err(err) => {
            log::error!("Failed to load categories for admin page: {}", err);
            return error::serve_500(
                &app_state.error_renderer,
                Some(app_state.templates.as_ref()),
            );
        }
    };

    let context = AdminPageContext {
        app_name: &config.app.name,
        admin_path: &config.admin.path,
        categories: &document,
        allowed_extensions: &config.upload.allowed_extensions,
        max_upload_mb: config.upload.max_file_size_mb,
    }
    .to_value();

    match render_minijinja_template(
        app_state.templates.as_ref(),
        "admin/admin_page.html",
        context,
    ) {
        Ok(html) => Ok(uncached_html_response(&req, html)),
        Err(err) => {
            log::error!("Failed to render admin page: {}", err);
            error::serve_500(
                &app_state.error_renderer,
                Some(app_state.templates.as_ref()),
            )
        }
    }
}

/// `GET {admin}/api/categories`
pub(super) async fn list_categories(
    req: HttpRequest,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse> {
    set_cache_directive(&req, CacheDirective::NoStore);
    let outcome = app_state
        .catalog
        .run_blocking(|catalog| Ok(catalog.get_categories()))
        .await;
    Ok(match outcome {
        Ok(document) => HttpResponse::Ok().json(ApiResult::ok(json!({ "categories": document }))),
        Err(err) => catalog_error_response(&err),
    })
}

/// `POST {admin}/api/categories`
pub(super) async fn create_category(
    payload: web::Json<CategoryPayload>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let CategoryPayload { name, icon } = payload.into_inner();
    let outcome = app_state
        .catalog
        .run_blocking(move |catalog| catalog.add_category(&name, icon))
        .await;
    Ok(match outcome {
        Ok(category) => HttpResponse::Ok().json(ApiResult::ok(json!({ "category": category }))),
        Err(err) => catalog_error_response(&err),
    })
}

/// `PUT {admin}/api/categories/{id}`
pub(super) async fn update_category(
    path: web::Path<String>,
    payload: web::Json<CategoryPayload>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let id = path.into_inner();
    let CategoryPayload { name, icon } = payload.into_inner();
    let outcome = app_state
        .catalog
        .run_blocking(move |catalog| catalog.update_category(&id, &name, icon))
        .await;
    Ok(match outcome {
        Ok(category) => HttpResponse::Ok().json(ApiResult::ok(json!({ "category": category }))),
        Err(err) => catalog_error_response(&err),
    })
}

/// `DELETE {admin}/api/categories/{id}`. Deleting an unknown id is not an
/// error; `deleted` tells the two cases apart.
pub(super) async fn delete_category(
    path: web::Path<String>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let id = path.into_inner();
    let outcome = app_state
        .catalog
        .run_blocking(move |catalog| catalog.delete_category(&id))
        .await;
    Ok(match outcome {
        Ok(deleted) => HttpResponse::Ok().json(ApiResult::ok(json!({ "deleted": deleted }))),
        Err(err) => catalog_error_response(&err),
    })
}

/// `POST {admin}/api/categories/{id}/sites`
pub(super) async fn create_site(
    path: web::Path<String>,
    payload: web::Json<SitePayload>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let category_id = path.into_inner();
    let payload = payload.into_inner();
    if payload.name.trim().is_empty() || payload.url.trim().is_empty() {
        return Ok(catalog_error_response(&CatalogError::Validation(
            "site name and url are required".to_string(),
        )));
    }
    let site = payload.into_site();
    let outcome = app_state
        .catalog
        .run_blocking(move |catalog| catalog.add_site(&category_id, site))
        .await;
    Ok(match outcome {
        Ok(site) => HttpResponse::Ok().json(ApiResult::ok(json!({ "site": site }))),
        Err(err) => catalog_error_response(&err),
    })
}

/// `DELETE {admin}/api/categories/{id}/sites/{index}`
pub(super) async fn delete_site(
    path: web::Path<(String, String)>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let (category_id, raw_index) = path.into_inner();
    let Ok(index) = raw_index.parse::<usize>() else {
        return Ok(catalog_error_response(&CatalogError::Validation(
            "site index must be a non-negative integer".to_string(),
        )));
    };
    let outcome = app_state
        .catalog
        .run_blocking(move |catalog| catalog.delete_site(&category_id, index))
        .await;
    Ok(match outcome {
        Ok(deleted) => HttpResponse::Ok().json(ApiResult::ok(json!({ "deleted": deleted }))),
        Err(err) => catalog_error_response(&err),
    })
}

pub(super) fn catalog_error_response(err: &CatalogError) -> HttpResponse {
    let status = match err {
        CatalogError::NotFound(_) => StatusCode::NOT_FOUND,
        CatalogError::Validation(_) => StatusCode::BAD_REQUEST,
        CatalogError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    HttpResponse::build(status).json(ApiResult::<Value>::failure(err.to_string()))
}

/// Malformed JSON bodies get the same envelope as every other failure.
pub(super) fn json_error_handler(
    err: actix_web::error::JsonPayloadError,
    _req: &HttpRequest,
) -> actix_web::Error {
    let message = format!("invalid request body: {}", err);
    let response = HttpResponse::BadRequest().json(ApiResult::<Value>::failure(message));
    actix_web::error::InternalError::from_response(err, response).into()
}
