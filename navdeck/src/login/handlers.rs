// This file is part of the product NavDeck.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::types::{AuthStatusResponse, LoginForm, LoginPageQuery, LogoutResponse};
use crate::app_state::AppState;
use crate::config::ValidatedConfig;
use crate::iam::{AdminAuth, AuthError, AuthRequest, LOGIN_PATH, is_admin_path};
use crate::public::cache::uncached_html_response;
use crate::public::error;
use crate::templates::{LoginPageContext, render_minijinja_template};
use actix_web::http::StatusCode;
use actix_web::http::header::{ACCEPT, LOCATION};
use actix_web::{HttpRequest, HttpResponse, Result, web};

const CLEAR_SITE_DATA: &str = "Clear-Site-Data";

/// `GET /login`. Authenticated visitors never get here; the gate redirects
/// them to the admin page first.
pub(super) async fn login_page(
    req: HttpRequest,
    query: web::Query<LoginPageQuery>,
    config: web::Data<ValidatedConfig>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let return_path = sanitize_return_path(query.return_path.as_deref(), &config.admin.path);
    let context = LoginPageContext::new(&config.app.name).with_return_path(return_path);
    render_login_page(&req, &app_state, context, StatusCode::OK)
}

/// `POST /login`
pub(super) async fn handle_login(
    req: HttpRequest,
    form: web::Form<LoginForm>,
    config: web::Data<ValidatedConfig>,
    auth: web::Data<AdminAuth>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let LoginForm {
        password,
        return_path,
    } = form.into_inner();
    let return_path = sanitize_return_path(return_path.as_deref(), &config.admin.path);

    let verifier = auth.clone();
    let outcome = tokio::task::spawn_blocking(move || verifier.login(&password))
        .await
        .map_err(|err| {
            log::error!("Login task failed: {}", err);
            actix_web::error::ErrorInternalServerError("Login failed")
        })?;

    match outcome {
        Ok((token, claims)) => {
            let cookie = auth.jwt().create_auth_cookie(&token, &claims);
            let location = return_path.unwrap_or_else(|| config.admin.path.clone());
            Ok(HttpResponse::SeeOther()
                .cookie(cookie)
                .insert_header((LOCATION, location))
                .finish())
        }
        Err(AuthError::InvalidPassword) => {
            let context = LoginPageContext::new(&config.app.name)
                .with_error(&AuthError::InvalidPassword.to_string())
                .with_return_path(return_path);
            render_login_page(&req, &app_state, context, StatusCode::UNAUTHORIZED)
        }
        Err(err) => {
            log::error!("Failed to issue session token: {}", err);
            error::serve_500(
                &app_state.error_renderer,
                Some(app_state.templates.as_ref()),
            )
        }
    }
}

/// `POST /login/logout`. Always succeeds; a request without a live session
/// still gets its cookie cleared.
pub(super) async fn handle_logout(
    req: HttpRequest,
    auth: web::Data<AdminAuth>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse> {
    if let Some(claims) = req.jwt_claims() {
        auth.logout(&claims);
    }
    app_state.page_cache.invalidate("logout");

    let cookie = auth.jwt().create_logout_cookie();
    if wants_json(&req) {
        return Ok(HttpResponse::Ok()
            .cookie(cookie)
            .insert_header((CLEAR_SITE_DATA, "\"cache\""))
            .json(LogoutResponse {
                success: true,
                redirect_url: LOGIN_PATH.to_string(),
            }));
    }

    Ok(HttpResponse::SeeOther()
        .cookie(cookie)
        .insert_header((CLEAR_SITE_DATA, "\"cache\""))
        .insert_header((LOCATION, LOGIN_PATH))
        .finish())
}

/// `GET /login/status`
pub(super) async fn auth_status(req: HttpRequest) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(AuthStatusResponse {
        authenticated: req.is_authenticated(),
    }))
}

fn render_login_page(
    req: &HttpRequest,
    app_state: &AppState,
    context: LoginPageContext,
    status: StatusCode,
) -> Result<HttpResponse> {
    match render_minijinja_template(
        app_state.templates.as_ref(),
        "login/login_page.html",
        context.to_value(),
    ) {
        Ok(html) => {
            let mut response = uncached_html_response(req, html);
            *response.status_mut() = status;
            Ok(response)
        }
        Err(err) => {
            log::error!("Failed to render login page: {}", err);
            error::serve_500(
                &app_state.error_renderer,
                Some(app_state.templates.as_ref()),
            )
        }
    }
}

/// Only paths inside the admin area are honoured as post-login targets.
pub(crate) fn sanitize_return_path(candidate: Option<&str>, admin_path: &str) -> Option<String> {
    let candidate = candidate?.trim();
    let path_only = candidate.split(['?', '#']).next().unwrap_or(candidate);
    if candidate.starts_with("//") || candidate.contains('\\') || path_only.contains("..") {
        return None;
    }
    if is_admin_path(path_only, admin_path) {
        Some(candidate.to_string())
    } else {
        None
    }
}

fn wants_json(req: &HttpRequest) -> bool {
    req.headers()
        .get(ACCEPT)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|accept| accept.contains("application/json"))
}
