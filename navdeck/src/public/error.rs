// This file is part of the product NavDeck.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use crate::templates::{ErrorPageContext, TemplateEngine, render_minijinja_template};
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, Result};

#[derive(Clone)]
pub struct ErrorRenderer {
    app_name: String,
}

impl ErrorRenderer {
    pub fn new(app_name: String) -> Self {
        Self { app_name }
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }
}

pub fn serve_404(
    renderer: &ErrorRenderer,
    template_engine: Option<&dyn TemplateEngine>,
) -> Result<HttpResponse> {
    Ok(render_error_page(
        renderer.app_name(),
        template_engine,
        StatusCode::NOT_FOUND,
        "error_404.html",
        fallback_404_html,
    ))
}

pub fn serve_500(
    renderer: &ErrorRenderer,
    template_engine: Option<&dyn TemplateEngine>,
) -> Result<HttpResponse> {
    Ok(render_error_page(
        renderer.app_name(),
        template_engine,
        StatusCode::INTERNAL_SERVER_ERROR,
        "error_500.html",
        fallback_500_html,
    ))
}

fn render_error_page(
    app_name: &str,
    template_engine: Option<&dyn TemplateEngine>,
    status: StatusCode,
    template: &str,
    fallback: fn(&str) -> String,
) -> HttpResponse {
    let context = ErrorPageContext::new(app_name).to_value();

    let html = match template_engine {
        Some(engine) => match render_minijinja_template(engine, template, context) {
            Ok(html) => html,
            Err(e) => {
                log::error!("Failed to render {} error template: {}", status.as_u16(), e);
                fallback(app_name)
            }
        },
        None => fallback(app_name),
    };

    HttpResponse::build(status)
        .content_type("text/html; charset=utf-8")
        .insert_header(("Cache-Control", "no-cache, no-store, must-revalidate"))
        .insert_header(("Pragma", "no-cache"))
        .insert_header(("Expires", "0"))
        .body(html)
}

fn fallback_404_html(app_name: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html><head><title>404 - Page Not Found | {}</title></head>
<body><h1>404 - Page Not Found</h1></body></html>"#,
        app_name
    )
}

fn fallback_500_html(app_name: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html><head><title>500 - Internal Server Error | {}</title></head>
<body><h1>500 - Internal Server Error</h1></body></html>"#,
        app_name
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates::MiniJinjaEngine;
    use actix_web::body::to_bytes;

    #[actix_web::test]
    async fn templated_404_carries_app_name() {
        let engine = MiniJinjaEngine::new();
        let renderer = ErrorRenderer::new("Deck".to_string());

        let res = serve_404(&renderer, Some(&engine)).unwrap();

        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        let body = to_bytes(res.into_body()).await.unwrap();
        let html = String::from_utf8(body.to_vec()).unwrap();
        assert!(html.contains("404 - Page Not Found | Deck"));
    }

    #[actix_web::test]
    async fn fallback_without_engine() {
        let renderer = ErrorRenderer::new("Deck".to_string());

        let res = serve_500(&renderer, None).unwrap();

        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = to_bytes(res.into_body()).await.unwrap();
        assert!(String::from_utf8_lossy(&body).contains("500 - Internal Server Error"));
    }
}
