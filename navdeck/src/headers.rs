// This file is part of the product NavDeck.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use crate::iam::{LOGIN_PATH, is_admin_path};
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::{
    CACHE_CONTROL, CONTENT_SECURITY_POLICY, HeaderName, HeaderValue, PRAGMA,
    X_CONTENT_TYPE_OPTIONS, X_FRAME_OPTIONS,
};
use actix_web::{Error, HttpMessage, HttpRequest};
use futures_util::future::{Ready, ok};
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;

const PUBLIC_ASSET_CACHE_CONTROL: &str = "public, max-age=86400";
const STATIC_HTML_CACHE_CONTROL: &str =
    "public, max-age=0, must-revalidate, stale-while-revalidate=30";
const DYNAMIC_CACHE_CONTROL: &str = "no-cache, no-store, must-revalidate";
const DEFAULT_CSP: &str = "default-src 'self'; img-src 'self' data: https:; style-src 'self' 'unsafe-inline'; script-src 'self' 'unsafe-inline'; object-src 'none'; frame-ancestors 'self'; base-uri 'self'; form-action 'self';";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum CacheDirective {
    /// Long-lived for uploaded assets, no-store for everything else.
    #[default]
    Default,
    /// Revalidated HTML carrying an ETag.
    StaticHtml,
    NoStore,
}

pub fn set_cache_directive(req: &HttpRequest, directive: CacheDirective) {
    req.extensions_mut().insert(directive);
}

/// Adds the baseline security headers and the `Cache-Control` picked by the
/// handler through [`set_cache_directive`].
pub struct Headers {
    admin_path: Rc<str>,
}

impl Headers {
    pub fn new(admin_path: &str) -> Self {
        Headers {
            admin_path: Rc::from(admin_path),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for Headers
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = HeadersMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(HeadersMiddleware {
            service: Rc::new(service),
            admin_path: self.admin_path.clone(),
        })
    }
}

pub struct HeadersMiddleware<S> {
    service: Rc<S>,
    admin_path: Rc<str>,
}

impl<S, B> Service<ServiceRequest> for HeadersMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    fn poll_ready(
        &self,
        cx: &mut core::task::Context<'_>,
    ) -> core::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let fut = self.service.call(req);
        let admin_path = self.admin_path.clone();

        Box::pin(async move {
            let mut res = fut.await?;

            let directive = res
                .request()
                .extensions()
                .get::<CacheDirective>()
                .copied()
                .unwrap_or_default();

            let headers = res.headers_mut();
            headers.insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
            headers.insert(X_FRAME_OPTIONS, HeaderValue::from_static("SAMEORIGIN"));
            headers.insert(
                HeaderName::from_static("referrer-policy"),
                HeaderValue::from_static("strict-origin-when-cross-origin"),
            );
            if !headers.contains_key(CONTENT_SECURITY_POLICY) {
                headers.insert(CONTENT_SECURITY_POLICY, HeaderValue::from_static(DEFAULT_CSP));
            }

            let path = res.request().path().to_string();
            let protected = is_admin_path(&path, &admin_path) || path.starts_with(LOGIN_PATH);

            if protected {
                apply_no_cache_headers(&mut res);
            } else {
                match directive {
                    CacheDirective::NoStore => apply_no_cache_headers(&mut res),
                    CacheDirective::StaticHtml => {
                        res.headers_mut().insert(
                            CACHE_CONTROL,
                            HeaderValue::from_static(STATIC_HTML_CACHE_CONTROL),
                        );
                    }
                    CacheDirective::Default => {
                        if is_public_asset(&path) && res.status().is_success() {
                            res.headers_mut().insert(
                                CACHE_CONTROL,
                                HeaderValue::from_static(PUBLIC_ASSET_CACHE_CONTROL),
                            );
                        } else {
                            apply_no_cache_headers(&mut res);
                        }
                    }
                }
            }

            Ok(res)
        })
    }
}

fn apply_no_cache_headers<B>(res: &mut ServiceResponse<B>) {
    res.headers_mut().insert(
        CACHE_CONTROL,
        HeaderValue::from_static(DYNAMIC_CACHE_CONTROL),
    );
    res.headers_mut()
        .insert(PRAGMA, HeaderValue::from_static("no-cache"));
}

fn is_public_asset(path: &str) -> bool {
    path.starts_with("/icons/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, HttpRequest, HttpResponse, test, web};

    async fn static_html(req: HttpRequest) -> HttpResponse {
        set_cache_directive(&req, CacheDirective::StaticHtml);
        HttpResponse::Ok().body("page")
    }

    async fn plain() -> HttpResponse {
        HttpResponse::Ok().body("ok")
    }

    #[actix_web::test]
    async fn handler_directive_controls_public_pages() {
        let app = test::init_service(
            App::new()
                .wrap(Headers::new("/config"))
                .route("/", web::get().to(static_html))
                .route("/api/categories", web::get().to(plain)),
        )
        .await;

        let res = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
        assert_eq!(
            res.headers().get(CACHE_CONTROL).unwrap(),
            STATIC_HTML_CACHE_CONTROL
        );
        assert_eq!(res.headers().get(X_CONTENT_TYPE_OPTIONS).unwrap(), "nosniff");

        let res = test::call_service(
            &app,
            test::TestRequest::get().uri("/api/categories").to_request(),
        )
        .await;
        assert_eq!(res.headers().get(CACHE_CONTROL).unwrap(), DYNAMIC_CACHE_CONTROL);
    }

    #[actix_web::test]
    async fn admin_and_login_are_never_cached() {
        let app = test::init_service(
            App::new()
                .wrap(Headers::new("/config"))
                .route("/config", web::get().to(static_html))
                .route("/login", web::get().to(static_html)),
        )
        .await;

        for uri in ["/config", "/login"] {
            let res = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
            assert_eq!(res.headers().get(CACHE_CONTROL).unwrap(), DYNAMIC_CACHE_CONTROL);
            assert_eq!(res.headers().get(PRAGMA).unwrap(), "no-cache");
        }
    }

    #[actix_web::test]
    async fn icons_get_long_lived_cache() {
        let app = test::init_service(
            App::new()
                .wrap(Headers::new("/config"))
                .route("/icons/{file}", web::get().to(plain)),
        )
        .await;

        let res = test::call_service(
            &app,
            test::TestRequest::get().uri("/icons/a.png").to_request(),
        )
        .await;
        assert_eq!(
            res.headers().get(CACHE_CONTROL).unwrap(),
            PUBLIC_ASSET_CACHE_CONTROL
        );
    }
}
