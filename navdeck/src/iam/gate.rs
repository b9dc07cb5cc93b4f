// This file is part of the product NavDeck.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::jwt::Claims;
use super::service::AdminAuth;
use actix_web::body::EitherBody;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready};
use actix_web::http::{Method, header::LOCATION};
use actix_web::web::Data;
use actix_web::{Error, HttpMessage, HttpRequest, HttpResponse};
use futures_util::future::LocalBoxFuture;
use std::future::{Ready, ready};
use std::rc::Rc;

pub const LOGIN_PATH: &str = "/login";

/// Authentication helpers on a request that passed through [`AccessGate`].
pub trait AuthRequest {
    fn jwt_claims(&self) -> Option<Claims>;

    fn is_authenticated(&self) -> bool {
        self.jwt_claims().is_some()
    }
}

impl AuthRequest for HttpRequest {
    fn jwt_claims(&self) -> Option<Claims> {
        self.extensions().get::<Claims>().cloned()
    }
}

/// True for the admin path itself and anything below it.
pub fn is_admin_path(path: &str, admin_path: &str) -> bool {
    path == admin_path
        || path
            .strip_prefix(admin_path)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// Resolves the session cookie for every request and enforces the two gate
/// rules: anonymous requests under the admin path go to the login page, and
/// an authenticated visit to the login page goes to the admin path.
pub struct AccessGate {
    admin_path: Rc<str>,
}

impl AccessGate {
    pub fn new(admin_path: &str) -> Self {
        Self {
            admin_path: Rc::from(admin_path),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AccessGate
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = AccessGateMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AccessGateMiddleware {
            service: Rc::new(service),
            admin_path: self.admin_path.clone(),
        }))
    }
}

pub struct AccessGateMiddleware<S> {
    service: Rc<S>,
    admin_path: Rc<str>,
}

impl<S, B> Service<ServiceRequest> for AccessGateMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if let Some(auth) = req.app_data::<Data<AdminAuth>>() {
            let cookie_name = auth.jwt().cookie_name().to_string();
            if let Some(cookie) = req.cookie(&cookie_name)
                && let Some(claims) = auth.authenticate(cookie.value())
            {
                req.extensions_mut().insert(claims);
            }
        } else {
            log::error!("AccessGate installed without AdminAuth app data; treating all requests as anonymous");
        }

        let authenticated = req.request().is_authenticated();
        let path = req.path().to_string();

        let redirect = if !authenticated && is_admin_path(&path, &self.admin_path) {
            log::debug!("Anonymous request for {} sent to login", path);
            Some(login_redirect(&req))
        } else if authenticated && path == LOGIN_PATH && req.method() == Method::GET {
            Some(self.admin_path.to_string())
        } else {
            None
        };

        if let Some(location) = redirect {
            let (req, _) = req.into_parts();
            let response = HttpResponse::Found()
                .insert_header((LOCATION, location))
                .finish()
                .map_into_right_body();
            return Box::pin(async move { Ok(ServiceResponse::new(req, response)) });
        }

        let service = self.service.clone();
        Box::pin(async move {
            service
                .call(req)
                .await
                .map(ServiceResponse::map_into_left_body)
        })
    }
}

/// Page views remember where to come back to; API calls just go to login.
fn login_redirect(req: &ServiceRequest) -> String {
    if req.method() != Method::GET {
        return LOGIN_PATH.to_string();
    }
    let current = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or(req.uri().path());
    format!("{}?return_path={}", LOGIN_PATH, urlencoding::encode(current))
}
