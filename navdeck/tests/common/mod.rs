// This file is part of the product NavDeck.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

#![allow(dead_code)]

use actix_http::Request;
use actix_web::cookie::Cookie;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, web};
use navdeck::app_state::AppState;
use navdeck::catalog::ManualClock;
use navdeck::config::ValidatedConfig;
use navdeck::headers;
use navdeck::iam::{AccessGate, AdminAuth};
use navdeck::runtime_paths::RuntimePaths;
use navdeck::util::test_config::{TEST_ADMIN_PASSWORD, TestConfigBuilder};
use navdeck::util::test_fixtures::TestFixtureRoot;
use navdeck::{admin, login, public};
use std::sync::Arc;

pub const ADMIN_PATH: &str = "/config";

pub struct TestHarness {
    pub fixture: TestFixtureRoot,
    pub config: Arc<ValidatedConfig>,
    pub runtime_paths: RuntimePaths,
    pub app_state: Arc<AppState>,
    pub admin_auth: Arc<AdminAuth>,
    pub clock: Arc<ManualClock>,
}

pub struct AuthSession {
    pub jwt_token: String,
    pub jwt_id: String,
    pub cookie: Cookie<'static>,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_config(TestConfigBuilder::new().with_admin_path(ADMIN_PATH))
    }

    pub fn with_config(builder: TestConfigBuilder) -> Self {
        let fixture = TestFixtureRoot::new_unique("http-suite").expect("fixture root");
        let config = Arc::new(builder.build());
        let runtime_paths = fixture.runtime_paths(&config).expect("runtime paths");

        let clock = Arc::new(ManualClock::new(1_700_000_000_000));
        let app_state = Arc::new(AppState::with_clock(
            &config.app.name,
            runtime_paths.clone(),
            clock.clone(),
        ));
        let admin_auth = Arc::new(AdminAuth::new(&config));

        Self {
            fixture,
            config,
            runtime_paths,
            app_state,
            admin_auth,
            clock,
        }
    }

    /// Issues a session the same way a successful `POST /login` does.
    pub fn admin_session(&self) -> AuthSession {
        let (token, claims) = self
            .admin_auth
            .login(TEST_ADMIN_PASSWORD)
            .expect("admin login");
        let cookie = self
            .admin_auth
            .jwt()
            .create_auth_cookie(&token, &claims)
            .into_owned();
        AuthSession {
            jwt_token: token,
            jwt_id: claims.jti,
            cookie,
        }
    }

    pub fn admin_url(&self, suffix: &str) -> String {
        format!("{}{}", self.config.admin.path, suffix)
    }

    pub fn seed_data(&self, json: &str) {
        std::fs::write(&self.runtime_paths.data_file, json).expect("seed data file");
    }

    pub fn read_data(&self) -> serde_json::Value {
        let raw = std::fs::read_to_string(&self.runtime_paths.data_file).expect("data file");
        serde_json::from_str(&raw).expect("data json")
    }

    pub fn build_app(
        &self,
    ) -> App<
        impl ServiceFactory<
            ServiceRequest,
            Config = (),
            Response = ServiceResponse<impl actix_web::body::MessageBody + use<>>,
            Error = actix_web::Error,
            InitError = (),
        > + use<>,
    > {
        let admin_path = self.config.admin.path.clone();
        let admin_path_for_routes = admin_path.clone();

        App::new()
            .app_data(web::Data::from(self.config.clone()))
            .app_data(web::Data::from(self.admin_auth.clone()))
            .app_data(web::Data::from(self.app_state.clone()))
            .wrap(AccessGate::new(&admin_path))
            .wrap(headers::Headers::new(&admin_path))
            .configure(move |cfg| admin::configure(cfg, &admin_path_for_routes))
            .configure(login::configure)
            .configure(public::configure)
            .service(actix_files::Files::new(
                "/icons",
                self.runtime_paths.icons_dir.clone(),
            ))
            .default_service(web::route().to(public::handlers::not_found))
    }
}

/// Finishes a test request carrying the session cookie.
pub fn with_session(req: actix_web::test::TestRequest, session: &AuthSession) -> Request {
    req.cookie(session.cookie.clone()).to_request()
}

pub fn location(resp: &ServiceResponse<impl actix_web::body::MessageBody>) -> String {
    resp.headers()
        .get("Location")
        .expect("location header")
        .to_str()
        .expect("location string")
        .to_string()
}

pub fn header(resp: &ServiceResponse<impl actix_web::body::MessageBody>, name: &str) -> Option<String> {
    resp.headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}
