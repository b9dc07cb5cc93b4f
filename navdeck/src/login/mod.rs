// This file is part of the product NavDeck.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use crate::iam::LOGIN_PATH;
use actix_web::web;

mod handlers;
pub mod types;

/// Login routes: the form, sign-in, sign-out and the session status probe.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope(LOGIN_PATH)
            .route("", web::get().to(handlers::login_page))
            .route("", web::post().to(handlers::handle_login))
            .route("/logout", web::post().to(handlers::handle_logout))
            .route("/status", web::get().to(handlers::auth_status)),
    );
}
