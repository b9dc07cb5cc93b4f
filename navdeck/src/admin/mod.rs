// This file is part of the product NavDeck.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use actix_web::web;

mod handlers;
pub mod types;
pub mod upload;

/// Admin page and JSON API under `admin_path`. Access is enforced by
/// [`crate::iam::AccessGate`], which wraps the whole application.
pub fn configure(cfg: &mut web::ServiceConfig, admin_path: &str) {
    cfg.service(
        web::scope(admin_path)
            .app_data(web::JsonConfig::default().error_handler(handlers::json_error_handler))
            .route("", web::get().to(handlers::admin_page))
            .route("/", web::get().to(handlers::admin_page))
            .service(
                web::resource("/api/categories")
                    .route(web::get().to(handlers::list_categories))
                    .route(web::post().to(handlers::create_category)),
            )
            .service(
                web::resource("/api/categories/{id}")
                    .route(web::put().to(handlers::update_category))
                    .route(web::delete().to(handlers::delete_category)),
            )
            .route(
                "/api/categories/{id}/sites",
                web::post().to(handlers::create_site),
            )
            .route(
                "/api/categories/{id}/sites/{index}",
                web::delete().to(handlers::delete_site),
            )
            .route("/api/icons", web::post().to(upload::upload_icon)),
    );
}
