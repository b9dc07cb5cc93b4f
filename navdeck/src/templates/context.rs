// This file is part of the product NavDeck.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use crate::catalog::Document;
use minijinja::{Value, context};

#[derive(Debug, Clone)]
pub struct ErrorPageContext {
    app_name: String,
}

impl ErrorPageContext {
    pub fn new(app_name: &str) -> Self {
        Self {
            app_name: app_name.to_string(),
        }
    }

    pub fn to_value(&self) -> Value {
        context! {
            app_name => &self.app_name
        }
    }
}

/// The public navigation page, optionally narrowed by a query or a tag.
pub struct IndexPageContext<'a> {
    pub app_name: &'a str,
    pub description: &'a str,
    pub admin_path: &'a str,
    pub categories: &'a Document,
    pub tags: &'a [String],
    pub query: Option<&'a str>,
    pub active_tag: Option<&'a str>,
}

impl IndexPageContext<'_> {
    pub fn to_value(&self) -> Value {
        context! {
            app_name => self.app_name,
            description => self.description,
            admin_path => self.admin_path,
            categories => Value::from_serialize(self.categories),
            tags => self.tags,
            query => self.query.unwrap_or(""),
            active_tag => self.active_tag,
            filtered => self.query.is_some() || self.active_tag.is_some()
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoginPageContext {
    app_name: String,
    error: Option<String>,
    return_path: Option<String>,
}

impl LoginPageContext {
    pub fn new(app_name: &str) -> Self {
        Self {
            app_name: app_name.to_string(),
            error: None,
            return_path: None,
        }
    }

    pub fn with_error(mut self, error: &str) -> Self {
        self.error = Some(error.to_string());
        self
    }

    pub fn with_return_path(mut self, return_path: Option<String>) -> Self {
        self.return_path = return_path;
        self
    }

    pub fn to_value(&self) -> Value {
        context! {
            app_name => &self.app_name,
            error => &self.error,
            return_path => &self.return_path
        }
    }
}

pub struct AdminPageContext<'a> {
    pub app_name: &'a str,
    pub admin_path: &'a str,
    pub categories: &'a Document,
    pub allowed_extensions: &'a [String],
    pub max_upload_mb: u64,
}

impl AdminPageContext<'_> {
    pub fn to_value(&self) -> Value {
        let accept = self
            .allowed_extensions
            .iter()
            .map(|ext| format!(".{}", ext))
            .collect::<Vec<_>>()
            .join(",");
        context! {
            app_name => self.app_name,
            admin_path => self.admin_path,
            categories => Value::from_serialize(self.categories),
            upload_accept => accept,
            max_upload_mb => self.max_upload_mb
        }
    }
}
