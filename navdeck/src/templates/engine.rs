// This file is part of the product NavDeck.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use minijinja::{Environment, Value, default_auto_escape_callback};

pub trait TemplateEngine: Send + Sync {
    fn render(&self, template_name: &str, context: Value) -> Result<String, minijinja::Error>;
}

pub struct MiniJinjaEngine {
    env: Environment<'static>,
}

impl MiniJinjaEngine {
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_auto_escape_callback(default_auto_escape_callback);
        env.set_loader(embedded_template_loader);
        env.add_filter("safe_href", safe_href);
        Self { env }
    }
}

impl Default for MiniJinjaEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateEngine for MiniJinjaEngine {
    fn render(&self, template_name: &str, context: Value) -> Result<String, minijinja::Error> {
        let tmpl = self.env.get_template(template_name)?;
        tmpl.render(context)
    }
}

/// Link targets other than http(s), site-relative paths and fragments are
/// replaced by `#`.
fn safe_href(value: String) -> String {
    let trimmed = value.trim();
    let lower = trimmed.to_ascii_lowercase();
    let allowed = lower.starts_with("http://")
        || lower.starts_with("https://")
        || lower.starts_with('#')
        || (lower.starts_with('/') && !lower.starts_with("//"));
    if allowed {
        trimmed.to_string()
    } else {
        "#".to_string()
    }
}

/// Template loader for minijinja that loads from embedded sources
fn embedded_template_loader(name: &str) -> Result<Option<String>, minijinja::Error> {
    let template_content = match name {
        "layout.html" => Some(include_str!("../public/templates/layout.html")),

        // Error pages
        "error_404.html" => Some(include_str!("../public/templates/error_404.html")),
        "error_500.html" => Some(include_str!("../public/templates/error_500.html")),

        "public/index.html" => Some(include_str!("../public/templates/index.html")),
        "login/login_page.html" => Some(include_str!("../login/templates/login_page.html")),
        "admin/admin_page.html" => Some(include_str!("../admin/templates/admin_page.html")),

        _ => None,
    };

    Ok(template_content.map(|s| s.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use minijinja::context;

    #[test]
    fn every_embedded_template_parses() {
        let engine = MiniJinjaEngine::new();
        for name in [
            "layout.html",
            "error_404.html",
            "error_500.html",
            "public/index.html",
            "login/login_page.html",
            "admin/admin_page.html",
        ] {
            assert!(engine.env.get_template(name).is_ok(), "{} failed to load", name);
        }
    }

    #[test]
    fn safe_href_blocks_script_urls() {
        assert_eq!(safe_href("https://example.com".into()), "https://example.com");
        assert_eq!(safe_href("/icons/a.png".into()), "/icons/a.png");
        assert_eq!(safe_href("#".into()), "#");
        assert_eq!(safe_href("javascript:alert(1)".into()), "#");
        assert_eq!(safe_href(" JavaScript:alert(1)".into()), "#");
        assert_eq!(safe_href("//evil.example".into()), "#");
    }

    #[test]
    fn unknown_template_is_an_error() {
        let engine = MiniJinjaEngine::new();
        assert!(engine.render("missing.html", context! {}).is_err());
    }
}
