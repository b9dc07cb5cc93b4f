// This file is part of the product NavDeck.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use crate::catalog::Site;
use crate::catalog::search::parse_tags;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
pub struct CategoryPayload {
    #[serde(default)]
    pub name: String,
    pub icon: Option<String>,
}

/// Tags arrive either as a list or as one comma-separated field.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum TagsInput {
    List(Vec<String>),
    Text(String),
}

impl TagsInput {
    pub fn into_tags(self) -> Vec<String> {
        match self {
            TagsInput::List(tags) => tags,
            TagsInput::Text(raw) => parse_tags(&raw),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SitePayload {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
    pub desc: Option<String>,
    pub icon: Option<String>,
    pub tags: Option<TagsInput>,
    /// Anything else the client sent is stored alongside the site.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SitePayload {
    pub fn into_site(self) -> Site {
        Site {
            name: self.name,
            url: self.url,
            desc: self.desc,
            icon: self.icon,
            tags: self.tags.map(TagsInput::into_tags).unwrap_or_default(),
            extra: self.extra,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UploadQuery {
    pub filename: Option<String>,
}

/// The `{"success": .., "error": ..}` envelope every mutation answers with.
#[derive(Debug, Serialize)]
pub struct ApiResult<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(flatten)]
    pub payload: Option<T>,
}

impl<T> ApiResult<T> {
    pub fn ok(payload: T) -> Self {
        Self {
            success: true,
            error: None,
            payload: Some(payload),
        }
    }
}

impl ApiResult<Value> {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(message.into()),
            payload: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn tags_accept_list_or_text() {
        let from_list: SitePayload = serde_json::from_value(json!({
            "name": "A", "url": "https://a", "tags": ["x", "y"]
        }))
        .unwrap();
        assert_eq!(from_list.into_site().tags, vec!["x", "y"]);

        let from_text: SitePayload = serde_json::from_value(json!({
            "name": "A", "url": "https://a", "tags": "x, y\u{FF0C}z"
        }))
        .unwrap();
        assert_eq!(from_text.into_site().tags, vec!["x", "y", "z"]);
    }

    #[test]
    fn extra_site_fields_are_kept() {
        let payload: SitePayload = serde_json::from_value(json!({
            "name": "A", "url": "https://a", "pinned": true
        }))
        .unwrap();
        let site = payload.into_site();
        assert_eq!(site.extra.get("pinned"), Some(&json!(true)));
        assert!(site.tags.is_empty());
    }

    #[test]
    fn result_envelope_shapes() {
        let ok = serde_json::to_value(ApiResult::ok(json!({"id": "1"}))).unwrap();
        assert_eq!(ok, json!({"success": true, "id": "1"}));

        let failed = serde_json::to_value(ApiResult::failure("category not found")).unwrap();
        assert_eq!(failed, json!({"success": false, "error": "category not found"}));
    }
}
