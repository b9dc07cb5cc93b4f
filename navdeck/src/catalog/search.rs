// This file is part of the product NavDeck.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::types::{Document, Site};
use std::collections::BTreeMap;

/// Keeps sites whose name, description or any tag contains `query`
/// (case-insensitive). Categories left without sites are dropped. A blank
/// query returns the document as is.
pub fn search(document: &Document, query: &str) -> Document {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return document.clone();
    }
    retain_sites(document, |site| site_matches(site, &needle))
}

/// Keeps sites carrying `tag` (case-insensitive exact match).
pub fn filter_by_tag(document: &Document, tag: &str) -> Document {
    let wanted = tag.trim().to_lowercase();
    if wanted.is_empty() {
        return document.clone();
    }
    retain_sites(document, |site| {
        site.tags.iter().any(|t| t.trim().to_lowercase() == wanted)
    })
}

/// Every tag in use, sorted case-insensitively, first spelling wins.
pub fn all_tags(document: &Document) -> Vec<String> {
    let mut tags: BTreeMap<String, String> = BTreeMap::new();
    for site in document.iter().flat_map(|category| category.items.iter()) {
        for tag in &site.tags {
            let trimmed = tag.trim();
            if trimmed.is_empty() {
                continue;
            }
            tags.entry(trimmed.to_lowercase())
                .or_insert_with(|| trimmed.to_string());
        }
    }
    tags.into_values().collect()
}

/// Splits a free-text tag field on ASCII or full-width commas.
pub fn parse_tags(raw: &str) -> Vec<String> {
    raw.split([',', '\u{FF0C}'])
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

fn retain_sites<F>(document: &Document, keep: F) -> Document
where
    F: Fn(&Site) -> bool,
{
    document
        .iter()
        .filter_map(|category| {
            let items: Vec<Site> = category.items.iter().filter(|s| keep(s)).cloned().collect();
            if items.is_empty() {
                return None;
            }
            let mut filtered = category.clone();
            filtered.items = items;
            Some(filtered)
        })
        .collect()
}

fn site_matches(site: &Site, needle: &str) -> bool {
    site.name.to_lowercase().contains(needle)
        || site
            .desc
            .as_deref()
            .is_some_and(|desc| desc.to_lowercase().contains(needle))
        || site.tags.iter().any(|tag| tag.to_lowercase().contains(needle))
}
