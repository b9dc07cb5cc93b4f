// This file is part of the product NavDeck.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

//! Category and site mutations.
//!
//! The `push_*`/`remove_*`/`rename_*` functions edit a loaded [`Document`] in
//! memory. The store-level operations wrap each of them in a full
//! load/mutate/save cycle against a [`CatalogStore`].

use super::error::CatalogError;
use super::ids::{IdClock, next_category_id};
use super::store::CatalogStore;
use super::types::{Category, Document, Site, non_blank};

pub fn get_categories(store: &CatalogStore) -> Document {
    store.load()
}

pub fn add_category(
    store: &CatalogStore,
    clock: &dyn IdClock,
    name: &str,
    icon: Option<String>,
) -> Result<Category, CatalogError> {
    require_name(name, "category name is required")?;
    let mut document = store.load_for_update()?;
    let id = next_category_id(clock, &document);
    let category = push_category(&mut document, id, name, icon);
    store.save(&document)?;
    Ok(category)
}

/// Returns `Ok(false)` without writing when the id is unknown.
pub fn delete_category(store: &CatalogStore, id: &str) -> Result<bool, CatalogError> {
    let mut document = store.load_for_update()?;
    if !remove_category(&mut document, id) {
        return Ok(false);
    }
    store.save(&document)?;
    Ok(true)
}

pub fn update_category(
    store: &CatalogStore,
    id: &str,
    name: &str,
    icon: Option<String>,
) -> Result<Category, CatalogError> {
    require_name(name, "category name is required")?;
    let mut document = store.load_for_update()?;
    let category = rename_category(&mut document, id, name, icon)?;
    store.save(&document)?;
    Ok(category)
}

pub fn add_site(
    store: &CatalogStore,
    category_id: &str,
    site: Site,
) -> Result<Site, CatalogError> {
    let mut document = store.load_for_update()?;
    let site = push_site(&mut document, category_id, site)?;
    store.save(&document)?;
    Ok(site)
}

pub fn delete_site(
    store: &CatalogStore,
    category_id: &str,
    index: usize,
) -> Result<bool, CatalogError> {
    let mut document = store.load_for_update()?;
    if !remove_site(&mut document, category_id, index)? {
        return Ok(false);
    }
    store.save(&document)?;
    Ok(true)
}

fn require_name(name: &str, message: &str) -> Result<(), CatalogError> {
    if name.trim().is_empty() {
        return Err(CatalogError::Validation(message.to_string()));
    }
    Ok(())
}

pub fn push_category(
    document: &mut Document,
    id: String,
    title: &str,
    icon: Option<String>,
) -> Category {
    let category = Category::new(id, title.trim().to_string(), non_blank(icon));
    document.push(category.clone());
    category
}

/// Returns whether a category was removed. Its sites go with it.
pub fn remove_category(document: &mut Document, id: &str) -> bool {
    let before = document.len();
    document.retain(|category| category.id != id);
    document.len() != before
}

pub fn rename_category(
    document: &mut Document,
    id: &str,
    title: &str,
    icon: Option<String>,
) -> Result<Category, CatalogError> {
    let category = find_category_mut(document, id).ok_or_else(CatalogError::category_not_found)?;
    category.title = title.trim().to_string();
    category.icon = non_blank(icon);
    Ok(category.clone())
}

pub fn push_site(
    document: &mut Document,
    category_id: &str,
    site: Site,
) -> Result<Site, CatalogError> {
    let category =
        find_category_mut(document, category_id).ok_or_else(CatalogError::category_not_found)?;
    let site = normalize_site(site);
    category.items.push(site.clone());
    Ok(site)
}

/// Removes the site at `index`. An unknown category is a silent no-op
/// (`Ok(false)`); an index past the end is reported.
pub fn remove_site(
    document: &mut Document,
    category_id: &str,
    index: usize,
) -> Result<bool, CatalogError> {
    let Some(category) = find_category_mut(document, category_id) else {
        return Ok(false);
    };
    if index >= category.items.len() {
        return Err(CatalogError::site_not_found());
    }
    category.items.remove(index);
    Ok(true)
}

fn find_category_mut<'a>(document: &'a mut Document, id: &str) -> Option<&'a mut Category> {
    document.iter_mut().find(|category| category.id == id)
}

fn normalize_site(site: Site) -> Site {
    let mut site = site.with_placeholders();
    site.name = site.name.trim().to_string();
    site.url = site.url.trim().to_string();
    site.desc = non_blank(site.desc);
    site.icon = non_blank(site.icon);
    site.tags = normalize_tags(site.tags);
    site
}

/// Trims tags, drops blanks and repeats (first spelling wins, compared
/// case-insensitively).
pub fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    let mut result = Vec::new();
    for tag in tags {
        let trimmed = tag.trim();
        if trimmed.is_empty() {
            continue;
        }
        let key = trimmed.to_lowercase();
        if seen.contains(&key) {
            continue;
        }
        seen.push(key);
        result.push(trimmed.to_string());
    }
    result
}
