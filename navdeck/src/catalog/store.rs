// This file is part of the product NavDeck.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::types::Document;
use log::{debug, warn};
use std::error::Error;
use std::fmt;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

const MAX_TEMP_ATTEMPTS: u32 = 100;

#[derive(Debug)]
pub struct StoreError {
    message: String,
}

impl StoreError {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for StoreError {}

/// The single JSON file holding the navigation document.
///
/// Every call goes to disk; the store keeps no copy of the document, so two
/// handlers never observe different in-memory versions. There is no lock
/// around read-modify-write cycles: concurrent writers race and the last
/// rename wins.
#[derive(Debug, Clone)]
pub struct CatalogStore {
    path: PathBuf,
}

impl CatalogStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the document for display. A missing, unreadable, blank or
    /// malformed file, or one whose top level is not an array, reads as an
    /// empty document.
    pub fn load(&self) -> Document {
        self.load_for_update().unwrap_or_else(|err| {
            warn!("{}; treating as empty", err);
            Document::new()
        })
    }

    /// Reads the document ahead of a mutation. Only a missing or blank file
    /// is empty here; anything that exists but does not parse is an error,
    /// so a save never replaces content that could not be read.
    pub fn load_for_update(&self) -> Result<Document, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!("Data file {} does not exist yet", self.path.display());
                return Ok(Document::new());
            }
            Err(err) => {
                return Err(StoreError::new(format!(
                    "Failed to read data file {}: {}",
                    self.path.display(),
                    err
                )));
            }
        };

        if content.trim().is_empty() {
            return Ok(Document::new());
        }

        let value: serde_json::Value = serde_json::from_str(&content).map_err(|err| {
            StoreError::new(format!(
                "Data file {} is not valid JSON: {}",
                self.path.display(),
                err
            ))
        })?;

        if !value.is_array() {
            return Err(StoreError::new(format!(
                "Data file {} does not contain a JSON array",
                self.path.display()
            )));
        }

        serde_json::from_value(value).map_err(|err| {
            StoreError::new(format!(
                "Data file {} has malformed categories: {}",
                self.path.display(),
                err
            ))
        })
    }

    /// Replaces the file with the pretty-printed document. On error the
    /// previous file content is left in place.
    pub fn save(&self, document: &Document) -> Result<(), StoreError> {
        let mut content = serde_json::to_string_pretty(document)
            .map_err(|err| StoreError::new(format!("Failed to serialize categories: {}", err)))?;
        content.push('\n');

        let parent = self
            .path
            .parent()
            .ok_or_else(|| StoreError::new("Data file path has no parent directory"))?;
        fs::create_dir_all(parent).map_err(|err| {
            StoreError::new(format!(
                "Failed to create data directory {}: {}",
                parent.display(),
                err
            ))
        })?;
        let file_name = self
            .path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| StoreError::new("Data file name is not valid UTF-8"))?;

        let (mut file, temp_path) = create_temp_file(parent, file_name)?;

        if let Err(err) = file.write_all(content.as_bytes()) {
            let _ = fs::remove_file(&temp_path);
            return Err(StoreError::new(format!(
                "Failed to write data temp file: {}",
                err
            )));
        }
        if let Err(err) = file.sync_all() {
            let _ = fs::remove_file(&temp_path);
            return Err(StoreError::new(format!(
                "Failed to sync data temp file: {}",
                err
            )));
        }
        drop(file);

        if let Err(err) = fs::rename(&temp_path, &self.path) {
            let _ = fs::remove_file(&temp_path);
            return Err(StoreError::new(format!(
                "Failed to replace data file: {}",
                err
            )));
        }

        debug!(
            "Saved {} categories to {}",
            document.len(),
            self.path.display()
        );
        Ok(())
    }
}

fn create_temp_file(parent: &Path, file_name: &str) -> Result<(fs::File, PathBuf), StoreError> {
    for attempt in 0..MAX_TEMP_ATTEMPTS {
        let temp_path = parent.join(format!(
            ".{}.tmp.{}.{}",
            file_name,
            std::process::id(),
            attempt
        ));
        match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&temp_path)
        {
            Ok(file) => return Ok((file, temp_path)),
            Err(err) if err.kind() == ErrorKind::AlreadyExists => continue,
            Err(err) => {
                return Err(StoreError::new(format!(
                    "Failed to create data temp file: {}",
                    err
                )));
            }
        }
    }
    Err(StoreError::new(
        "Failed to create data temp file after multiple attempts",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::types::{Category, Site};
    use crate::util::test_fixtures::TestFixtureRoot;

    fn store_in(fixture: &TestFixtureRoot) -> CatalogStore {
        CatalogStore::new(fixture.data_file())
    }

    fn sample_document() -> Document {
        let mut tools = Category::new("1700000000000".into(), "Tools".into(), Some("Folder".into()));
        tools.items.push(
            Site::new("Example", "https://example.com")
                .with_desc("An example")
                .with_tags(["demo", "web"]),
        );
        vec![
            tools,
            Category::new("1700000000001".into(), "Reading".into(), None),
        ]
    }

    #[test]
    fn load_missing_file_is_empty() {
        let fixture = TestFixtureRoot::new_unique("store-missing").expect("fixture");
        assert!(store_in(&fixture).load().is_empty());
    }

    #[test]
    fn load_blank_file_is_empty() {
        let fixture = TestFixtureRoot::new_unique("store-blank").expect("fixture");
        let store = store_in(&fixture);
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(store.path(), "  \n").unwrap();
        assert!(store.load().is_empty());
    }

    #[test]
    fn load_invalid_json_is_empty() {
        let fixture = TestFixtureRoot::new_unique("store-invalid").expect("fixture");
        let store = store_in(&fixture);
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(store.path(), "[{\"id\": ").unwrap();
        assert!(store.load().is_empty());
    }

    #[test]
    fn load_non_array_json_is_empty() {
        let fixture = TestFixtureRoot::new_unique("store-object").expect("fixture");
        let store = store_in(&fixture);
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(store.path(), "{\"id\": \"1\", \"title\": \"Tools\"}").unwrap();
        assert!(store.load().is_empty());
    }

    #[test]
    fn load_directory_in_place_of_file_is_empty() {
        let fixture = TestFixtureRoot::new_unique("store-dir").expect("fixture");
        let store = store_in(&fixture);
        fs::create_dir_all(store.path()).unwrap();
        assert!(store.load().is_empty());
    }

    #[test]
    fn load_for_update_rejects_malformed_entries() {
        let fixture = TestFixtureRoot::new_unique("store-strict").expect("fixture");
        let store = store_in(&fixture);
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(
            store.path(),
            r#"[{"id":"1","title":"Keep","items":[]},{"id":"2","title":"Broken","items":"oops"}]"#,
        )
        .unwrap();

        assert!(store.load().is_empty());
        let err = store.load_for_update().unwrap_err();
        assert!(err.to_string().contains("malformed categories"));
    }

    #[test]
    fn load_for_update_treats_missing_and_blank_as_empty() {
        let fixture = TestFixtureRoot::new_unique("store-strict-empty").expect("fixture");
        let store = store_in(&fixture);
        assert!(store.load_for_update().expect("missing").is_empty());

        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(store.path(), "\n").unwrap();
        assert!(store.load_for_update().expect("blank").is_empty());

        fs::write(store.path(), "not json").unwrap();
        assert!(store.load_for_update().is_err());
    }

    #[test]
    fn save_creates_parent_and_writes_pretty_json() {
        let fixture = TestFixtureRoot::new_unique("store-save").expect("fixture");
        let store = store_in(&fixture);
        assert!(!store.path().parent().unwrap().exists());

        store.save(&sample_document()).expect("save");

        let written = fs::read_to_string(store.path()).expect("read back");
        assert!(written.starts_with("[\n  {\n    \"id\": \"1700000000000\""));
        assert!(written.ends_with("]\n"));
        assert_eq!(store.load(), sample_document());
    }

    #[test]
    fn save_of_load_preserves_content() {
        let fixture = TestFixtureRoot::new_unique("store-roundtrip").expect("fixture");
        let store = store_in(&fixture);
        let original = r#"[{"id":"1","title":"Tools","icon":"/icons/x.png","items":[{"name":"A","url":"https://a","desc":"first","tags":["x"],"rating":5}],"collapsed":false}]"#;
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(store.path(), original).unwrap();

        let loaded = store.load();
        store.save(&loaded).expect("save");

        let before: serde_json::Value = serde_json::from_str(original).unwrap();
        let after: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn failed_save_leaves_existing_file_untouched() {
        let fixture = TestFixtureRoot::new_unique("store-fail").expect("fixture");
        // The data file path is an existing non-empty directory, so the
        // final rename must fail.
        let store = store_in(&fixture);
        fs::create_dir_all(store.path().join("occupied")).unwrap();

        let result = store.save(&sample_document());

        assert!(result.is_err());
        assert!(store.path().join("occupied").is_dir());
        let leftovers: Vec<_> = fs::read_dir(store.path().parent().unwrap())
            .unwrap()
            .flatten()
            .filter(|entry| entry.file_name().to_string_lossy().contains(".tmp."))
            .collect();
        assert!(leftovers.is_empty());
    }
}
