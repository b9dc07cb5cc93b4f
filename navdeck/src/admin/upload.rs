// This file is part of the product NavDeck.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::types::{ApiResult, UploadQuery};
use crate::app_state::AppState;
use crate::config::{UploadConfig, ValidatedConfig};
use crate::runtime_paths::ICONS_DIR_NAME;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, Result, web};
use futures_util::StreamExt;
use log::{info, warn};
use serde_json::{Value, json};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::Path;

const MAX_NAME_ATTEMPTS: u32 = 16;
/// Stem used when nothing of the uploaded name survives sanitizing.
const FALLBACK_STEM: &str = "icon";

#[derive(Debug, PartialEq)]
pub enum UploadError {
    MissingName,
    MissingExtension,
    EmptyBody,
    DisallowedType(String),
    TooLarge(usize),
    Io(String),
}

impl std::fmt::Display for UploadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UploadError::MissingName => write!(f, "filename is required"),
            UploadError::MissingExtension => write!(f, "filename needs a file extension"),
            UploadError::EmptyBody => write!(f, "file is empty"),
            UploadError::DisallowedType(ext) => write!(f, "file type '{}' is not allowed", ext),
            UploadError::TooLarge(limit) => write!(f, "file exceeds the {} byte limit", limit),
            UploadError::Io(msg) => write!(f, "upload failed: {}", msg),
        }
    }
}

impl std::error::Error for UploadError {}

impl UploadError {
    fn status(&self) -> StatusCode {
        match self {
            UploadError::TooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            UploadError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

/// `POST {admin}/api/icons?filename=<name>` with the raw file as body.
pub(super) async fn upload_icon(
    query: web::Query<UploadQuery>,
    mut payload: web::Payload,
    config: web::Data<ValidatedConfig>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let upload = &config.upload;
    let file_name = match query
        .filename
        .as_deref()
        .ok_or(UploadError::MissingName)
        .and_then(|name| sanitize_file_name(name, upload))
    {
        Ok(name) => name,
        Err(err) => return Ok(upload_error_response(&err)),
    };

    let limit = upload.max_file_size_bytes();
    let mut body = web::BytesMut::new();
    while let Some(chunk) = payload.next().await {
        let chunk = chunk?;
        if body.len() + chunk.len() > limit {
            warn!("Rejected icon upload '{}': over {} bytes", file_name, limit);
            return Ok(upload_error_response(&UploadError::TooLarge(limit)));
        }
        body.extend_from_slice(&chunk);
    }
    if body.is_empty() {
        return Ok(upload_error_response(&UploadError::EmptyBody));
    }

    let icons_dir = app_state.runtime_paths.icons_dir.clone();
    let bytes = body.freeze();
    let stored = tokio::task::spawn_blocking(move || store_icon(&icons_dir, &file_name, &bytes))
        .await
        .map_err(|err| UploadError::Io(err.to_string()))
        .and_then(|result| result);

    match stored {
        Ok(stored_name) => {
            info!("Stored uploaded icon {}", stored_name);
            app_state.page_cache.invalidate("icon uploaded");
            Ok(HttpResponse::Ok().json(ApiResult::ok(json!({
                "url": format!("/{}/{}", ICONS_DIR_NAME, stored_name)
            }))))
        }
        Err(err) => {
            warn!("Icon upload failed: {}", err);
            Ok(upload_error_response(&err))
        }
    }
}

fn upload_error_response(err: &UploadError) -> HttpResponse {
    HttpResponse::build(err.status()).json(ApiResult::<Value>::failure(err.to_string()))
}

/// Reduces a client-supplied name to its last path component, turns
/// whitespace into `-`, keeps only `[A-Za-z0-9._-]` and checks the extension.
pub fn sanitize_file_name(raw: &str, upload: &UploadConfig) -> Result<String, UploadError> {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or(raw).trim();
    if base.is_empty() {
        return Err(UploadError::MissingName);
    }
    let Some((raw_stem, raw_extension)) = base.rsplit_once('.') else {
        return Err(UploadError::MissingExtension);
    };
    let extension = raw_extension.trim().to_lowercase();
    if extension.is_empty() {
        return Err(UploadError::MissingExtension);
    }
    let allowed = upload
        .allowed_extensions
        .iter()
        .any(|allowed| allowed.eq_ignore_ascii_case(&extension));
    if !allowed {
        return Err(UploadError::DisallowedType(extension));
    }

    let stem: String = raw_stem
        .trim()
        .chars()
        .map(|c| if c.is_whitespace() { '-' } else { c })
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();
    let stem = stem.trim_start_matches(['.', '-']);
    let stem = if stem.is_empty() { FALLBACK_STEM } else { stem };
    Ok(format!("{}.{}", stem, extension))
}

/// Writes `bytes` as `<epoch_ms>-<name>`, never overwriting an existing file.
fn store_icon(icons_dir: &Path, file_name: &str, bytes: &[u8]) -> Result<String, UploadError> {
    let mut stamp = chrono::Utc::now().timestamp_millis();
    for _ in 0..MAX_NAME_ATTEMPTS {
        let stored_name = format!("{}-{}", stamp, file_name);
        let path = icons_dir.join(&stored_name);
        match fs::OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(mut file) => {
                if let Err(err) = file.write_all(bytes).and_then(|_| file.sync_all()) {
                    let _ = fs::remove_file(&path);
                    return Err(UploadError::Io(err.to_string()));
                }
                return Ok(stored_name);
            }
            Err(err) if err.kind() == ErrorKind::AlreadyExists => stamp += 1,
            Err(err) => return Err(UploadError::Io(err.to_string())),
        }
    }
    Err(UploadError::Io("could not pick a free file name".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::test_config::TestConfigBuilder;
    use crate::util::test_fixtures::TestFixtureRoot;

    fn upload_config() -> UploadConfig {
        TestConfigBuilder::new().build().upload
    }

    #[test]
    fn sanitize_keeps_safe_names() {
        let upload = upload_config();
        assert_eq!(sanitize_file_name("logo.png", &upload).unwrap(), "logo.png");
        assert_eq!(
            sanitize_file_name("My Site Logo.PNG", &upload).unwrap(),
            "My-Site-Logo.png"
        );
    }

    #[test]
    fn sanitize_strips_directories_and_odd_characters() {
        let upload = upload_config();
        assert_eq!(
            sanitize_file_name("../../etc/pass wd.svg", &upload).unwrap(),
            "pass-wd.svg"
        );
        assert_eq!(
            sanitize_file_name("C:\\icons\\<b>x</b>.png", &upload).unwrap(),
            "b.png"
        );
        assert_eq!(sanitize_file_name("..png", &upload).unwrap(), "icon.png");
    }

    #[test]
    fn sanitize_rejects_other_extensions() {
        let upload = upload_config();
        assert_eq!(
            sanitize_file_name("script.html", &upload),
            Err(UploadError::DisallowedType("html".to_string()))
        );
        assert_eq!(
            sanitize_file_name("noext", &upload),
            Err(UploadError::MissingExtension)
        );
        assert_eq!(
            sanitize_file_name("trailing.", &upload),
            Err(UploadError::MissingExtension)
        );
        assert_eq!(sanitize_file_name("  ", &upload), Err(UploadError::MissingName));
    }

    #[test]
    fn sanitize_falls_back_when_stem_has_no_ascii() {
        let upload = upload_config();
        assert_eq!(sanitize_file_name("图标.png", &upload).unwrap(), "icon.png");
        assert_eq!(
            sanitize_file_name("网站 logo.svg", &upload).unwrap(),
            "logo.svg"
        );
        assert_eq!(
            sanitize_file_name("图标.exe", &upload),
            Err(UploadError::DisallowedType("exe".to_string()))
        );
    }

    #[test]
    fn store_icon_never_overwrites() {
        let fixture = TestFixtureRoot::new_unique("upload-store").expect("fixture");
        let dir = fixture.path();

        let first = store_icon(dir, "a.png", b"one").unwrap();
        let second = store_icon(dir, "a.png", b"two").unwrap();

        assert!(first.ends_with("-a.png"));
        assert_ne!(first, second);
        assert_eq!(fs::read(dir.join(&first)).unwrap(), b"one");
        assert_eq!(fs::read(dir.join(&second)).unwrap(), b"two");
    }
}
