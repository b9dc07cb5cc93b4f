// This file is part of the product NavDeck.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use env_logger::Logger;
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;

/// `(target prefix, level emitted, level it is rewritten to)`.
pub type LevelRule = (String, Level, Level);

/// Rules applied to every server run: actix worker start-up chatter is
/// demoted so `info` stays about requests and catalog changes.
pub fn default_level_rules() -> Vec<LevelRule> {
    vec![
        ("actix_server".to_string(), Level::Info, Level::Debug),
        ("mio".to_string(), Level::Debug, Level::Trace),
    ]
}

/// Builds the env_logger backend with the stable line format used in all logs.
/// `RUST_LOG` still refines the configured level.
pub fn build_logger(level: LevelFilter) -> Logger {
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .target(env_logger::Target::Stdout)
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] {}: {}",
                chrono::Utc::now().format("%Y-%m-%d %H:%M:%S%.3f UTC"),
                record.level(),
                record.target(),
                record.args()
            )
        })
        .build()
}

struct LevelModifierLogger {
    inner: Logger,
    rules: Vec<LevelRule>,
}

impl LevelModifierLogger {
    fn new(inner: Logger, rules: Vec<LevelRule>) -> Self {
        LevelModifierLogger { inner, rules }
    }

    fn get_new_level(&self, target: &str, original_level: Level) -> Level {
        self.rules
            .iter()
            .find(|(prefix, from, _)| target.starts_with(prefix.as_str()) && *from == original_level)
            .map(|(_, _, to)| *to)
            .unwrap_or(original_level)
    }
}

impl Log for LevelModifierLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        let new_metadata = Metadata::builder()
            .level(self.get_new_level(metadata.target(), metadata.level()))
            .target(metadata.target())
            .build();
        self.inner.enabled(&new_metadata)
    }

    fn log(&self, record: &Record) {
        let new_record = Record::builder()
            .level(self.get_new_level(record.target(), record.level()))
            .target(record.target())
            .args(*record.args())
            .module_path(record.module_path())
            .file(record.file())
            .line(record.line())
            .build();
        self.inner.log(&new_record);
    }

    fn flush(&self) {
        self.inner.flush();
    }
}

pub fn init_logger(rules: Vec<LevelRule>, logger: Logger) -> Result<(), SetLoggerError> {
    let max_level = logger.filter();
    log::set_boxed_logger(Box::new(LevelModifierLogger::new(logger, rules)))?;
    log::set_max_level(max_level);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn modifier() -> LevelModifierLogger {
        LevelModifierLogger::new(build_logger(LevelFilter::Info), default_level_rules())
    }

    #[test]
    fn demotes_matching_target_and_level() {
        let logger = modifier();
        assert_eq!(
            logger.get_new_level("actix_server::builder", Level::Info),
            Level::Debug
        );
    }

    #[test]
    fn keeps_other_levels_for_matching_target() {
        let logger = modifier();
        assert_eq!(
            logger.get_new_level("actix_server::builder", Level::Warn),
            Level::Warn
        );
    }

    #[test]
    fn keeps_unrelated_targets() {
        let logger = modifier();
        assert_eq!(
            logger.get_new_level("navdeck::catalog", Level::Info),
            Level::Info
        );
    }
}
