// This file is part of the product NavDeck.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use actix_web::rt::System;
use actix_web::{App, HttpServer, middleware::Logger, web};
use log::info;
use std::path::PathBuf;
use std::sync::Arc;

use navdeck::app_state::AppState;
use navdeck::bootstrap::{self, BootstrapResult};
use navdeck::config::ValidatedConfig;
use navdeck::iam::{AccessGate, AdminAuth};
use navdeck::runtime_paths::RuntimePaths;
use navdeck::{admin, headers, login, public, util};

const HELP_TEXT: &str = "\
NavDeck - personal navigation site

Usage: navdeck [-C <root>]

Options:
  -C <root>    Runtime directory holding config.yaml and site data (default: .)
  -h, --help   Show this help
";

fn main() {
    let exit_code = run();
    std::process::exit(exit_code);
}

fn run() -> i32 {
    let parsed_args = match parse_args() {
        Ok(args) => args,
        Err(error) => {
            eprintln!("❌ Invalid command line arguments: {}", error);
            eprintln!("❌ Use -C <root> to set the runtime directory.");
            return 1;
        }
    };

    if matches!(parsed_args.mode, RunMode::Help) {
        print!("{}", HELP_TEXT);
        return 0;
    }

    let bootstrap = match bootstrap::bootstrap_runtime(&parsed_args.runtime_root) {
        Ok(result) => result,
        Err(error) => {
            eprintln!("❌ Bootstrap error: {}", error);
            eprintln!("❌ Application cannot start with invalid configuration.");
            return 1;
        }
    };

    match System::new().block_on(run_server(bootstrap)) {
        Ok(()) => 0,
        Err(error) => {
            eprintln!("❌ Server failed to start: {}", error);
            1
        }
    }
}

async fn run_server(bootstrap: BootstrapResult) -> std::io::Result<()> {
    let validated_config = Arc::new(bootstrap.validated_config);
    let runtime_paths = bootstrap.runtime_paths;

    let logger = util::build_logger(validated_config.log_level_filter());
    util::init_logger(util::default_level_rules(), logger).map_err(|error| {
        eprintln!("❌ Failed to initialize logger: {}", error);
        std::io::Error::other(error.to_string())
    })?;

    log_startup_info(&validated_config, &runtime_paths);
    if bootstrap.created_config {
        info!("Created {}", runtime_paths.config_file.display());
    }

    let admin_auth = Arc::new(AdminAuth::new(&validated_config));
    info!("✅ Admin access gate initialized");

    let app_state = Arc::new(AppState::new(
        &validated_config.app.name,
        runtime_paths.clone(),
    ));
    info!(
        "✅ App state initialized with app name: {}",
        validated_config.app.name
    );

    let admin_path = validated_config.admin.path.clone();
    let workers = validated_config.server.workers;
    let icons_dir = runtime_paths.icons_dir.clone();

    let factory = {
        let config_for_app = validated_config.clone();
        let admin_auth = admin_auth.clone();
        let app_state = app_state.clone();

        move || {
            let admin_path_clone = admin_path.clone();

            App::new()
                .app_data(web::Data::from(config_for_app.clone()))
                .app_data(web::Data::from(admin_auth.clone()))
                .app_data(web::Data::from(app_state.clone()))
                .wrap(AccessGate::new(&admin_path))
                .wrap(headers::Headers::new(&admin_path))
                .wrap(Logger::new(
                    r#"%a "%r" %s %b "%{Referer}i" "%{User-Agent}i" %T"#,
                ))
                .configure(move |cfg| admin::configure(cfg, &admin_path_clone))
                .configure(login::configure)
                .configure(public::configure)
                .service(actix_files::Files::new("/icons", icons_dir.clone()))
                .default_service(web::route().to(public::handlers::not_found))
        }
    };

    let (host, port) = validated_config.server.address_tuple();
    HttpServer::new(factory)
        .workers(workers)
        .bind((host, port))?
        .run()
        .await
}

fn log_startup_info(config: &ValidatedConfig, runtime_paths: &RuntimePaths) {
    info!("Starting {} - {}", config.app.name, config.app.description);
    info!("Workers: {}", config.server.workers);
    info!(
        "Listening on http://{}:{}",
        config.server.host, config.server.port
    );
    info!(
        "Admin panel available at: http://{}:{}{}",
        config.server.host, config.server.port, config.admin.path
    );
    info!("Data file (canonical): {}", runtime_paths.data_file.display());
    info!(
        "Icons directory (canonical): {}",
        runtime_paths.icons_dir.display()
    );
    info!("Config file: {}", runtime_paths.config_file.display());
    info!("Runtime root: {}", runtime_paths.root.display());

    if let Ok(current_dir) = std::env::current_dir() {
        info!("Working directory: {}", current_dir.display());
    }
}

#[derive(Debug)]
enum RunMode {
    Serve,
    Help,
}

#[derive(Debug)]
struct ParsedArgs {
    runtime_root: PathBuf,
    mode: RunMode,
}

fn parse_args() -> Result<ParsedArgs, String> {
    parse_args_from(std::env::args().skip(1))
}

fn parse_args_from<I>(args: I) -> Result<ParsedArgs, String>
where
    I: IntoIterator<Item = String>,
{
    let args: Vec<String> = args.into_iter().collect();
    if args.iter().any(|arg| is_help_flag(arg)) {
        return Ok(ParsedArgs {
            runtime_root: PathBuf::from("."),
            mode: RunMode::Help,
        });
    }

    let mut args = args.into_iter();
    let mut runtime_root = PathBuf::from(".");

    while let Some(arg) = args.next() {
        if arg == "--" {
            continue;
        } else if arg == "-C" {
            let value = args
                .next()
                .ok_or_else(|| "Missing value for -C".to_string())?;
            runtime_root = PathBuf::from(value);
        } else {
            return Err(format!("Unknown argument: {}", arg));
        }
    }

    let runtime_root = make_runtime_root_absolute(runtime_root)?;
    Ok(ParsedArgs {
        runtime_root,
        mode: RunMode::Serve,
    })
}

fn is_help_flag(arg: &str) -> bool {
    arg == "-h" || arg == "--help"
}

fn make_runtime_root_absolute(runtime_root: PathBuf) -> Result<PathBuf, String> {
    if runtime_root.is_absolute() {
        return Ok(runtime_root);
    }

    let current_dir = std::env::current_dir()
        .map_err(|error| format!("Failed to resolve current directory: {}", error))?;
    Ok(current_dir.join(runtime_root))
}

#[cfg(test)]
mod tests {
    use super::{RunMode, parse_args_from};

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn parse_args_defaults_to_serving_from_current_dir() {
        let parsed = parse_args_from(Vec::new()).expect("parse args");
        assert!(matches!(parsed.mode, RunMode::Serve));
        assert!(parsed.runtime_root.is_absolute());
    }

    #[test]
    fn parse_args_accepts_runtime_root() {
        let parsed = parse_args_from(args(&["-C", "/srv/navdeck"])).expect("parse args");
        assert!(matches!(parsed.mode, RunMode::Serve));
        assert_eq!(parsed.runtime_root, std::path::PathBuf::from("/srv/navdeck"));
    }

    #[test]
    fn parse_args_rejects_missing_root_value() {
        let error = parse_args_from(args(&["-C"])).expect_err("missing value");
        assert!(error.contains("-C"));
    }

    #[test]
    fn parse_args_rejects_unknown_arguments() {
        let error = parse_args_from(args(&["serve"])).expect_err("unknown");
        assert!(error.contains("serve"));
    }

    #[test]
    fn help_flag_wins_over_other_arguments() {
        let parsed = parse_args_from(args(&["-C", "/tmp", "--help"])).expect("parse args");
        assert!(matches!(parsed.mode, RunMode::Help));
    }
}
