//! CLI entry point for the Socratic code tutor.

mod cli;
mod commands;
mod output;
mod surface;

use std::path::{Path, PathBuf};

use clap::Parser;
use tutor_observability::ObservabilityConfig;

use crate::cli::Cli;

/// How many parent directories to search for project config.
const MAX_ANCESTORS: usize = 32;

/// Load configuration files into the process environment.
///
/// `dotenvy` never overrides a variable that is already set, so the first
/// source to define a key wins. Order: 1) process env  2) `.tutor/env` in the
/// nearest project dir  3) `~/.tutor/env`  4) nearest `.env`.
fn load_tutor_config() {
    let cwd = std::env::current_dir().ok();

    if let Some(project_env) = cwd.as_deref().and_then(|dir| find_upwards(dir, ".tutor/env")) {
        let _ = dotenvy::from_path(&project_env);
    }
    if let Some(home) = dirs::home_dir() {
        let global_env = home.join(".tutor").join("env");
        if global_env.exists() {
            let _ = dotenvy::from_path(&global_env);
        }
    }
    if let Some(env_file) = cwd.as_deref().and_then(|dir| find_upwards(dir, ".env")) {
        let _ = dotenvy::from_path(&env_file);
    }
}

fn find_upwards(start: &Path, relative: &str) -> Option<PathBuf> {
    start
        .ancestors()
        .take(MAX_ANCESTORS)
        .map(|dir| dir.join(relative))
        .find(|candidate| candidate.is_file())
}

fn init_observability(verbose: bool) {
    let mut config = ObservabilityConfig::from_env().with_version(env!("CARGO_PKG_VERSION"));
    if config.log_level.is_none() {
        config = config.with_log_level(if verbose { "info" } else { "warn" });
    }
    config = config.with_ansi(console::colors_enabled_stderr());
    if let Err(e) = tutor_observability::init(config) {
        output::warning(&format!("Observability init failed (continuing): {}", e));
    }
}

#[tokio::main]
async fn main() {
    load_tutor_config();
    let cli = Cli::parse();
    output::init(cli.output);
    init_observability(cli.verbose);

    let result = commands::handle(cli).await;
    tutor_observability::shutdown();

    if let Err(e) = result {
        output::error(&e.to_string());
        std::process::exit(1);
    }
}
