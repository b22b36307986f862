//! `catalog` command-line entry point.
//!
//! # Responsibility
//! - Resolve configuration from flags and environment.
//! - Open the catalog database and dispatch one subcommand.

mod cli;
mod commands;

use anyhow::{anyhow, Context};
use catalog_core::db::open_db;
use catalog_core::{default_log_level, init_logging};
use cli::CommandLine;
use log::{error, info};
use std::path::{Path, PathBuf};

fn main() -> anyhow::Result<()> {
    let args = CommandLine::parse_args();

    if let Some(log_dir) = args.log_dir.as_deref() {
        let level = args.log_level.as_deref().unwrap_or(default_log_level());
        let log_dir = absolute_dir(log_dir)?;
        init_logging(level, &log_dir.to_string_lossy()).map_err(|err| anyhow!(err))?;
    }

    let conn = open_db(&args.db)
        .with_context(|| format!("failed to open catalog `{}`", args.db.display()))?;

    let name = args.command.name();
    info!("event=cli_command module=cli status=start command={name}");
    let mut stdout = std::io::stdout().lock();
    let result = commands::run(&conn, args.command, args.json, &mut stdout);
    match &result {
        Ok(()) => info!("event=cli_command module=cli status=ok command={name}"),
        Err(_) => error!("event=cli_command module=cli status=error command={name}"),
    }
    result
}

fn absolute_dir(path: &Path) -> anyhow::Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().context("failed to resolve current directory")?;
    Ok(cwd.join(path))
}
