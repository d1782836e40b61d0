mod cli;
mod commands;
mod store;

use clap::Parser;
use cli::{Cli, Commands, FILE_GUARD};
use dialin_config::Config;
use eyre::{Result, WrapErr};
use std::path::Path;
use tracing_subscriber::EnvFilter;

fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "config file missing, using defaults");
        return Ok(Config::default());
    }
    let text = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("failed to read config {}", path.display()))?;
    let cfg = dialin_config::load_toml(&text)
        .wrap_err_with(|| format!("failed to parse config {}", path.display()))?;
    Ok(cfg)
}

fn init_tracing(cli: &Cli, cfg: &Config) {
    // CLI flag wins; a config-file level applies when the flag is left at
    // its default.
    let level = if cli.log_level == "info" {
        cfg.logging.level.clone().unwrap_or_else(|| "info".into())
    } else {
        cli.log_level.clone()
    };
    let filter = EnvFilter::try_new(&level).unwrap_or_else(|_| EnvFilter::new("info"));

    if let Some(file) = &cfg.logging.file {
        let path = Path::new(file);
        let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
        let name = path.file_name().map_or_else(|| "dialin.log".into(), |n| n.to_os_string());
        let appender = match cfg.logging.rotation.as_deref() {
            Some("daily") => tracing_appender::rolling::daily(dir, name),
            Some("hourly") => tracing_appender::rolling::hourly(dir, name),
            _ => tracing_appender::rolling::never(dir, name),
        };
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let _ = FILE_GUARD.set(guard);
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .with_ansi(false)
            .with_writer(writer)
            .init();
    } else if cli.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    let cfg = load_config(&cli.config)?;
    init_tracing(&cli, &cfg);
    cfg.validate().wrap_err("invalid configuration")?;

    match &cli.cmd {
        Commands::Analyze {
            sensory,
            prep,
            dry_run,
        } => commands::run_analyze(&cfg, &cli.history, sensory, prep, *dry_run, cli.json),
        Commands::Suggest { seed, prep } => {
            commands::run_suggest(&cfg, &cli.history, *seed, prep, cli.json)
        }
        Commands::Model => commands::run_model(&cfg, &cli.history, cli.json),
        Commands::Export { out } => commands::run_export(&cli.history, out.as_deref()),
        Commands::Delete { index } => commands::run_delete(&cli.history, *index, cli.json),
    }
}
