//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

/// Keeps the non-blocking file writer alive for the process lifetime.
pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "dialin", version, about = "Espresso dial-in CLI")]
pub struct Cli {
    /// Path to config TOML (session, grinder, ranges, logging)
    #[arg(long, value_name = "FILE", default_value = "etc/dialin.toml")]
    pub config: PathBuf,

    /// Path to the trial-history CSV
    #[arg(long, value_name = "FILE", default_value = "espresso_history.csv")]
    pub history: PathBuf,

    /// Log as JSON lines instead of pretty
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace)
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info")]
    pub log_level: String,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

/// Sensory scores for the shot being analyzed. All default to 0.
#[derive(clap::Args, Debug, Clone, Copy, Default)]
pub struct SensoryArgs {
    /// Sour/green defect (0-10)
    #[arg(long, default_value_t = 0.0)]
    pub sour: f64,
    /// Bitter defect (0-10)
    #[arg(long, default_value_t = 0.0)]
    pub bitter: f64,
    /// Astringent defect (0-10)
    #[arg(long, default_value_t = 0.0)]
    pub astringent: f64,
    /// Watery/weak defect (0-10)
    #[arg(long, default_value_t = 0.0)]
    pub weak: f64,
    /// Harsh defect (0-10)
    #[arg(long, default_value_t = 0.0)]
    pub harsh: f64,
    /// Balance (0-10)
    #[arg(long, default_value_t = 0.0)]
    pub balanced: f64,
    /// Body (0-10)
    #[arg(long, default_value_t = 0.0)]
    pub body: f64,
    /// Aroma (0-10)
    #[arg(long, default_value_t = 0.0)]
    pub aroma: f64,
    /// Sweetness (0-10)
    #[arg(long, default_value_t = 0.0)]
    pub sweetness: f64,
}

/// Puck-prep observations for the shot being analyzed.
#[derive(clap::Args, Debug, Clone, Copy, Default)]
pub struct PrepArgs {
    /// Very fresh roast (CO2 bubbling)
    #[arg(long, action = ArgAction::SetTrue)]
    pub freshness: bool,
    /// Poor grounds distribution
    #[arg(long, action = ArgAction::SetTrue)]
    pub bad_distribution: bool,
    /// Uneven tamp
    #[arg(long, action = ArgAction::SetTrue)]
    pub uneven_tamp: bool,
    /// Dose was not weighed accurately
    #[arg(long, action = ArgAction::SetTrue)]
    pub inaccurate_dose: bool,
    /// Channeling / broken puck
    #[arg(long, action = ArgAction::SetTrue)]
    pub broken_puck: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze the current shot, print suggestions, append to history
    Analyze {
        #[command(flatten)]
        sensory: SensoryArgs,
        #[command(flatten)]
        prep: PrepArgs,
        /// Analyze without appending the trial to the history
        #[arg(long, action = ArgAction::SetTrue)]
        dry_run: bool,
    },
    /// Generate a Bayesian-optimization suggestion from the history
    Suggest {
        /// Seed the random search for a reproducible suggestion
        #[arg(long, value_name = "SEED")]
        seed: Option<u64>,
        #[command(flatten)]
        prep: PrepArgs,
    },
    /// Show the predictive model weights and influence ranking
    Model,
    /// Rewrite the history CSV to a file or stdout (normalizes columns)
    Export {
        /// Output file; stdout when omitted
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,
    },
    /// Delete one history entry by index (0 = newest)
    Delete {
        #[arg(long)]
        index: usize,
    },
}
