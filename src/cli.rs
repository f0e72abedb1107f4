//! Command-line interface definitions.
//!
//! The configuration file carries the run definition; flags here override a
//! few of its values for one-off runs.

use crate::config::Config;
use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for a retrieval run.
///
/// # Examples
///
/// ```sh
/// # Run the components listed in the config file
/// risk_news_scout -c ./config.yaml
///
/// # Re-run only the analysis into another directory
/// risk_news_scout -c ./config.yaml -o /tmp/out --component data_analysis
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Path to the YAML configuration file
    #[arg(short, long, env = "RISK_SCOUT_CONFIG")]
    pub config: PathBuf,

    /// Override `output.dir`
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Remove prior output before running (overrides `output.clear_before_run`)
    #[arg(long)]
    pub clear_output: bool,

    /// Override `logging.level` (RUST_LOG still takes precedence)
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// Run only these components instead of the configured list (repeatable)
    #[arg(long = "component")]
    pub components: Vec<String>,
}

impl Cli {
    /// Apply command-line overrides to a loaded configuration.
    pub fn apply(&self, config: &mut Config) {
        if let Some(dir) = &self.output_dir {
            config.output.dir = dir.clone();
        }
        if self.clear_output {
            config.output.clear_before_run = true;
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
        if !self.components.is_empty() {
            config.components = self.components.clone();
        }
    }
}
