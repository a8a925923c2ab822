//! valelect: runs election scenarios against in-memory collaborators.

mod scenario;

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use valelect_election::ElectionConfig;
use valelect_types::Fraction;

#[derive(Parser)]
#[command(name = "valelect", about = "Validator-group election simulator")]
struct Cli {
    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, default_value = "info", env = "VALELECT_LOG_LEVEL")]
    log_level: String,

    /// Emit logs as JSON lines.
    #[arg(long, env = "VALELECT_LOG_JSON")]
    log_json: bool,

    /// Subcommand.
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Play a scenario file and print the resulting ranking and elected set.
    Simulate {
        /// Path to a TOML election config. File settings are the base;
        /// flags and env vars override them.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Path to the TOML scenario.
        #[arg(long)]
        scenario: PathBuf,

        #[arg(long, env = "VALELECT_MIN_ELECTABLE")]
        min_electable: Option<usize>,

        #[arg(long, env = "VALELECT_MAX_ELECTABLE")]
        max_electable: Option<usize>,

        #[arg(long, env = "VALELECT_MAX_GROUPS_VOTED_FOR")]
        max_groups_voted_for: Option<usize>,

        /// Electability threshold as a decimal fraction, e.g. "0.05".
        #[arg(long, env = "VALELECT_ELECTABILITY_THRESHOLD")]
        threshold: Option<Fraction>,
    },
    /// Print the default election config as TOML.
    DefaultConfig,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    if cli.log_json {
        valelect_utils::init_tracing_json(&cli.log_level);
    } else {
        valelect_utils::init_tracing(&cli.log_level);
    }

    match cli.command {
        Command::Simulate {
            config,
            scenario,
            min_electable,
            max_electable,
            max_groups_voted_for,
            threshold,
        } => {
            let base = match config {
                Some(path) => {
                    let cfg = ElectionConfig::from_toml_file(&path)
                        .with_context(|| format!("loading config {}", path.display()))?;
                    tracing::info!("Loaded config from {}", path.display());
                    cfg
                }
                None => ElectionConfig::default(),
            };
            let config = ElectionConfig {
                min_electable_validators: min_electable.unwrap_or(base.min_electable_validators),
                max_electable_validators: max_electable.unwrap_or(base.max_electable_validators),
                max_num_groups_voted_for: max_groups_voted_for
                    .unwrap_or(base.max_num_groups_voted_for),
                electability_threshold: threshold.unwrap_or(base.electability_threshold),
            };
            config.validate()?;

            let scenario = scenario::Scenario::from_toml_file(&scenario)?;
            tracing::info!(
                groups = scenario.groups.len(),
                accounts = scenario.accounts.len(),
                steps = scenario.steps.len(),
                "running scenario"
            );
            let report = scenario::run(config, &scenario)?;
            if !report.rejected.is_empty() {
                tracing::warn!("{} step(s) rejected", report.rejected.len());
            }
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::DefaultConfig => {
            print!("{}", ElectionConfig::default().to_toml_string()?);
        }
    }

    Ok(())
}
