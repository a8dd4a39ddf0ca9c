//! `cafe-forecast` command line.

use anyhow::{Context, Result};
use cafe_forecast::config::PipelineConfig;
use cafe_forecast::pipeline::{run_features, run_forecast};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "cafe-forecast")]
#[command(about = "Clean café drink pageviews, build feature tables and baseline forecasts")]
#[command(version)]
struct CliArgs {
    /// Path to a TOML config file (falls back to $CAFE_FORECAST_CONFIG, then ./config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Override the input CSV path
    #[arg(long, global = true)]
    input: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Reshape, cap outliers, split and write every feature variant
    Features {
        /// Override the output directory
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },

    /// Evaluate baselines on the window before --from and forecast up to --until
    Forecast {
        /// Last observed day (YYYY-MM-DD)
        #[arg(long = "from")]
        predict_from: Option<NaiveDate>,
        /// Last forecast day (YYYY-MM-DD)
        #[arg(long = "until")]
        predict_until: Option<NaiveDate>,
        /// Override the predictions directory
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = CliArgs::parse();

    let mut config =
        PipelineConfig::load(args.config.as_deref()).context("failed to load configuration")?;
    if let Some(input) = args.input {
        config.data.path = input;
    }

    let report = match args.command {
        Command::Features { output_dir } => {
            if let Some(dir) = output_dir {
                config.data.output_dir = dir;
            }
            info!(input = %config.data.path.display(), output = %config.data.output_dir.display(), "building feature tables");
            run_features(&config).context("feature pipeline failed")?
        }
        Command::Forecast {
            predict_from,
            predict_until,
            output_dir,
        } => {
            if let Some(from) = predict_from {
                config.predictions.predict_from = from;
            }
            if let Some(until) = predict_until {
                config.predictions.predict_until = until;
            }
            if let Some(dir) = output_dir {
                config.predictions.path = dir;
            }
            info!(
                from = %config.predictions.predict_from,
                until = %config.predictions.predict_until,
                "running forecast evaluation"
            );
            run_forecast(&config).context("forecast run failed")?
        }
    };

    print!("{report}");
    Ok(())
}
