use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use clap::Parser;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::loader::{DataSource, LoadOptions};
use crate::migration::csv::SamplingPolicy;
use crate::migration::routes::{DEFAULT_BUCKET_DEGREES, DEFAULT_TOP_N};
use crate::migration::LayerSettings;

#[derive(Parser, Debug)]
#[command(name = "migration-globe")]
#[command(version)]
#[command(about = "Rotating terminal globe with animated bird migration routes", long_about = None)]
pub struct Cli {
    /// Migration CSV: a file path or an http(s) URL
    #[arg(short, long, default_value = "data/bird_migration_data.csv")]
    pub data: String,

    /// Directory holding ne_110m_coastline.json
    #[arg(long, default_value = "data")]
    pub coastlines: PathBuf,

    /// Fraction of valid rows kept (0-1)
    #[arg(short = 'r', long, default_value_t = SamplingPolicy::DEFAULT_RATE)]
    pub sample_rate: f64,

    /// Keep every valid row
    #[arg(long)]
    pub no_sampling: bool,

    /// Random seed for reproducible sampling and bird placement
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Region size in degrees used to group routes
    #[arg(short, long, default_value_t = DEFAULT_BUCKET_DEGREES)]
    pub bucket_degrees: f64,

    /// Number of busiest routes drawn
    #[arg(short = 'n', long, default_value_t = DEFAULT_TOP_N)]
    pub top_n: usize,

    /// Network timeout for URL sources, in seconds
    #[arg(long, default_value_t = 10)]
    pub timeout_secs: u64,

    /// Write logs to this file (the terminal is owned by the UI)
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("sample rate must be between 0 and 1, got {0}")]
    SampleRate(f64),
    #[error("bucket size must be a positive number of degrees, got {0}")]
    BucketDegrees(f64),
    #[error("top-n must be at least 1")]
    TopN,
}

/// Validated run configuration
#[derive(Clone, Debug)]
pub struct MigrationConfig {
    pub source: DataSource,
    pub coastline_dir: PathBuf,
    pub load: LoadOptions,
    pub layer: LayerSettings,
    pub seed: Option<u64>,
    pub log_file: Option<PathBuf>,
}

impl TryFrom<Cli> for MigrationConfig {
    type Error = ConfigError;

    fn try_from(cli: Cli) -> Result<Self, Self::Error> {
        if !(0.0..=1.0).contains(&cli.sample_rate) {
            return Err(ConfigError::SampleRate(cli.sample_rate));
        }
        if !(cli.bucket_degrees.is_finite() && cli.bucket_degrees > 0.0) {
            return Err(ConfigError::BucketDegrees(cli.bucket_degrees));
        }
        if cli.top_n == 0 {
            return Err(ConfigError::TopN);
        }

        let sampling = if cli.no_sampling {
            SamplingPolicy::disabled()
        } else {
            SamplingPolicy::new(cli.sample_rate)
        };

        Ok(Self {
            source: DataSource::parse(&cli.data),
            coastline_dir: cli.coastlines,
            load: LoadOptions {
                sampling,
                seed: cli.seed,
                timeout: Duration::from_secs(cli.timeout_secs),
            },
            layer: LayerSettings {
                bucket_degrees: cli.bucket_degrees,
                top_n: cli.top_n,
                ..LayerSettings::default()
            },
            seed: cli.seed,
            log_file: cli.log_file,
        })
    }
}

/// Send `tracing` output to `path`. `RUST_LOG` overrides the default `info`.
pub fn init_logging(path: &Path) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install logger: {e}"))?;
    Ok(())
}
