//! One-shot migration data load, run off the render thread.

use std::fs;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::migration::csv::{self, MigrationRecord, ParseError, ParseStats, SamplingPolicy};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to fetch {location}: {reason}")]
    Fetch { location: String, reason: String },
    #[error(transparent)]
    MissingColumns(#[from] ParseError),
    #[error("no usable migration rows")]
    EmptyDataset,
}

/// Records that survived validation and sampling
#[derive(Debug)]
pub struct LoadedRecords {
    pub records: Vec<MigrationRecord>,
    pub stats: ParseStats,
}

pub type LoadOutcome = Result<LoadedRecords, LoadError>;

/// Where the migration CSV lives
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DataSource {
    File(PathBuf),
    Url(String),
}

impl DataSource {
    /// `http://` and `https://` locations are fetched, anything else is a path.
    pub fn parse(location: &str) -> Self {
        let lower = location.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            DataSource::Url(location.to_string())
        } else {
            DataSource::File(PathBuf::from(location))
        }
    }

    fn describe(&self) -> String {
        match self {
            DataSource::File(path) => path.display().to_string(),
            DataSource::Url(url) => url.clone(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct LoadOptions {
    pub sampling: SamplingPolicy,
    /// Seed for the sampling coin flips; entropy when unset
    pub seed: Option<u64>,
    pub timeout: Duration,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            sampling: SamplingPolicy::default(),
            seed: None,
            timeout: Duration::from_secs(10),
        }
    }
}

/// Read the raw CSV text
pub fn fetch(source: &DataSource, timeout: Duration) -> Result<String, LoadError> {
    let fail = |reason: String| LoadError::Fetch {
        location: source.describe(),
        reason,
    };

    match source {
        DataSource::File(path) => fs::read_to_string(path).map_err(|e| fail(e.to_string())),
        DataSource::Url(url) => {
            let agent = ureq::AgentBuilder::new().timeout(timeout).build();
            match agent.get(url).call() {
                Ok(response) => response.into_string().map_err(|e| fail(e.to_string())),
                Err(ureq::Error::Status(code, _)) => Err(fail(format!("HTTP status {code}"))),
                Err(e) => Err(fail(e.to_string())),
            }
        }
    }
}

/// Fetch and parse a source. Zero surviving rows is reported as
/// [`LoadError::EmptyDataset`] so the caller can swap in example data.
pub fn load(source: &DataSource, options: &LoadOptions) -> LoadOutcome {
    info!(source = %source.describe(), "loading migration data");
    let text = fetch(source, options.timeout)?;
    debug!(bytes = text.len(), "migration data fetched");

    let mut rng = match options.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let parsed = csv::parse(&text, &options.sampling, &mut rng)?;
    let stats = parsed.stats;

    info!(
        rows = stats.rows,
        kept = stats.kept,
        sampled_out = stats.sampled_out,
        skipped = stats.skipped(),
        "parsed migration rows"
    );

    if parsed.records.is_empty() {
        return Err(LoadError::EmptyDataset);
    }

    Ok(LoadedRecords {
        records: parsed.records,
        stats,
    })
}

/// Start [`load`] on a background thread.
///
/// Exactly one outcome is sent on the returned channel; poll it with
/// `try_recv` from the render loop.
pub fn spawn_load(source: DataSource, options: LoadOptions) -> Receiver<LoadOutcome> {
    let (tx, rx) = mpsc::channel();
    let failed_tx = tx.clone();
    let location = source.describe();

    let spawned = thread::Builder::new()
        .name("migration-loader".into())
        .spawn(move || {
            let _ = tx.send(load(&source, &options));
        });

    if let Err(e) = spawned {
        error!(error = %e, "could not start loader thread");
        let _ = failed_tx.send(Err(LoadError::Fetch {
            location,
            reason: e.to_string(),
        }));
    }

    rx
}
