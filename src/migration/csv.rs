use rand::Rng;
use rayon::prelude::*;
use thiserror::Error;

/// Header names the parser requires, in record field order
pub const REQUIRED_COLUMNS: [&str; 5] = [
    "Species",
    "Start_Latitude",
    "Start_Longitude",
    "End_Latitude",
    "End_Longitude",
];

/// One observed migration, validated and in range
#[derive(Clone, Debug, PartialEq)]
pub struct MigrationRecord {
    pub species: String,
    pub start_lat: f64,
    pub start_lon: f64,
    pub end_lat: f64,
    pub end_lon: f64,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("missing required columns: {}", .missing.join(", "))]
    MissingColumns { missing: Vec<&'static str> },
}

/// Why a data row was dropped
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    ShortRow,
    BadNumber,
    EmptySpecies,
    OutOfRange,
}

/// Per-row retention policy.
///
/// Each otherwise-valid row is kept with probability `rate`; the draw is an
/// independent coin flip per row, so the output size is only approximately
/// `rate * rows`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SamplingPolicy {
    pub rate: f64,
}

impl SamplingPolicy {
    /// Keep roughly one row in ten
    pub const DEFAULT_RATE: f64 = 0.1;

    pub fn new(rate: f64) -> Self {
        Self { rate }
    }

    /// Keep every valid row
    pub fn disabled() -> Self {
        Self { rate: 1.0 }
    }

    fn keep<R: Rng + ?Sized>(&self, rng: &mut R) -> bool {
        if self.rate >= 1.0 {
            return true;
        }
        rng.gen::<f64>() < self.rate
    }
}

impl Default for SamplingPolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_RATE)
    }
}

/// Row accounting for one parse pass
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParseStats {
    /// Data rows seen (blank lines excluded)
    pub rows: usize,
    pub kept: usize,
    pub sampled_out: usize,
    pub short_rows: usize,
    pub bad_numbers: usize,
    pub empty_species: usize,
    pub out_of_range: usize,
}

impl ParseStats {
    /// Rows rejected by validation (sampling excluded)
    pub fn skipped(&self) -> usize {
        self.short_rows + self.bad_numbers + self.empty_species + self.out_of_range
    }

    fn record_skip(&mut self, reason: SkipReason) {
        match reason {
            SkipReason::ShortRow => self.short_rows += 1,
            SkipReason::BadNumber => self.bad_numbers += 1,
            SkipReason::EmptySpecies => self.empty_species += 1,
            SkipReason::OutOfRange => self.out_of_range += 1,
        }
    }
}

#[derive(Debug, Default)]
pub struct ParsedRecords {
    pub records: Vec<MigrationRecord>,
    pub stats: ParseStats,
}

/// Resolved positions of the required columns within a row
#[derive(Clone, Copy, Debug)]
struct ColumnIndex {
    species: usize,
    start_lat: usize,
    start_lon: usize,
    end_lat: usize,
    end_lon: usize,
}

impl ColumnIndex {
    fn from_header(header: &str) -> Result<Self, ParseError> {
        let names: Vec<&str> = header.split(',').map(str::trim).collect();
        let find = |col: &str| names.iter().position(|name| *name == col);

        let found: Vec<Option<usize>> = REQUIRED_COLUMNS.iter().map(|&col| find(col)).collect();
        let missing: Vec<&'static str> = REQUIRED_COLUMNS
            .iter()
            .zip(&found)
            .filter(|(_, idx)| idx.is_none())
            .map(|(col, _)| *col)
            .collect();

        match found[..] {
            [Some(species), Some(start_lat), Some(start_lon), Some(end_lat), Some(end_lon)] => Ok(Self {
                species,
                start_lat,
                start_lon,
                end_lat,
                end_lon,
            }),
            _ => Err(ParseError::MissingColumns { missing }),
        }
    }

    fn max(&self) -> usize {
        self.species
            .max(self.start_lat)
            .max(self.start_lon)
            .max(self.end_lat)
            .max(self.end_lon)
    }
}

fn parse_coord(field: &str) -> Result<f64, SkipReason> {
    match field.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(SkipReason::BadNumber),
    }
}

fn parse_row(line: &str, cols: ColumnIndex) -> Result<MigrationRecord, SkipReason> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    if fields.len() <= cols.max() {
        return Err(SkipReason::ShortRow);
    }

    let start_lat = parse_coord(fields[cols.start_lat])?;
    let start_lon = parse_coord(fields[cols.start_lon])?;
    let end_lat = parse_coord(fields[cols.end_lat])?;
    let end_lon = parse_coord(fields[cols.end_lon])?;

    let species = fields[cols.species];
    if species.is_empty() {
        return Err(SkipReason::EmptySpecies);
    }

    let lat_ok = |v: f64| v.abs() <= 90.0;
    let lon_ok = |v: f64| v.abs() <= 180.0;
    if !(lat_ok(start_lat) && lon_ok(start_lon) && lat_ok(end_lat) && lon_ok(end_lon)) {
        return Err(SkipReason::OutOfRange);
    }

    Ok(MigrationRecord {
        species: species.to_string(),
        start_lat,
        start_lon,
        end_lat,
        end_lon,
    })
}

/// Parse migration CSV text into sampled, validated records.
///
/// Header-only or empty input is not an error: it yields zero records and
/// the caller decides what to show instead. Rows are validated in parallel;
/// sampling runs afterwards in row order so a seeded `rng` reproduces the
/// same selection.
pub fn parse<R: Rng + ?Sized>(
    text: &str,
    sampling: &SamplingPolicy,
    rng: &mut R,
) -> Result<ParsedRecords, ParseError> {
    // Spreadsheet exports often lead with a byte order mark
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut lines = text.lines().filter(|line| !line.trim().is_empty());

    let Some(header) = lines.next() else {
        return Ok(ParsedRecords::default());
    };
    let cols = ColumnIndex::from_header(header)?;

    let rows: Vec<&str> = lines.collect();
    let validated: Vec<Result<MigrationRecord, SkipReason>> =
        rows.par_iter().map(|line| parse_row(line, cols)).collect();

    let mut stats = ParseStats {
        rows: rows.len(),
        ..ParseStats::default()
    };
    let mut records = Vec::with_capacity((rows.len() as f64 * sampling.rate.min(1.0)) as usize + 1);

    for row in validated {
        match row {
            Ok(record) if sampling.keep(rng) => records.push(record),
            Ok(_) => stats.sampled_out += 1,
            Err(reason) => stats.record_skip(reason),
        }
    }
    stats.kept = records.len();

    Ok(ParsedRecords { records, stats })
}
