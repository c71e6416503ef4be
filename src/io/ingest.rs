//! CSV ingest for hearing-set datasets.
//!
//! Expected layout: `Type, Degree, Config`, then the 24 thresholds in schema
//! order. When the header row names every column we bind by name (so column
//! order in the file does not matter); otherwise we bind by position.
//!
//! Design goals:
//! - **Strict schema** for thresholds (non-integer cells are row errors)
//! - **Row-level validation** (skip bad rows and report them, or abort in strict mode)
//! - **No silent defaults**: a missing cell is never replaced by a value

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;
use tracing::{debug, info, warn};

use crate::domain::{FEATURE_COUNT, HearingSetRecord, LABEL_COLUMNS, THRESHOLD_FIELDS};
use crate::error::{AppError, ClassifyError};

/// How ingest treats the input.
#[derive(Debug, Clone)]
pub struct IngestOptions {
    /// First row is a header.
    pub has_header: bool,
    /// Abort on the first bad row instead of skipping it.
    pub strict: bool,
    pub delimiter: u8,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            has_header: true,
            strict: false,
            delimiter: b',',
        }
    }
}

/// How file columns map onto the schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnBinding {
    ByName {
        labels: [usize; 3],
        thresholds: [usize; FEATURE_COUNT],
    },
    ByPosition,
}

impl ColumnBinding {
    fn label_column(&self, k: usize) -> usize {
        match self {
            ColumnBinding::ByName { labels, .. } => labels[k],
            ColumnBinding::ByPosition => k,
        }
    }

    fn threshold_column(&self, position: usize) -> usize {
        match self {
            ColumnBinding::ByName { thresholds, .. } => thresholds[position],
            ColumnBinding::ByPosition => THRESHOLD_FIELDS[position].column(),
        }
    }
}

/// A row-level error encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct IngestedDataset {
    pub records: Vec<HearingSetRecord>,
    pub binding: ColumnBinding,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

impl IngestedDataset {
    pub fn labeled_count(&self) -> usize {
        self.records.iter().filter(|r| r.has_labels()).count()
    }
}

/// Load a dataset file.
pub fn load_dataset(path: &Path, options: &IngestOptions) -> Result<IngestedDataset, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display())))?;
    let data = read_dataset(file, options)?;
    info!(
        path = %path.display(),
        rows = data.rows_read,
        used = data.records.len(),
        skipped = data.row_errors.len(),
        "dataset loaded"
    );
    Ok(data)
}

/// Read a dataset from any reader.
pub fn read_dataset<R: Read>(reader: R, options: &IngestOptions) -> Result<IngestedDataset, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(options.has_header)
        .delimiter(options.delimiter)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let binding = if options.has_header {
        let headers = reader
            .headers()
            .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
            .clone();
        bind_columns(&headers)
    } else {
        ColumnBinding::ByPosition
    };
    debug!(?binding, "column binding resolved");

    // Records start on line 2 when the first line is a header.
    let first_line = if options.has_header { 2 } else { 1 };
    let mut records = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        let line = idx + first_line;
        rows_read += 1;

        let parsed = result
            .map_err(|e| format!("CSV parse error: {e}"))
            .and_then(|row| parse_row(&row, &binding).map_err(|e| e.to_string()));

        match parsed {
            Ok(record) => records.push(record),
            Err(message) => {
                if options.strict {
                    return Err(AppError::new(2, format!("Line {line}: {message}")));
                }
                debug!(line, %message, "skipping row");
                row_errors.push(RowError { line, message });
            }
        }
    }

    if !row_errors.is_empty() {
        warn!(count = row_errors.len(), "rows skipped during ingest");
    }
    if records.is_empty() {
        return Err(AppError::new(3, "No valid rows in dataset."));
    }

    Ok(IngestedDataset {
        records,
        binding,
        row_errors,
        rows_read,
    })
}

fn bind_columns(headers: &StringRecord) -> ColumnBinding {
    let map: HashMap<String, usize> = headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect();
    let find = |name: &str| map.get(&name.to_ascii_lowercase()).copied();

    let mut labels = [0usize; 3];
    for (k, name) in LABEL_COLUMNS.iter().enumerate() {
        match find(name) {
            Some(idx) => labels[k] = idx,
            None => return ColumnBinding::ByPosition,
        }
    }
    let mut thresholds = [0usize; FEATURE_COUNT];
    for f in THRESHOLD_FIELDS.iter() {
        match find(f.name) {
            Some(idx) => thresholds[f.position] = idx,
            None => return ColumnBinding::ByPosition,
        }
    }
    ColumnBinding::ByName { labels, thresholds }
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports often prefix the first header with a UTF-8 BOM.
    name.trim().trim_start_matches('\u{feff}').to_ascii_lowercase()
}

fn parse_row(row: &StringRecord, binding: &ColumnBinding) -> Result<HearingSetRecord, ClassifyError> {
    let mut builder = HearingSetRecord::builder();
    for f in THRESHOLD_FIELDS.iter() {
        let raw = row
            .get(binding.threshold_column(f.position))
            .ok_or_else(|| ClassifyError::invalid_record(f.name, "is missing (short row)"))?;
        builder = builder.parse_named(f.name, raw)?;
    }

    let labels: Vec<&str> = (0..LABEL_COLUMNS.len())
        .map(|k| row.get(binding.label_column(k)).unwrap_or_default())
        .collect();
    if labels.iter().any(|l| !l.is_empty()) {
        builder = builder.labels(labels[0], labels[1], labels[2]);
    }
    Ok(builder.build())
}

/// Parse `NAME=VALUE` pairs separated by commas, semicolons or whitespace.
///
/// Used for ad-hoc records on the command line. Unknown names and non-integer
/// values are rejected; fields left out stay missing.
pub fn parse_record_list(spec: &str) -> Result<HearingSetRecord, ClassifyError> {
    let mut builder = HearingSetRecord::builder();
    for pair in spec
        .split(|c: char| c == ',' || c == ';' || c.is_whitespace())
        .filter(|s| !s.is_empty())
    {
        let (name, value) = pair
            .split_once('=')
            .ok_or_else(|| ClassifyError::invalid_record(pair, "expected NAME=VALUE"))?;
        builder = builder.parse_named(name, value)?;
    }
    Ok(builder.build())
}
