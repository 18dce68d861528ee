//! Raw table loading and header normalization.
//!
//! Reads the incident table from a ZIP archive (the first `.csv` member) or
//! directly from a CSV file, and parses every row into a
//! [`serde_json::Value`] object keyed by the normalized column headers.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use strum_macros::{AsRefStr, Display, EnumString};

use crate::DatasetError;

/// One raw table row: an object keyed by normalized column headers.
pub type RawRow = serde_json::Value;

/// Canonical columns of the incident table.
///
/// The `strum` serializations are the normalized header names, so
/// `Column::CrimeId.as_ref()` is `"crime_id"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum Column {
    /// Unique incident identifier.
    CrimeId,
    /// Reporting month (`YYYY-MM`).
    Month,
    /// Force that recorded the incident.
    ReportedBy,
    /// Force whose jurisdiction the incident falls within.
    FallsWithin,
    /// Longitude in decimal degrees.
    Longitude,
    /// Latitude in decimal degrees.
    Latitude,
    /// Free-text location description.
    Location,
    /// Lower-layer statistical area code.
    LsoaCode,
    /// Lower-layer statistical area name.
    LsoaName,
    /// Crime category label.
    CrimeType,
    /// Last known outcome category.
    LastOutcomeCategory,
}

impl Column {
    /// Columns that must be present for the table to be usable at all.
    #[must_use]
    pub const fn required() -> &'static [Self] {
        &[
            Self::CrimeId,
            Self::CrimeType,
            Self::Latitude,
            Self::Longitude,
        ]
    }

    /// Canonical column order for the export surface.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::CrimeId,
            Self::Month,
            Self::ReportedBy,
            Self::FallsWithin,
            Self::Longitude,
            Self::Latitude,
            Self::Location,
            Self::LsoaCode,
            Self::LsoaName,
            Self::CrimeType,
            Self::LastOutcomeCategory,
        ]
    }
}

/// Normalizes a raw header to canonical form: trimmed, lowercased, internal
/// whitespace replaced with underscores.
#[must_use]
pub fn normalize_header(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

/// Loads the incident table from `path`.
///
/// A `.zip` path is opened as an archive and the first `.csv` member
/// (case-insensitive) is parsed; any other path is parsed as a bare CSV
/// file. A missing file is a fatal error, not a degraded mode.
///
/// # Errors
///
/// Returns [`DatasetError`] if the file cannot be opened, the archive
/// contains no CSV member, the CSV cannot be parsed, or a required column
/// is absent.
pub fn load_table(path: &Path) -> Result<Vec<RawRow>, DatasetError> {
    let is_archive = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("zip"));

    if is_archive {
        load_archive(path)
    } else {
        let file = File::open(path)?;
        log::info!("Reading CSV table from {}", path.display());
        parse_csv(BufReader::new(file))
    }
}

/// Opens a ZIP archive and parses its first CSV member.
fn load_archive(path: &Path) -> Result<Vec<RawRow>, DatasetError> {
    let file = File::open(path)?;
    let mut archive = zip::ZipArchive::new(BufReader::new(file))?;

    let mut csv_index = None;
    for i in 0..archive.len() {
        let entry = archive.by_index(i)?;
        if entry.is_file() && entry.name().to_lowercase().ends_with(".csv") {
            log::info!("Found CSV member '{}' in {}", entry.name(), path.display());
            csv_index = Some(i);
            break;
        }
    }

    let Some(index) = csv_index else {
        return Err(DatasetError::NoCsvInArchive {
            path: path.display().to_string(),
        });
    };

    let mut entry = archive.by_index(index)?;
    let mut bytes = Vec::new();
    entry.read_to_end(&mut bytes)?;

    parse_csv(bytes.as_slice())
}

/// Parses CSV bytes into rows keyed by normalized headers.
///
/// Short rows are padded with empty fields rather than rejected, so a
/// single ragged record never fails the whole load.
fn parse_csv<R: Read>(reader: R) -> Result<Vec<RawRow>, DatasetError> {
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

    let headers: Vec<String> = rdr.headers()?.iter().map(normalize_header).collect();

    for column in Column::required() {
        if !headers.iter().any(|h| h == column.as_ref()) {
            return Err(DatasetError::MissingColumn {
                column: column.as_ref().to_owned(),
            });
        }
    }

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let mut object = serde_json::Map::with_capacity(headers.len());
        for (i, header) in headers.iter().enumerate() {
            let value = record.get(i).unwrap_or_default();
            object.insert(header.clone(), serde_json::Value::String(value.to_owned()));
        }
        rows.push(serde_json::Value::Object(object));
    }

    log::info!("Parsed {} rows ({} columns)", rows.len(), headers.len());

    Ok(rows)
}
