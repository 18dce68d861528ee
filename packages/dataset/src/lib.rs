#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Dataset loading, cleaning, and category collapsing.
//!
//! The loader reads the raw incident table (a ZIP archive containing one
//! CSV, or a bare CSV file), normalizes column headers, and returns every
//! row as a [`serde_json::Value`] object keyed by the normalized headers.
//! Cleaning coerces coordinates, drops incomplete and duplicate rows, and
//! produces the stable [`Incident`] collection the rest of the pipeline
//! consumes.
//!
//! [`Incident`]: crime_forecast_models::Incident

pub mod clean;
pub mod collapse;
pub mod export;
pub mod loader;

pub use clean::{clean, training_subset};
pub use collapse::{CategoryVocabulary, OTHER_CATEGORY, value_counts};
pub use export::write_training_csv;
pub use loader::{Column, RawRow, load_table};

/// Errors that can occur while loading or cleaning the dataset.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    /// I/O error (file open/read).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// ZIP archive error.
    #[error("archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// CSV parsing failed.
    #[error("CSV parse error: {0}")]
    Csv(#[from] csv::Error),

    /// The archive contains no CSV member.
    #[error("no CSV file found inside archive '{path}'")]
    NoCsvInArchive {
        /// Path of the archive that was searched.
        path: String,
    },

    /// A required column is absent from the table.
    #[error("required column '{column}' is missing from the dataset")]
    MissingColumn {
        /// Normalized name of the missing column.
        column: String,
    },

    /// Every row was dropped during cleaning.
    #[error("no rows survived cleaning")]
    NoRowsSurvived,
}
