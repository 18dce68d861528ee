//! Row cleaning and training-subset construction.
//!
//! Cleaning keeps the source row order, coerces coordinates to finite
//! numbers, drops rows missing an identifier, category, or coordinate, and
//! drops duplicate identifiers keeping the first occurrence. Running
//! [`clean`] on its own output drops nothing further.

use std::collections::HashSet;

use crime_forecast_models::{Incident, TrainingRecord};

use crate::loader::{Column, RawRow};
use crate::DatasetError;

/// Returns the trimmed string value of `column`, or `None` when the field
/// is absent or blank.
fn field<'a>(row: &'a RawRow, column: Column) -> Option<&'a str> {
    let value = row.get(column.as_ref())?.as_str()?.trim();
    (!value.is_empty()).then_some(value)
}

/// Parses a coordinate field, converting unparseable or non-finite values
/// to `None` rather than failing the load.
fn coordinate(row: &RawRow, column: Column) -> Option<f64> {
    field(row, column)?
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// Cleans raw table rows into the canonical incident collection.
///
/// Rows missing an identifier, category, or either coordinate are dropped;
/// duplicate identifiers keep the first occurrence. Row order is otherwise
/// preserved.
///
/// # Errors
///
/// Returns [`DatasetError::NoRowsSurvived`] when cleaning drops every row.
pub fn clean(rows: &[RawRow]) -> Result<Vec<Incident>, DatasetError> {
    let mut seen: HashSet<String> = HashSet::with_capacity(rows.len());
    let mut incidents = Vec::with_capacity(rows.len());

    for row in rows {
        let Some(crime_id) = field(row, Column::CrimeId) else {
            continue;
        };
        let Some(crime_type) = field(row, Column::CrimeType) else {
            continue;
        };
        let Some(latitude) = coordinate(row, Column::Latitude) else {
            continue;
        };
        let Some(longitude) = coordinate(row, Column::Longitude) else {
            continue;
        };

        if !seen.insert(crime_id.to_owned()) {
            continue;
        }

        incidents.push(Incident {
            crime_id: crime_id.to_owned(),
            month: field(row, Column::Month).map(str::to_owned),
            reported_by: field(row, Column::ReportedBy).map(str::to_owned),
            falls_within: field(row, Column::FallsWithin).map(str::to_owned),
            longitude,
            latitude,
            location: field(row, Column::Location).unwrap_or_default().to_owned(),
            lsoa_code: field(row, Column::LsoaCode).map(str::to_owned),
            lsoa_name: field(row, Column::LsoaName).map(str::to_owned),
            crime_type: crime_type.to_owned(),
            last_outcome_category: field(row, Column::LastOutcomeCategory).map(str::to_owned),
        });
    }

    if incidents.is_empty() {
        return Err(DatasetError::NoRowsSurvived);
    }

    log::info!(
        "Cleaned {} rows down to {} incidents",
        rows.len(),
        incidents.len()
    );

    Ok(incidents)
}

/// Restricts the cleaned collection to the model-training subset: incidents
/// carrying both statistical-area fields.
///
/// Administrative fields that are still missing normalize to the empty
/// string, which the feature encoder treats as a distinct observed value.
#[must_use]
pub fn training_subset(incidents: &[Incident]) -> Vec<TrainingRecord> {
    let records: Vec<TrainingRecord> = incidents
        .iter()
        .filter_map(|incident| {
            let lsoa_code = incident.lsoa_code.clone()?;
            let lsoa_name = incident.lsoa_name.clone()?;
            Some(TrainingRecord {
                crime_id: incident.crime_id.clone(),
                month: incident.month.clone(),
                reported_by: incident.reported_by.clone().unwrap_or_default(),
                falls_within: incident.falls_within.clone().unwrap_or_default(),
                longitude: incident.longitude,
                latitude: incident.latitude,
                location: incident.location.clone(),
                lsoa_code,
                lsoa_name,
                crime_type: incident.crime_type.clone(),
                last_outcome_category: incident
                    .last_outcome_category
                    .clone()
                    .unwrap_or_default(),
            })
        })
        .collect();

    log::info!(
        "Training subset: {} of {} incidents carry statistical-area fields",
        records.len(),
        incidents.len()
    );

    records
}
