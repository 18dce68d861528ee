//! CSV export surface for the training subset.
//!
//! Writes a flat UTF-8 table: one header row in the canonical column order,
//! one row per record, no index column.

use std::io::Write;

use crime_forecast_models::TrainingRecord;

use crate::loader::Column;
use crate::DatasetError;

/// Serializes the training subset as CSV into `writer`.
///
/// # Errors
///
/// Returns [`DatasetError`] if writing fails.
pub fn write_training_csv<W: Write>(
    writer: W,
    records: &[TrainingRecord],
) -> Result<(), DatasetError> {
    let mut wtr = csv::Writer::from_writer(writer);

    let headers: Vec<&str> = Column::all().iter().map(|column| column.as_ref()).collect();
    wtr.write_record(&headers)?;

    for record in records {
        wtr.write_record([
            record.crime_id.as_str(),
            record.month.as_deref().unwrap_or(""),
            record.reported_by.as_str(),
            record.falls_within.as_str(),
            &record.longitude.to_string(),
            &record.latitude.to_string(),
            record.location.as_str(),
            record.lsoa_code.as_str(),
            record.lsoa_name.as_str(),
            record.crime_type.as_str(),
            record.last_outcome_category.as_str(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str) -> TrainingRecord {
        TrainingRecord {
            crime_id: id.to_owned(),
            month: Some("2024-03".to_owned()),
            reported_by: "Humberside Police".to_owned(),
            falls_within: "Humberside Police".to_owned(),
            longitude: -1.1,
            latitude: 53.5,
            location: "On or near High Street".to_owned(),
            lsoa_code: "E01012345".to_owned(),
            lsoa_name: "Hull 001A".to_owned(),
            crime_type: "Burglary".to_owned(),
            last_outcome_category: "Under investigation".to_owned(),
        }
    }

    #[test]
    fn writes_header_and_one_row_per_record() {
        let mut buffer = Vec::new();
        write_training_csv(&mut buffer, &[record("a"), record("b")]).unwrap();

        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "crime_id,month,reported_by,falls_within,longitude,latitude,location,\
             lsoa_code,lsoa_name,crime_type,last_outcome_category"
        );
        assert!(lines[1].starts_with("a,2024-03,"));
        assert!(lines[2].starts_with("b,2024-03,"));
    }

    #[test]
    fn missing_month_serializes_as_empty_field() {
        let mut rec = record("a");
        rec.month = None;
        let mut buffer = Vec::new();
        write_training_csv(&mut buffer, &[rec]).unwrap();

        let text = String::from_utf8(buffer).unwrap();
        assert!(text.lines().nth(1).unwrap().starts_with("a,,"));
    }
}
