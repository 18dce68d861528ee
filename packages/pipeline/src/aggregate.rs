//! Aggregation of the scored future-incident collection.
//!
//! Descriptive summaries only: category totals, a period-by-category
//! pivot, and per-period volume against the historical average. No
//! hypothesis testing.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use crime_forecast_dataset::value_counts;
use crime_forecast_models::{
    AggregateReport, CategoryCount, FutureIncident, PeriodCategoryCounts, PeriodSummary,
    TrainingRecord,
};

use crate::config::DEFAULT_HISTORICAL_WINDOW;

/// Derives the historical window from the training subset's month span.
///
/// Parses every `YYYY-MM` month value and returns the inclusive span in
/// months between the earliest and latest; `None` when no month parses.
#[must_use]
pub fn observed_window(records: &[TrainingRecord]) -> Option<usize> {
    let months: Vec<NaiveDate> = records
        .iter()
        .filter_map(|record| record.month.as_deref())
        .filter_map(|month| NaiveDate::parse_from_str(&format!("{month}-01"), "%Y-%m-%d").ok())
        .collect();

    let earliest = months.iter().min()?;
    let latest = months.iter().max()?;

    let span = (i64::from(latest.year()) - i64::from(earliest.year())) * 12
        + i64::from(latest.month0()) - i64::from(earliest.month0())
        + 1;

    usize::try_from(span).ok()
}

/// Resolves the baseline window: an explicit override, then the observed
/// month span, then the fixed fallback.
#[must_use]
pub fn resolve_window(records: &[TrainingRecord], override_window: Option<usize>) -> usize {
    override_window
        .or_else(|| observed_window(records))
        .unwrap_or(DEFAULT_HISTORICAL_WINDOW)
}

/// Builds the aggregate report over the full future-incident collection.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn aggregate(
    future: &[FutureIncident],
    training_size: usize,
    historical_window: usize,
) -> AggregateReport {
    let historical_average = training_size as f64 / historical_window as f64;

    // Category totals across all periods, descending; ties alphabetical.
    let totals = value_counts(future.iter().map(|f| f.predicted_crime_type.as_str()));
    let mut category_totals: Vec<CategoryCount> = totals
        .iter()
        .map(|(category, &count)| CategoryCount {
            category: category.clone(),
            count,
        })
        .collect();
    category_totals.sort_by(|a, b| b.count.cmp(&a.count).then(a.category.cmp(&b.category)));

    // Period x category pivot, zero-filled over the union of categories.
    let mut per_period: BTreeMap<u32, BTreeMap<String, u64>> = BTreeMap::new();
    for incident in future {
        *per_period
            .entry(incident.period)
            .or_default()
            .entry(incident.predicted_crime_type.clone())
            .or_insert(0) += 1;
    }

    let period_pivot: Vec<PeriodCategoryCounts> = per_period
        .iter()
        .map(|(&period, counts)| {
            let filled: BTreeMap<String, u64> = totals
                .keys()
                .map(|category| (category.clone(), counts.get(category).copied().unwrap_or(0)))
                .collect();
            PeriodCategoryCounts {
                period,
                counts: filled,
            }
        })
        .collect();

    let period_summaries: Vec<PeriodSummary> = per_period
        .iter()
        .map(|(&period, counts)| PeriodSummary {
            period,
            future_count: counts.values().sum(),
            historical_average,
        })
        .collect();

    AggregateReport {
        category_totals,
        period_pivot,
        period_summaries,
        training_size,
        historical_window,
        historical_average,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn incident(period: u32, category: &str) -> FutureIncident {
        FutureIncident {
            period,
            longitude: -1.1,
            latitude: 53.5,
            reported_by: "Humberside Police".to_owned(),
            falls_within: "Humberside Police".to_owned(),
            last_outcome_category: "Under investigation".to_owned(),
            predicted_crime_type: category.to_owned(),
        }
    }

    fn record_with_month(month: Option<&str>) -> TrainingRecord {
        TrainingRecord {
            crime_id: "x".to_owned(),
            month: month.map(str::to_owned),
            reported_by: String::new(),
            falls_within: String::new(),
            longitude: -1.1,
            latitude: 53.5,
            location: String::new(),
            lsoa_code: "E01012345".to_owned(),
            lsoa_name: "Hull 001A".to_owned(),
            crime_type: "Burglary".to_owned(),
            last_outcome_category: String::new(),
        }
    }

    #[test]
    fn category_totals_are_descending() {
        let future = vec![
            incident(1, "Theft"),
            incident(1, "Burglary"),
            incident(2, "Theft"),
            incident(2, "Other"),
        ];
        let report = aggregate(&future, 100, 36);

        assert_eq!(report.category_totals[0].category, "Theft");
        assert_eq!(report.category_totals[0].count, 2);
        // Burglary and Other tie at 1; alphabetical order breaks the tie.
        assert_eq!(report.category_totals[1].category, "Burglary");
        assert_eq!(report.category_totals[2].category, "Other");
    }

    #[test]
    fn pivot_is_zero_filled() {
        let future = vec![incident(1, "Theft"), incident(2, "Burglary")];
        let report = aggregate(&future, 100, 36);

        let period_one = &report.period_pivot[0];
        assert_eq!(period_one.period, 1);
        assert_eq!(period_one.counts.get("Theft"), Some(&1));
        assert_eq!(period_one.counts.get("Burglary"), Some(&0));
    }

    #[test]
    fn pivot_rows_sum_to_period_totals() {
        let future: Vec<FutureIncident> = (1..=3)
            .flat_map(|period| {
                (0..50).map(move |i| incident(period, if i % 2 == 0 { "Theft" } else { "Other" }))
            })
            .collect();
        let report = aggregate(&future, 100, 36);

        for (pivot_row, summary) in report.period_pivot.iter().zip(&report.period_summaries) {
            assert_eq!(pivot_row.period, summary.period);
            assert_eq!(pivot_row.counts.values().sum::<u64>(), summary.future_count);
            assert_eq!(summary.future_count, 50);
        }
    }

    #[test]
    fn historical_average_is_size_over_window() {
        let report = aggregate(&[incident(1, "Theft")], 3600, 36);
        assert!((report.historical_average - 100.0).abs() < f64::EPSILON);
        assert_eq!(report.training_size, 3600);
        assert_eq!(report.historical_window, 36);
    }

    #[test]
    fn observed_window_spans_inclusive_months() {
        let records = vec![
            record_with_month(Some("2022-05")),
            record_with_month(Some("2025-04")),
            record_with_month(None),
        ];
        assert_eq!(observed_window(&records), Some(36));
    }

    #[test]
    fn observed_window_single_month_is_one() {
        let records = vec![record_with_month(Some("2024-03"))];
        assert_eq!(observed_window(&records), Some(1));
    }

    #[test]
    fn unparseable_months_fall_back() {
        let records = vec![record_with_month(Some("last spring")), record_with_month(None)];
        assert_eq!(observed_window(&records), None);
        assert_eq!(resolve_window(&records, None), DEFAULT_HISTORICAL_WINDOW);
        assert_eq!(resolve_window(&records, Some(12)), 12);
    }
}
