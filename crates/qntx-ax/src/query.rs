//! Converts a parsed [`AxQuery`] into the [`AxFilter`] the pipeline consumes.

use chrono::NaiveDate;

use qntx_core::attestation::{AxFilter, OverFilter};
use qntx_core::parser::{AxQuery, DurationUnit, TemporalClause};

const MS_PER_DAY: i64 = 86_400_000;

/// Build an [`AxFilter`] from a parsed query. `limit` is left unset; the
/// pipeline applies its own default.
pub fn build_filter(query: &AxQuery<'_>) -> AxFilter {
    let mut filter = AxFilter {
        subjects: query.subjects.iter().map(|s| s.to_string()).collect(),
        predicates: query.predicates.iter().map(|s| s.to_string()).collect(),
        contexts: query.contexts.iter().map(|s| s.to_string()).collect(),
        actors: query.actors.iter().map(|s| s.to_string()).collect(),
        ..Default::default()
    };

    match &query.temporal {
        Some(TemporalClause::Since(date)) => {
            filter.time_start = parse_day_start(date);
        }
        Some(TemporalClause::Until(date)) => {
            filter.time_end = parse_day_start(date).map(|ms| ms + MS_PER_DAY - 1);
        }
        Some(TemporalClause::On(date)) => {
            if let Some(start) = parse_day_start(date) {
                filter.time_start = Some(start);
                filter.time_end = Some(start + MS_PER_DAY - 1);
            }
        }
        Some(TemporalClause::Between(start, end)) => {
            filter.time_start = parse_day_start(start);
            filter.time_end = parse_day_start(end).map(|ms| ms + MS_PER_DAY - 1);
        }
        Some(TemporalClause::Over(duration)) => {
            if let (Some(value), Some(unit)) = (duration.value, duration.unit) {
                filter.over_comparison = Some(OverFilter {
                    value,
                    unit: duration_unit_code(unit).to_string(),
                    operator: "over".to_string(),
                });
            }
        }
        None => {}
    }

    filter
}

fn parse_day_start(date: &str) -> Option<i64> {
    let naive = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
    Some(naive.and_hms_opt(0, 0, 0)?.and_utc().timestamp_millis())
}

fn duration_unit_code(unit: DurationUnit) -> &'static str {
    match unit {
        DurationUnit::Years => "y",
        DurationUnit::Months => "m",
        DurationUnit::Weeks => "w",
        DurationUnit::Days => "d",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qntx_core::parser::Parser;

    #[test]
    fn since_sets_time_start() {
        let query = Parser::parse("ALICE is author_of of GitHub since 2024-01-01").unwrap();
        let filter = build_filter(&query);
        assert!(filter.time_start.is_some());
        assert!(filter.time_end.is_none());
    }

    #[test]
    fn between_sets_both_bounds() {
        let query = Parser::parse("ALICE is author between 2024-01-01 and 2024-12-31").unwrap();
        let filter = build_filter(&query);
        assert!(filter.time_start.unwrap() < filter.time_end.unwrap());
    }

    #[test]
    fn over_builds_over_filter() {
        let query = Parser::parse("ALICE is employed over 5y").unwrap();
        let filter = build_filter(&query);
        let over = filter.over_comparison.expect("expected over filter");
        assert_eq!(over.value, 5.0);
        assert_eq!(over.unit, "y");
    }

    #[test]
    fn plain_query_has_no_temporal_bounds() {
        let query = Parser::parse("ALICE is author_of of GitHub").unwrap();
        let filter = build_filter(&query);
        assert!(filter.time_start.is_none());
        assert!(filter.time_end.is_none());
        assert!(filter.over_comparison.is_none());
    }
}
