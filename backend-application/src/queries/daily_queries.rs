use chrono::NaiveDate;

use backend_domain::{parse_date, today, DailyStore, RangeQuery};

use crate::{AppError, AppState};

fn parse_bound(value: Option<&str>, name: &str) -> Result<Option<NaiveDate>, AppError> {
    match value.map(str::trim).filter(|value| !value.is_empty()) {
        Some(value) => parse_date(value).map(Some).map_err(|_| {
            AppError::BadRequest(format!("invalid {} '{}', expected YYYY-MM-DD", name, value))
        }),
        None => Ok(None),
    }
}

/// Resolves a requested range against the store: missing bounds default to
/// the first and last stored dates, or today for an empty store.
pub fn resolve_range(
    store: &DailyStore,
    query: &RangeQuery,
) -> Result<(NaiveDate, NaiveDate), AppError> {
    let start = parse_bound(query.start.as_deref(), "start")?
        .or_else(|| store.first_date())
        .unwrap_or_else(today);
    let end = parse_bound(query.end.as_deref(), "end")?
        .or_else(|| store.last_date())
        .unwrap_or_else(today);
    if start > end {
        return Err(AppError::BadRequest(format!(
            "start {} is after end {}",
            start, end
        )));
    }
    Ok((start, end))
}

pub async fn get_daily_range(state: &AppState, query: RangeQuery) -> Result<DailyStore, AppError> {
    let store = state.daily_repo.load().await.map_err(AppError::Internal)?;
    let (start, end) = resolve_range(&store, &query)?;
    Ok(store.range(start, end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::day;
    use backend_domain::Record;

    fn query(start: Option<&str>, end: Option<&str>) -> RangeQuery {
        RangeQuery {
            start: start.map(str::to_string),
            end: end.map(str::to_string),
            active_only: false,
        }
    }

    #[test]
    fn missing_bounds_default_to_stored_dates() {
        let mut store = DailyStore::new();
        store.upsert(day("2025-05-02"), "AFF", vec![Record::new("111111")]);
        store.upsert(day("2025-06-10"), "AFF", vec![Record::new("111111")]);
        let range = resolve_range(&store, &query(None, None)).expect("range");
        assert_eq!(range, (day("2025-05-02"), day("2025-06-10")));
        let range = resolve_range(&store, &query(Some("2025-06-01"), None)).expect("range");
        assert_eq!(range, (day("2025-06-01"), day("2025-06-10")));
    }

    #[test]
    fn unbounded_query_covers_multi_year_store() {
        let mut store = DailyStore::new();
        store.upsert(day("2024-01-01"), "AFF", vec![Record::new("111111")]);
        store.upsert(day("2025-06-01"), "AFF", vec![Record::new("222222")]);
        let range = resolve_range(&store, &RangeQuery::default()).expect("range");
        assert_eq!(range, (day("2024-01-01"), day("2025-06-01")));
        let explicit =
            resolve_range(&store, &query(Some("2023-01-01"), Some("2025-12-31"))).expect("range");
        assert_eq!(explicit, (day("2023-01-01"), day("2025-12-31")));
    }

    #[test]
    fn rejects_reversed_and_malformed_ranges() {
        let store = DailyStore::new();
        let reversed = resolve_range(&store, &query(Some("2025-06-10"), Some("2025-06-01")));
        assert!(matches!(reversed, Err(AppError::BadRequest(_))));
        let malformed = resolve_range(&store, &query(Some("06/01/2025"), None));
        assert!(matches!(malformed, Err(AppError::BadRequest(_))));
    }
}
