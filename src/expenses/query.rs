//! Filter parsing and SQL rendering for the expense list and report
//! queries.
//!
//! List results are scoped to the calling user, filtered by optional date
//! window and category, and paginated in insertion order. Nothing beyond
//! insertion order is promised.

use serde::Deserialize;
use sqlx::{QueryBuilder, Sqlite};
use time::{macros::format_description, Date};

use crate::error::{ApiError, FieldError};

pub const DEFAULT_LIMIT: i64 = 100;
pub const MAX_LIMIT: i64 = 1000;

/// Raw query-string view of the list filters. Everything arrives as text so
/// a bad value surfaces as a field-level 422 instead of a blanket 400 from
/// the extractor.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub category_id: Option<String>,
    pub skip: Option<String>,
    pub limit: Option<String>,
}

/// Raw query-string view of a bare date window, as used by the report
/// endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct RangeParams {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// Validated filter set for one list query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpenseFilter {
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    pub category_id: Option<i64>,
    pub skip: i64,
    pub limit: i64,
}

/// Validated inclusive date window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateRange {
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
}

impl ExpenseFilter {
    /// Parse and validate every parameter, collecting all failures into one
    /// 422. `limit` above the cap is clamped rather than rejected.
    pub fn from_params(params: ListParams) -> Result<Self, ApiError> {
        let mut errors = Vec::new();

        let start_date = parse_date("start_date", params.start_date, &mut errors);
        let end_date = parse_date("end_date", params.end_date, &mut errors);
        let category_id = parse_int("category_id", params.category_id, &mut errors);
        let skip = parse_int("skip", params.skip, &mut errors).unwrap_or(0);
        let limit = parse_int("limit", params.limit, &mut errors).unwrap_or(DEFAULT_LIMIT);

        if skip < 0 {
            errors.push(FieldError::query(
                "skip",
                "Input should be greater than or equal to 0",
                "greater_than_equal",
            ));
        }
        if limit < 0 {
            errors.push(FieldError::query(
                "limit",
                "Input should be greater than or equal to 0",
                "greater_than_equal",
            ));
        }

        if !errors.is_empty() {
            return Err(ApiError::validation(errors));
        }

        Ok(Self {
            start_date,
            end_date,
            category_id,
            skip,
            limit: limit.min(MAX_LIMIT),
        })
    }

    /// Render the scoped, bounded SELECT for this filter. Pagination is
    /// applied last: skip, then limit.
    pub fn to_query(&self, owner_id: i64) -> QueryBuilder<'static, Sqlite> {
        let mut qb = QueryBuilder::new(
            "SELECT id, amount, description, category_id, date, last_updated, owner_id \
             FROM expenses WHERE owner_id = ",
        );
        qb.push_bind(owner_id);
        push_date_bounds(&mut qb, self.start_date, self.end_date);
        if let Some(category_id) = self.category_id {
            qb.push(" AND category_id = ");
            qb.push_bind(category_id);
        }
        qb.push(" ORDER BY id LIMIT ");
        qb.push_bind(self.limit);
        qb.push(" OFFSET ");
        qb.push_bind(self.skip);
        qb
    }
}

impl DateRange {
    pub fn from_params(params: RangeParams) -> Result<Self, ApiError> {
        let mut errors = Vec::new();
        let start_date = parse_date("start_date", params.start_date, &mut errors);
        let end_date = parse_date("end_date", params.end_date, &mut errors);
        if !errors.is_empty() {
            return Err(ApiError::validation(errors));
        }
        Ok(Self {
            start_date,
            end_date,
        })
    }
}

/// Grouped totals for the report endpoint: one aggregation pass, one row
/// per category. Uncategorized expenses stay out of the report.
pub fn report_query(owner_id: i64, range: &DateRange) -> QueryBuilder<'static, Sqlite> {
    let mut qb = QueryBuilder::new(
        "SELECT category_id, SUM(amount) AS total FROM expenses WHERE owner_id = ",
    );
    qb.push_bind(owner_id);
    qb.push(" AND category_id IS NOT NULL");
    push_date_bounds(&mut qb, range.start_date, range.end_date);
    qb.push(" GROUP BY category_id");
    qb
}

/// Both bounds are inclusive and compared at day granularity against the
/// start of the given day. The stored timestamps are RFC 3339 text, which
/// does not order correctly once fractional seconds appear, so comparisons
/// go through sqlite's `datetime()` normalization on both sides.
fn push_date_bounds(
    qb: &mut QueryBuilder<'static, Sqlite>,
    start_date: Option<Date>,
    end_date: Option<Date>,
) {
    if let Some(start) = start_date {
        qb.push(" AND datetime(date) >= datetime(");
        qb.push_bind(start.to_string());
        qb.push(")");
    }
    if let Some(end) = end_date {
        qb.push(" AND datetime(date) <= datetime(");
        qb.push_bind(end.to_string());
        qb.push(")");
    }
}

fn parse_date(name: &str, value: Option<String>, errors: &mut Vec<FieldError>) -> Option<Date> {
    let value = value?;
    let format = format_description!("[year]-[month]-[day]");
    match Date::parse(&value, &format) {
        Ok(date) => Some(date),
        Err(_) => {
            errors.push(FieldError::query(
                name,
                "Input should be a valid date",
                "date_parsing",
            ));
            None
        }
    }
}

fn parse_int(name: &str, value: Option<String>, errors: &mut Vec<FieldError>) -> Option<i64> {
    let value = value?;
    match value.parse::<i64>() {
        Ok(n) => Some(n),
        Err(_) => {
            errors.push(FieldError::query(
                name,
                "Input should be a valid integer",
                "int_parsing",
            ));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn params(pairs: &[(&str, &str)]) -> ListParams {
        let mut params = ListParams::default();
        for (key, value) in pairs {
            let value = Some(value.to_string());
            match *key {
                "start_date" => params.start_date = value,
                "end_date" => params.end_date = value,
                "category_id" => params.category_id = value,
                "skip" => params.skip = value,
                "limit" => params.limit = value,
                other => panic!("unknown param {other}"),
            }
        }
        params
    }

    fn validation_kinds(err: ApiError) -> Vec<(String, String)> {
        match err {
            ApiError::Validation(errors) => errors
                .into_iter()
                .map(|e| (e.loc.join("."), e.kind))
                .collect(),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn empty_params_fall_back_to_defaults() {
        let filter = ExpenseFilter::from_params(ListParams::default()).expect("defaults");
        assert_eq!(filter.skip, 0);
        assert_eq!(filter.limit, DEFAULT_LIMIT);
        assert_eq!(filter.start_date, None);
        assert_eq!(filter.end_date, None);
        assert_eq!(filter.category_id, None);
    }

    #[test]
    fn full_filter_parses() {
        let filter = ExpenseFilter::from_params(params(&[
            ("start_date", "2025-01-01"),
            ("end_date", "2025-01-31"),
            ("category_id", "2"),
            ("skip", "1"),
            ("limit", "10"),
        ]))
        .expect("valid filter");
        assert_eq!(filter.start_date, Some(date!(2025 - 01 - 01)));
        assert_eq!(filter.end_date, Some(date!(2025 - 01 - 31)));
        assert_eq!(filter.category_id, Some(2));
        assert_eq!(filter.skip, 1);
        assert_eq!(filter.limit, 10);
    }

    #[test]
    fn limit_above_cap_is_clamped() {
        let filter = ExpenseFilter::from_params(params(&[("limit", "5000")])).expect("clamped");
        assert_eq!(filter.limit, MAX_LIMIT);
    }

    #[test]
    fn zero_limit_is_allowed() {
        let filter = ExpenseFilter::from_params(params(&[("limit", "0")])).expect("limit 0");
        assert_eq!(filter.limit, 0);
    }

    #[test]
    fn non_iso_date_is_a_field_level_422() {
        let err = ExpenseFilter::from_params(params(&[("start_date", "01-01-2025")])).unwrap_err();
        assert_eq!(
            validation_kinds(err),
            vec![("query.start_date".to_string(), "date_parsing".to_string())]
        );
    }

    #[test]
    fn datetime_in_date_param_is_rejected() {
        let err =
            ExpenseFilter::from_params(params(&[("end_date", "2025-01-01T10:00:00Z")])).unwrap_err();
        assert_eq!(
            validation_kinds(err),
            vec![("query.end_date".to_string(), "date_parsing".to_string())]
        );
    }

    #[test]
    fn negative_skip_and_limit_are_rejected() {
        let err =
            ExpenseFilter::from_params(params(&[("skip", "-1"), ("limit", "-5")])).unwrap_err();
        let kinds = validation_kinds(err);
        assert!(kinds.contains(&("query.skip".to_string(), "greater_than_equal".to_string())));
        assert!(kinds.contains(&("query.limit".to_string(), "greater_than_equal".to_string())));
    }

    #[test]
    fn non_numeric_pagination_is_rejected() {
        let err = ExpenseFilter::from_params(params(&[("limit", "lots")])).unwrap_err();
        assert_eq!(
            validation_kinds(err),
            vec![("query.limit".to_string(), "int_parsing".to_string())]
        );
    }

    #[test]
    fn bad_values_are_all_reported_at_once() {
        let err = ExpenseFilter::from_params(params(&[
            ("start_date", "yesterday"),
            ("skip", "many"),
        ]))
        .unwrap_err();
        assert_eq!(validation_kinds(err).len(), 2);
    }

    #[test]
    fn plain_query_scopes_and_orders() {
        let filter = ExpenseFilter::from_params(ListParams::default()).expect("defaults");
        let sql = filter.to_query(7).into_sql();
        assert!(sql.starts_with("SELECT id, amount"));
        assert!(sql.contains("WHERE owner_id ="));
        assert!(sql.contains("ORDER BY id LIMIT"));
        assert!(!sql.contains("category_id ="));
        assert!(!sql.contains("datetime"));
    }

    #[test]
    fn date_bounds_compare_normalized_timestamps() {
        let filter = ExpenseFilter::from_params(params(&[
            ("start_date", "2025-01-01"),
            ("end_date", "2025-01-31"),
            ("category_id", "3"),
        ]))
        .expect("valid filter");
        let sql = filter.to_query(7).into_sql();
        assert!(sql.contains("datetime(date) >= datetime("));
        assert!(sql.contains("datetime(date) <= datetime("));
        assert!(sql.contains("AND category_id ="));
    }

    #[test]
    fn report_query_groups_and_excludes_uncategorized() {
        let range = DateRange::from_params(RangeParams::default()).expect("empty range");
        let sql = report_query(7, &range).into_sql();
        assert!(sql.contains("SUM(amount)"));
        assert!(sql.contains("category_id IS NOT NULL"));
        assert!(sql.contains("GROUP BY category_id"));
    }
}
