//! Filtering, ordering and pagination over serialized records.
//!
//! Records are matched against their JSON form, so any field a record
//! serializes can be filtered or sorted on. Nested fields use dotted paths
//! (`counterparty.name`).

use std::cmp::Ordering;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use serde_json::Value;

use super::errors::DomainError;

pub const DEFAULT_PAGE_LIMIT: i64 = 20;
pub const MAX_PAGE_LIMIT: i64 = 100;

#[derive(Debug, Clone, PartialEq)]
pub enum FilterOp {
    ExactMatch(String),
    Contains(String),
    LessThan(String),
    GreaterThan(String),
    /// Inclusive on both ends.
    Between(String, String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub field: String,
    pub op: FilterOp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub field: String,
    pub direction: SortDirection,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListQuery {
    pub filters: Vec<Filter>,
    pub order_by: Option<OrderBy>,
    pub page: i64,
    pub limit: i64,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            filters: Vec::new(),
            order_by: None,
            page: 1,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

impl ListQuery {
    /// Build a query from its textual form.
    ///
    /// `filter` is a `;`-separated list of `field:op:value` expressions where
    /// `op` is one of `eq`, `contains`, `lt`, `gt`, `between` (value `lo..hi`).
    /// `order_by` is `field` or `field:asc|desc`.
    pub fn parse(
        filter: Option<&str>,
        order_by: Option<&str>,
        page: Option<i64>,
        limit: Option<i64>,
    ) -> Result<Self, DomainError> {
        let filters = match filter {
            Some(text) => text
                .split(';')
                .filter(|expr| !expr.trim().is_empty())
                .map(Filter::parse)
                .collect::<Result<Vec<_>, _>>()?,
            None => Vec::new(),
        };
        let order_by = order_by
            .filter(|text| !text.trim().is_empty())
            .map(OrderBy::parse)
            .transpose()?;

        Ok(Self {
            filters,
            order_by,
            page: page.unwrap_or(1).max(1),
            limit: limit
                .unwrap_or(DEFAULT_PAGE_LIMIT)
                .clamp(1, MAX_PAGE_LIMIT),
        })
    }

    pub fn with_filter(mut self, field: impl Into<String>, op: FilterOp) -> Self {
        self.filters.push(Filter {
            field: field.into(),
            op,
        });
        self
    }

    pub fn ordered_by(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.order_by = Some(OrderBy {
            field: field.into(),
            direction,
        });
        self
    }

    pub fn matches(&self, record: &Value) -> bool {
        self.filters.iter().all(|f| f.matches(record))
    }

    /// Filter, sort and paginate `records`, returning the selected entries.
    pub fn apply<T: Clone>(&self, records: Vec<(Value, &T)>) -> Page<T> {
        let mut selected: Vec<(Value, &T)> = records
            .into_iter()
            .filter(|(json, _)| self.matches(json))
            .collect();

        let order_by = self.order_by.clone().unwrap_or(OrderBy {
            field: "created_at".to_string(),
            direction: SortDirection::Desc,
        });
        selected.sort_by(|(a, _), (b, _)| {
            let left = lookup(a, &order_by.field).and_then(scalar_text);
            let right = lookup(b, &order_by.field).and_then(scalar_text);
            match (left, right) {
                (Some(l), Some(r)) => match order_by.direction {
                    SortDirection::Asc => compare_values(&l, &r),
                    SortDirection::Desc => compare_values(&r, &l),
                },
                // Records without the field always sort last.
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            }
        });

        let total = selected.len() as i64;
        let offset = usize::try_from((self.page - 1).saturating_mul(self.limit))
            .unwrap_or(usize::MAX);
        let items = selected
            .into_iter()
            .skip(offset)
            .take(self.limit as usize)
            .map(|(_, record)| record.clone())
            .collect();

        Page {
            items,
            total,
            page: self.page,
            limit: self.limit,
        }
    }
}

impl Filter {
    fn parse(expr: &str) -> Result<Self, DomainError> {
        let mut parts = expr.trim().splitn(3, ':');
        let (Some(field), Some(op), Some(value)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(DomainError::InvalidInput(format!(
                "filter '{}' must look like field:op:value",
                expr
            )));
        };
        if field.is_empty() {
            return Err(DomainError::InvalidInput(format!(
                "filter '{}' names no field",
                expr
            )));
        }

        let value = value.to_string();
        let op = match op {
            "eq" => FilterOp::ExactMatch(value),
            "contains" => FilterOp::Contains(value),
            "lt" => FilterOp::LessThan(value),
            "gt" => FilterOp::GreaterThan(value),
            "between" => {
                let (lo, hi) = value.split_once("..").ok_or_else(|| {
                    DomainError::InvalidInput(format!(
                        "between filter '{}' needs a value like lo..hi",
                        expr
                    ))
                })?;
                FilterOp::Between(lo.to_string(), hi.to_string())
            }
            other => {
                return Err(DomainError::InvalidInput(format!(
                    "unknown filter operator '{}'",
                    other
                )))
            }
        };

        Ok(Self {
            field: field.to_string(),
            op,
        })
    }

    pub fn matches(&self, record: &Value) -> bool {
        let Some(actual) = lookup(record, &self.field).and_then(scalar_text) else {
            return false;
        };
        match &self.op {
            FilterOp::ExactMatch(expected) => compare_values(&actual, expected) == Ordering::Equal,
            FilterOp::Contains(needle) => actual.to_lowercase().contains(&needle.to_lowercase()),
            FilterOp::LessThan(bound) => compare_values(&actual, bound) == Ordering::Less,
            FilterOp::GreaterThan(bound) => compare_values(&actual, bound) == Ordering::Greater,
            FilterOp::Between(lo, hi) => {
                compare_values(&actual, lo) != Ordering::Less
                    && compare_values(&actual, hi) != Ordering::Greater
            }
        }
    }
}

impl OrderBy {
    fn parse(text: &str) -> Result<Self, DomainError> {
        let (field, direction) = match text.trim().split_once(':') {
            Some((field, "asc")) => (field, SortDirection::Asc),
            Some((field, "desc")) => (field, SortDirection::Desc),
            Some((_, other)) => {
                return Err(DomainError::InvalidInput(format!(
                    "unknown sort direction '{}'",
                    other
                )))
            }
            None => (text.trim(), SortDirection::Asc),
        };
        Ok(Self {
            field: field.to_string(),
            direction,
        })
    }
}

fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(value, |current, key| current.get(key))
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Numeric comparison when both sides are decimals, lexical otherwise.
fn compare_values(left: &str, right: &str) -> Ordering {
    match (BigDecimal::from_str(left), BigDecimal::from_str(right)) {
        (Ok(l), Ok(r)) => l.cmp(&r),
        _ => left.cmp(right),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn records() -> Vec<Value> {
        vec![
            json!({"name": "Widget", "stock": 3, "price": "9.50", "created_at": "2026-01-01T00:00:00Z", "supplier": {"name": "Acme"}}),
            json!({"name": "Gadget", "stock": 12, "price": "19.99", "created_at": "2026-02-01T00:00:00Z", "supplier": {"name": "Globex"}}),
            json!({"name": "Gizmo", "stock": 40, "price": "100", "created_at": "2026-03-01T00:00:00Z"}),
        ]
    }

    fn names(query: &ListQuery) -> Vec<String> {
        let data = records();
        let pairs = data.iter().map(|v| (v.clone(), v)).collect();
        query
            .apply(pairs)
            .items
            .into_iter()
            .map(|v| v["name"].as_str().unwrap().to_string())
            .collect()
    }

    #[test]
    fn default_order_is_newest_first() {
        assert_eq!(names(&ListQuery::default()), vec!["Gizmo", "Gadget", "Widget"]);
    }

    #[test]
    fn numeric_fields_compare_as_numbers() {
        let query = ListQuery::default().with_filter("stock", FilterOp::LessThan("10".into()));
        assert_eq!(names(&query), vec!["Widget"]);

        // Lexically "100" < "19.99"; numerically it is not.
        let query = ListQuery::default()
            .with_filter("price", FilterOp::GreaterThan("20".into()))
            .ordered_by("price", SortDirection::Asc);
        assert_eq!(names(&query), vec!["Gizmo"]);
    }

    #[test]
    fn exact_match_treats_equal_decimals_as_equal() {
        let query = ListQuery::default().with_filter("price", FilterOp::ExactMatch("9.5".into()));
        assert_eq!(names(&query), vec!["Widget"]);
    }

    #[test]
    fn contains_is_case_insensitive_and_follows_dotted_paths() {
        let query =
            ListQuery::default().with_filter("supplier.name", FilterOp::Contains("glob".into()));
        assert_eq!(names(&query), vec!["Gadget"]);
    }

    #[test]
    fn between_is_inclusive() {
        let query = ListQuery::default()
            .with_filter("stock", FilterOp::Between("3".into(), "12".into()))
            .ordered_by("stock", SortDirection::Asc);
        assert_eq!(names(&query), vec!["Widget", "Gadget"]);
    }

    #[test]
    fn records_missing_the_sort_field_come_last() {
        let query = ListQuery::default().ordered_by("supplier.name", SortDirection::Desc);
        assert_eq!(names(&query), vec!["Gadget", "Widget", "Gizmo"]);
    }

    #[test]
    fn pagination_reports_total_before_slicing() {
        let data = records();
        let pairs = data.iter().map(|v| (v.clone(), v)).collect();
        let query = ListQuery::parse(None, Some("name:asc"), Some(2), Some(2)).unwrap();
        let page = query.apply(pairs);
        assert_eq!(page.total, 3);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0]["name"], "Widget");
    }

    #[test]
    fn page_far_past_the_end_is_empty() {
        let data = records();
        let pairs = data.iter().map(|v| (v.clone(), v)).collect();
        let query = ListQuery::parse(None, None, Some(i64::MAX), Some(100)).unwrap();
        let page = query.apply(pairs);
        assert_eq!(page.total, 3);
        assert!(page.items.is_empty());
        assert_eq!(page.page, i64::MAX);
    }

    #[test]
    fn parse_reads_textual_filters() {
        let query = ListQuery::parse(
            Some("status:eq:pending;total_amount:between:10..20"),
            Some("total_amount:desc"),
            None,
            Some(500),
        )
        .unwrap();
        assert_eq!(query.filters.len(), 2);
        assert_eq!(
            query.filters[1].op,
            FilterOp::Between("10".into(), "20".into())
        );
        assert_eq!(query.order_by.unwrap().direction, SortDirection::Desc);
        assert_eq!(query.limit, MAX_PAGE_LIMIT);
        assert_eq!(query.page, 1);
    }

    #[test]
    fn parse_keeps_colons_inside_values() {
        let query =
            ListQuery::parse(Some("created_at:gt:2026-01-15T00:00:00Z"), None, None, None).unwrap();
        assert_eq!(
            query.filters[0].op,
            FilterOp::GreaterThan("2026-01-15T00:00:00Z".into())
        );
        assert_eq!(names(&query), vec!["Gizmo", "Gadget"]);
    }

    #[test]
    fn parse_rejects_malformed_expressions() {
        assert!(ListQuery::parse(Some("status"), None, None, None).is_err());
        assert!(ListQuery::parse(Some("status:like:x"), None, None, None).is_err());
        assert!(ListQuery::parse(Some("stock:between:5"), None, None, None).is_err());
        assert!(ListQuery::parse(None, Some("name:sideways"), None, None).is_err());
    }
}
