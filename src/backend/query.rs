//! Query descriptors and the resolver that evaluates them over a table.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::cmp::Ordering;
use tracing::debug;

use super::store::{Record, Table};
use crate::error::BackendResult;

/// `column = value`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Filter {
    pub column: String,
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderBy {
    pub column: String,
    pub ascending: bool,
}

/// Which rows of a table an operation applies to.
///
/// Filters are all equality and are AND-ed together. Ordering is a stable
/// sort on a single column and `limit` keeps a prefix of the result; there
/// is no offset or cursor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Query {
    pub table: Table,
    pub filters: Vec<Filter>,
    pub order: Option<OrderBy>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn table(table: Table) -> Self {
        Self {
            table,
            filters: Vec::new(),
            order: None,
            limit: None,
        }
    }

    /// Shorthand for `Query::table(table).eq("id", id)`.
    pub fn by_id(table: Table, id: &str) -> Self {
        Self::table(table).eq("id", id)
    }

    pub fn eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push(Filter {
            column: column.into(),
            value: value.into(),
        });
        self
    }

    pub fn order(mut self, column: impl Into<String>, ascending: bool) -> Self {
        self.order = Some(OrderBy {
            column: column.into(),
            ascending,
        });
        self
    }

    pub fn limit(mut self, count: usize) -> Self {
        self.limit = Some(count);
        self
    }
}

/// Positions in `rows` selected by `query`, in result order.
pub fn resolve<T: Record>(rows: &[T], query: &Query) -> BackendResult<Vec<usize>> {
    let mut hits = Vec::new();
    for (index, row) in rows.iter().enumerate() {
        let value = serde_json::to_value(row)?;
        let matches = query.filters.iter().all(|filter| {
            value.get(&filter.column).unwrap_or(&Value::Null) == &filter.value
        });
        if matches {
            hits.push((index, value));
        }
    }

    if let Some(order) = &query.order {
        hits.sort_by(|(_, a), (_, b)| {
            let ordering = compare_values(a.get(&order.column), b.get(&order.column));
            if order.ascending {
                ordering
            } else {
                ordering.reverse()
            }
        });
    }

    if let Some(limit) = query.limit {
        hits.truncate(limit);
    }

    debug!(
        "Resolved {} of {} rows in {}",
        hits.len(),
        rows.len(),
        query.table
    );

    Ok(hits.into_iter().map(|(index, _)| index).collect())
}

/// Nulls sort first. Strings that both parse as RFC 3339 compare as instants.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let a = a.filter(|v| !v.is_null());
    let b = b.filter(|v| !v.is_null());

    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => {
            match (x.parse::<DateTime<Utc>>(), y.parse::<DateTime<Utc>>()) {
                (Ok(x), Ok(y)) => x.cmp(&y),
                _ => x.cmp(y),
            }
        }
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        _ => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_timestamps_compare_chronologically() {
        // Lexically '.' < 'Z', which would put the later instant first.
        let whole = json!("2024-01-01T00:00:00Z");
        let fractional = json!("2024-01-01T00:00:00.500Z");
        assert_eq!(
            compare_values(Some(&whole), Some(&fractional)),
            Ordering::Less
        );
    }

    #[test]
    fn test_numbers_compare_numerically() {
        assert_eq!(
            compare_values(Some(&json!(9)), Some(&json!(10))),
            Ordering::Less
        );
    }

    #[test]
    fn test_nulls_sort_first() {
        assert_eq!(
            compare_values(Some(&Value::Null), Some(&json!("a"))),
            Ordering::Less
        );
        assert_eq!(compare_values(None, None), Ordering::Equal);
    }

    #[test]
    fn test_builder_collects_descriptor() {
        let query = Query::table(Table::Products)
            .eq("user_id", "1")
            .order("created_at", false)
            .limit(10);

        assert_eq!(query.filters.len(), 1);
        assert_eq!(query.filters[0].value, json!("1"));
        assert_eq!(query.order.as_ref().map(|o| o.ascending), Some(false));
        assert_eq!(query.limit, Some(10));
    }
}
