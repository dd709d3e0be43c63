mod memory;
#[cfg(feature = "postgrest-source")]
pub mod postgrest;

pub use memory::MemoryQuestionSource;

use std::error::Error;

use futures::future::BoxFuture;
use serde_json::{Map, Value};
use thiserror::Error;

/// One row as returned by the hosted table, column name to JSON value.
pub type Row = Map<String, Value>;

/// Result alias for question source operations.
pub type SourceResult<T> = Result<T, SourceError>;

/// Failure raised while querying the hosted question tables.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The backend could not be reached or answered with an error.
    #[error("question source unavailable: {message}")]
    Unavailable {
        /// Human readable summary, suitable for an error banner.
        message: String,
        /// Backend failure.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// The requested table does not exist.
    #[error("unknown table `{0}`")]
    UnknownTable(String),
}

impl SourceError {
    /// Wrap any backend failure.
    pub fn unavailable(
        message: impl Into<String>,
        source: impl Error + Send + Sync + 'static,
    ) -> Self {
        SourceError::Unavailable {
            message: message.into(),
            source: Box::new(source),
        }
    }
}

/// Sort direction of an `order` clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Smallest first, `null` last.
    Ascending,
    /// Largest first, `null` last.
    Descending,
}

/// Row query against a single table: projection, equality filters, ordering and limit.
#[derive(Debug, Clone, PartialEq)]
pub struct RowQuery {
    /// Target table.
    pub table: String,
    /// Projected columns; empty means every column.
    pub columns: Vec<String>,
    /// Conjunction of `column == value` filters.
    pub filters: Vec<(String, Value)>,
    /// Optional ordering clause.
    pub order: Option<(String, Direction)>,
    /// Optional maximum number of rows.
    pub limit: Option<usize>,
}

impl RowQuery {
    /// Start a query selecting every column of `table`.
    pub fn from(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            columns: Vec::new(),
            filters: Vec::new(),
            order: None,
            limit: None,
        }
    }

    /// Restrict the projection to the given columns.
    pub fn select<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Add an equality filter.
    pub fn eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push((column.into(), value.into()));
        self
    }

    /// Order the result by `column`.
    pub fn order(mut self, column: impl Into<String>, direction: Direction) -> Self {
        self.order = Some((column.into(), direction));
        self
    }

    /// Cap the number of returned rows.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Hosted row store the games read their content from.
pub trait QuestionSource: Send + Sync {
    /// Run a query and return the matching rows.
    fn fetch(&self, query: RowQuery) -> BoxFuture<'static, SourceResult<Vec<Row>>>;
    /// Append rows to `table`.
    fn insert(&self, table: &str, rows: Vec<Row>) -> BoxFuture<'static, SourceResult<()>>;
    /// Cheap connectivity probe used by the health route.
    fn health_check(&self) -> BoxFuture<'static, SourceResult<()>>;
}

/// Decode a column that may hold JSON encoded as a string.
///
/// Strings that do not parse as JSON are returned unchanged, `null` stays `null`.
pub fn safe_parse(value: Value) -> Value {
    match value {
        Value::String(raw) => serde_json::from_str(&raw).unwrap_or(Value::String(raw)),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn safe_parse_handles_encoded_and_plain_values() {
        assert_eq!(
            safe_parse(json!("{\"options\":[\"a\"]}")),
            json!({"options": ["a"]})
        );
        assert_eq!(safe_parse(json!("plain prompt")), json!("plain prompt"));
        assert_eq!(safe_parse(json!({"index": 2})), json!({"index": 2}));
        assert_eq!(safe_parse(Value::Null), Value::Null);
    }

    #[test]
    fn builder_accumulates_clauses() {
        let query = RowQuery::from("hifzbuddy")
            .select(["id", "qtype"])
            .eq("active", true)
            .order("difficulty", Direction::Ascending)
            .limit(10);

        assert_eq!(query.columns, vec!["id", "qtype"]);
        assert_eq!(query.filters, vec![("active".to_string(), json!(true))]);
        assert_eq!(
            query.order,
            Some(("difficulty".to_string(), Direction::Ascending))
        );
        assert_eq!(query.limit, Some(10));
    }
}
