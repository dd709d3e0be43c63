use std::{cmp::Ordering, collections::HashMap, fs, path::Path, sync::Arc};

use dashmap::DashMap;
use futures::future::{BoxFuture, FutureExt};
use serde_json::Value;

use super::{Direction, QuestionSource, Row, RowQuery, SourceError, SourceResult};

/// Question tables held in memory, optionally seeded from a JSON file shaped as
/// `{ "<table>": [ { column: value, ... }, ... ] }`.
#[derive(Debug, Default, Clone)]
pub struct MemoryQuestionSource {
    tables: Arc<DashMap<String, Vec<Row>>>,
}

impl MemoryQuestionSource {
    /// Create a source with no tables.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a source exposing the given (empty) tables.
    pub fn with_tables<I, S>(tables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let source = Self::new();
        for table in tables {
            source.tables.entry(table.into()).or_default();
        }
        source
    }

    /// Read a seed file into a new source.
    pub fn from_seed_file(path: &Path) -> SourceResult<Self> {
        let raw = fs::read_to_string(path).map_err(|source| {
            SourceError::unavailable(format!("reading seed `{}`", path.display()), source)
        })?;
        let seed: HashMap<String, Vec<Row>> = serde_json::from_str(&raw).map_err(|source| {
            SourceError::unavailable(format!("parsing seed `{}`", path.display()), source)
        })?;

        let source = Self::new();
        for (table, rows) in seed {
            source.tables.insert(table, rows);
        }
        Ok(source)
    }

    /// Synchronous query used by both the trait implementation and tests.
    pub fn query(&self, query: &RowQuery) -> SourceResult<Vec<Row>> {
        let table = self
            .tables
            .get(&query.table)
            .ok_or_else(|| SourceError::UnknownTable(query.table.clone()))?;

        let mut rows = table
            .iter()
            .filter(|row| {
                query
                    .filters
                    .iter()
                    .all(|(column, expected)| row.get(column) == Some(expected))
            })
            .cloned()
            .collect::<Vec<_>>();
        drop(table);

        if let Some((column, direction)) = &query.order {
            rows.sort_by(|a, b| {
                compare_nulls_last(a.get(column), b.get(column), *direction)
            });
        }

        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }

        if !query.columns.is_empty() {
            for row in &mut rows {
                row.retain(|column, _| query.columns.iter().any(|wanted| wanted == column));
            }
        }

        Ok(rows)
    }
}

impl QuestionSource for MemoryQuestionSource {
    fn fetch(&self, query: RowQuery) -> BoxFuture<'static, SourceResult<Vec<Row>>> {
        let result = self.query(&query);
        async move { result }.boxed()
    }

    fn insert(&self, table: &str, rows: Vec<Row>) -> BoxFuture<'static, SourceResult<()>> {
        self.tables.entry(table.to_string()).or_default().extend(rows);
        async { Ok(()) }.boxed()
    }

    fn health_check(&self) -> BoxFuture<'static, SourceResult<()>> {
        async { Ok(()) }.boxed()
    }
}

fn compare_nulls_last(a: Option<&Value>, b: Option<&Value>, direction: Direction) -> Ordering {
    let a = a.filter(|value| !value.is_null());
    let b = b.filter(|value| !value.is_null());
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => {
            let ordering = compare_values(a, b);
            match direction {
                Direction::Ascending => ordering,
                Direction::Descending => ordering.reverse(),
            }
        }
    }
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(a), Value::Number(b)) => a
            .as_f64()
            .partial_cmp(&b.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::String(a), Value::String(b)) => a.cmp(b),
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        _ => Ordering::Equal,
    }
}
