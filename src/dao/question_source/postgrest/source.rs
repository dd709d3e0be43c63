use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use reqwest::{Client, Method};
use serde_json::Value;

use crate::dao::question_source::{
    Direction, QuestionSource, Row, RowQuery, SourceError, SourceResult,
};

use super::{
    config::PostgrestConfig,
    error::{PostgrestError, PostgrestResult},
};

/// Question source backed by a PostgREST endpoint (the hosted tables).
#[derive(Clone)]
pub struct PostgrestQuestionSource {
    client: Client,
    base_url: Arc<str>,
    api_key: Option<Arc<str>>,
}

impl PostgrestQuestionSource {
    /// Build the HTTP client for the configured endpoint.
    pub fn connect(config: PostgrestConfig) -> PostgrestResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|source| PostgrestError::ClientBuilder { source })?;

        Ok(Self {
            client,
            base_url: Arc::<str>::from(config.base_url.trim_end_matches('/')),
            api_key: config.api_key.map(Arc::<str>::from),
        })
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = if path.is_empty() {
            format!("{}/", self.base_url)
        } else {
            format!("{}/{}", self.base_url, path)
        };
        let builder = self.client.request(method, url);
        match self.api_key {
            Some(ref key) => builder
                .header("apikey", key.as_ref())
                .bearer_auth(key.as_ref()),
            None => builder,
        }
    }

    async fn run_query(&self, query: RowQuery) -> PostgrestResult<Vec<Row>> {
        let response = self
            .request(Method::GET, &query.table)
            .query(&query_params(&query))
            .send()
            .await
            .map_err(|source| PostgrestError::RequestSend {
                table: query.table.clone(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(PostgrestError::RequestStatus {
                table: query.table,
                status: response.status(),
            });
        }

        response
            .json::<Vec<Row>>()
            .await
            .map_err(|source| PostgrestError::DecodeResponse {
                table: query.table,
                source,
            })
    }

    async fn run_insert(&self, table: String, rows: Vec<Row>) -> PostgrestResult<()> {
        let response = self
            .request(Method::POST, &table)
            .header("Prefer", "return=minimal")
            .json(&rows)
            .send()
            .await
            .map_err(|source| PostgrestError::RequestSend {
                table: table.clone(),
                source,
            })?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(PostgrestError::RequestStatus {
                table,
                status: response.status(),
            })
        }
    }

    async fn run_health_check(&self) -> PostgrestResult<()> {
        let response = self
            .request(Method::GET, "")
            .send()
            .await
            .map_err(|source| PostgrestError::RequestSend {
                table: String::new(),
                source,
            })?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(PostgrestError::RequestStatus {
                table: String::new(),
                status: response.status(),
            })
        }
    }
}

impl QuestionSource for PostgrestQuestionSource {
    fn fetch(&self, query: RowQuery) -> BoxFuture<'static, SourceResult<Vec<Row>>> {
        let source = self.clone();
        async move {
            source
                .run_query(query)
                .await
                .map_err(|err| SourceError::unavailable("could not load questions", err))
        }
        .boxed()
    }

    fn insert(&self, table: &str, rows: Vec<Row>) -> BoxFuture<'static, SourceResult<()>> {
        let source = self.clone();
        let table = table.to_string();
        async move {
            source
                .run_insert(table, rows)
                .await
                .map_err(|err| SourceError::unavailable("could not insert rows", err))
        }
        .boxed()
    }

    fn health_check(&self) -> BoxFuture<'static, SourceResult<()>> {
        let source = self.clone();
        async move {
            source
                .run_health_check()
                .await
                .map_err(|err| SourceError::unavailable("endpoint unreachable", err))
        }
        .boxed()
    }
}

/// Translate a [`RowQuery`] into PostgREST query-string parameters.
fn query_params(query: &RowQuery) -> Vec<(String, String)> {
    let mut params = Vec::new();

    if !query.columns.is_empty() {
        params.push(("select".to_string(), query.columns.join(",")));
    }

    for (column, value) in &query.filters {
        let filter = match value {
            Value::Null => "is.null".to_string(),
            Value::String(text) => format!("eq.{text}"),
            other => format!("eq.{other}"),
        };
        params.push((column.clone(), filter));
    }

    if let Some((column, direction)) = &query.order {
        let suffix = match direction {
            Direction::Ascending => "asc.nullslast",
            Direction::Descending => "desc.nullslast",
        };
        params.push(("order".to_string(), format!("{column}.{suffix}")));
    }

    if let Some(limit) = query.limit {
        params.push(("limit".to_string(), limit.to_string()));
    }

    params
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_every_clause() {
        let query = RowQuery::from("triviabuddy")
            .select(["id", "category"])
            .eq("category", "Prophets")
            .eq("points", 200)
            .eq("active", Value::Null)
            .order("points", Direction::Descending)
            .limit(5);

        assert_eq!(
            query_params(&query),
            vec![
                ("select".to_string(), "id,category".to_string()),
                ("category".to_string(), "eq.Prophets".to_string()),
                ("points".to_string(), "eq.200".to_string()),
                ("active".to_string(), "is.null".to_string()),
                ("order".to_string(), "points.desc.nullslast".to_string()),
                ("limit".to_string(), "5".to_string()),
            ]
        );
    }

    #[test]
    fn bare_query_has_no_params() {
        assert!(query_params(&RowQuery::from("hifzbuddy")).is_empty());
    }
}
