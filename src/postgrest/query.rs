//! Query builders for PostgrestClient

use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};
use std::fmt;

use crate::error::Error;
use crate::fetch::{Fetch, FetchBuilder};
use crate::postgrest::filter::*;
use crate::postgrest::types::*;

/// Where a request goes and with which credentials
#[derive(Debug, Clone)]
pub struct RequestTarget {
    /// Full table URL
    pub url: String,
    /// The API key
    pub key: String,
    /// Bearer token (session access token, or the API key)
    pub token: String,
    /// Database schema
    pub schema: String,
    /// `X-Client-Info` header value
    pub client_info: String,
    /// HTTP client
    pub client: Client,
}

impl RequestTarget {
    fn decorate<'a>(&self, fetch: FetchBuilder<'a>, read: bool) -> FetchBuilder<'a> {
        let fetch = fetch
            .header("apikey", &self.key)
            .header("X-Client-Info", &self.client_info)
            .bearer_auth(&self.token);

        if self.schema == "public" {
            fetch
        } else if read {
            fetch.header("Accept-Profile", &self.schema)
        } else {
            fetch.header("Content-Profile", &self.schema)
        }
    }
}

/// Base query builder
#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    params: Vec<(String, String)>,
}

impl QueryBuilder {
    /// Create a new QueryBuilder
    pub fn new() -> Self {
        Self { params: Vec::new() }
    }

    /// Add a parameter to the query
    pub fn add_param(&mut self, key: &str, value: &str) {
        self.params.push((key.to_string(), value.to_string()));
    }

    /// Replace a parameter (used for `limit`, `order`, `select`)
    pub fn set_param(&mut self, key: &str, value: &str) {
        self.params.retain(|(k, _)| k != key);
        self.add_param(key, value);
    }

    /// Add a filter
    pub fn add_filter(&mut self, filter: Filter) {
        self.params.push(filter.to_param());
    }

    /// Get the query parameters
    pub fn get_params(&self) -> &[(String, String)] {
        &self.params
    }

    /// Whether any row filter has been added
    pub fn has_filters(&self) -> bool {
        self.params
            .iter()
            .any(|(k, _)| !matches!(k.as_str(), "select" | "order" | "limit" | "offset"))
    }
}

/// Builder for SELECT queries
pub struct SelectBuilder {
    target: RequestTarget,
    query: QueryBuilder,
}

impl SelectBuilder {
    /// Create a new SelectBuilder
    pub fn new(target: RequestTarget, columns: &str) -> Self {
        let mut query = QueryBuilder::new();
        query.add_param("select", columns);

        Self { target, query }
    }

    /// Filter rows where column equals a value
    pub fn eq<T: fmt::Display>(&mut self, column: &str, value: T) -> &mut Self {
        self.query.add_filter(Filter::new(column, FilterOperator::Eq, value));
        self
    }

    /// Filter rows where column does not equal a value
    pub fn neq<T: fmt::Display>(&mut self, column: &str, value: T) -> &mut Self {
        self.query.add_filter(Filter::new(column, FilterOperator::Neq, value));
        self
    }

    /// Filter rows where column is greater than or equal to a value
    pub fn gte<T: fmt::Display>(&mut self, column: &str, value: T) -> &mut Self {
        self.query.add_filter(Filter::new(column, FilterOperator::Gte, value));
        self
    }

    /// Filter rows where column is less than or equal to a value
    pub fn lte<T: fmt::Display>(&mut self, column: &str, value: T) -> &mut Self {
        self.query.add_filter(Filter::new(column, FilterOperator::Lte, value));
        self
    }

    /// Filter rows where column is null
    pub fn is_null(&mut self, column: &str) -> &mut Self {
        self.query.add_filter(Filter::new(column, FilterOperator::Is, "null"));
        self
    }

    /// Filter rows where column is in a list of values
    pub fn in_list<T: fmt::Display>(&mut self, column: &str, values: &[T]) -> &mut Self {
        self.query.add_filter(Filter::in_list(column, values));
        self
    }

    /// Limit the number of rows returned
    pub fn limit(&mut self, count: usize) -> &mut Self {
        self.query.set_param("limit", &count.to_string());
        self
    }

    /// Order the results by a column
    pub fn order(&mut self, column: &str, order: SortOrder) -> &mut Self {
        self.query
            .set_param("order", &format!("{}.{}", column, order.as_str()));
        self
    }

    /// Query parameters built so far
    pub fn params(&self) -> &[(String, String)] {
        self.query.get_params()
    }

    /// Execute the query and return the results
    pub async fn execute<T: DeserializeOwned>(&self) -> Result<Vec<T>, Error> {
        let fetch = self
            .target
            .decorate(Fetch::get(&self.target.client, &self.target.url), true)
            .query(self.query.get_params());

        fetch.execute::<Vec<T>>().await
    }

    /// Execute the query and return the first row
    pub async fn execute_one<T: DeserializeOwned>(&mut self) -> Result<Option<T>, Error> {
        self.limit(1);

        let results = self.execute::<T>().await?;
        Ok(results.into_iter().next())
    }
}

/// Builder for INSERT queries
pub struct InsertBuilder<T: Serialize> {
    target: RequestTarget,
    values: T,
}

impl<T: Serialize> InsertBuilder<T> {
    /// Create a new InsertBuilder
    pub fn new(target: RequestTarget, values: T) -> Self {
        Self { target, values }
    }

    /// Execute the query and return the inserted rows
    pub async fn execute<R: DeserializeOwned>(&self) -> Result<Vec<R>, Error> {
        let fetch = self
            .target
            .decorate(Fetch::post(&self.target.client, &self.target.url), false)
            .header("Prefer", ReturnOption::Representation.as_prefer())
            .json(&self.values)?;

        fetch.execute::<Vec<R>>().await
    }

    /// Execute the query without returning the inserted data
    pub async fn execute_no_return(&self) -> Result<(), Error> {
        let fetch = self
            .target
            .decorate(Fetch::post(&self.target.client, &self.target.url), false)
            .header("Prefer", ReturnOption::Minimal.as_prefer())
            .json(&self.values)?;

        fetch.execute_empty().await
    }
}

/// Builder for UPDATE queries
pub struct UpdateBuilder<T: Serialize> {
    target: RequestTarget,
    values: T,
    query: QueryBuilder,
}

impl<T: Serialize> UpdateBuilder<T> {
    /// Create a new UpdateBuilder
    pub fn new(target: RequestTarget, values: T) -> Self {
        Self {
            target,
            values,
            query: QueryBuilder::new(),
        }
    }

    /// Filter rows where column equals a value
    pub fn eq<V: fmt::Display>(&mut self, column: &str, value: V) -> &mut Self {
        self.query.add_filter(Filter::new(column, FilterOperator::Eq, value));
        self
    }

    /// Filter rows where column is null
    pub fn is_null(&mut self, column: &str) -> &mut Self {
        self.query.add_filter(Filter::new(column, FilterOperator::Is, "null"));
        self
    }

    /// Execute the query and return the updated rows
    pub async fn execute<R: DeserializeOwned>(&self) -> Result<Vec<R>, Error> {
        if !self.query.has_filters() {
            return Err(Error::database("refusing to update without a filter"));
        }

        let fetch = self
            .target
            .decorate(Fetch::patch(&self.target.client, &self.target.url), false)
            .header("Prefer", ReturnOption::Representation.as_prefer())
            .query(self.query.get_params())
            .json(&self.values)?;

        fetch.execute::<Vec<R>>().await
    }
}

/// Builder for DELETE queries
pub struct DeleteBuilder {
    target: RequestTarget,
    query: QueryBuilder,
}

impl DeleteBuilder {
    /// Create a new DeleteBuilder
    pub fn new(target: RequestTarget) -> Self {
        Self {
            target,
            query: QueryBuilder::new(),
        }
    }

    /// Filter rows where column equals a value
    pub fn eq<V: fmt::Display>(&mut self, column: &str, value: V) -> &mut Self {
        self.query.add_filter(Filter::new(column, FilterOperator::Eq, value));
        self
    }

    /// Execute the query without returning the deleted data
    pub async fn execute_no_return(&self) -> Result<(), Error> {
        if !self.query.has_filters() {
            return Err(Error::database("refusing to delete without a filter"));
        }

        let fetch = self
            .target
            .decorate(Fetch::delete(&self.target.client, &self.target.url), false)
            .header("Prefer", ReturnOption::Minimal.as_prefer())
            .query(self.query.get_params());

        fetch.execute_empty().await
    }
}
