//! Database operations through the PostgREST API

mod filter;
mod query;
mod types;

use reqwest::Client;
use serde::Serialize;

pub use filter::*;
pub use query::*;
pub use types::*;

/// Client for database operations on one table
pub struct PostgrestClient {
    target: RequestTarget,
}

impl PostgrestClient {
    /// Create a new PostgrestClient
    ///
    /// `token` is the bearer credential: the signed-in session's access
    /// token, or the API key for anonymous access.
    pub(crate) fn new(
        url: &str,
        key: &str,
        token: &str,
        table: &str,
        schema: &str,
        client_info: &str,
        client: Client,
    ) -> Self {
        Self {
            target: RequestTarget {
                url: format!("{}/rest/v1/{}", url, table),
                key: key.to_string(),
                token: token.to_string(),
                schema: schema.to_string(),
                client_info: client_info.to_string(),
                client,
            },
        }
    }

    /// Table URL requests are sent to
    pub fn url(&self) -> &str {
        &self.target.url
    }

    /// Select specific columns from the table
    pub fn select(&self, columns: &str) -> SelectBuilder {
        SelectBuilder::new(self.target.clone(), columns)
    }

    /// Insert data into the table
    pub fn insert<T: Serialize>(&self, values: T) -> InsertBuilder<T> {
        InsertBuilder::new(self.target.clone(), values)
    }

    /// Update data in the table
    pub fn update<T: Serialize>(&self, values: T) -> UpdateBuilder<T> {
        UpdateBuilder::new(self.target.clone(), values)
    }

    /// Delete data from the table
    pub fn delete(&self) -> DeleteBuilder {
        DeleteBuilder::new(self.target.clone())
    }
}
