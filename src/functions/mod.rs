//! Edge Functions client

use log::info;
use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::fetch::Fetch;

/// Creates a cleaner row and emails the invitation link
pub const INVITE_CLEANER: &str = "invite-cleaner";

/// Deletes a cleaner together with its dependent rows
pub const DELETE_CLEANER: &str = "delete-cleaner";

/// Client for Edge Functions
pub struct FunctionsClient {
    /// The base URL for the project
    url: String,

    /// The anonymous API key for the project
    key: String,

    /// `X-Client-Info` header value
    client_info: String,

    /// HTTP client
    client: Client,
}

impl FunctionsClient {
    /// Create a new FunctionsClient
    pub(crate) fn new(url: &str, key: &str, client_info: &str, client: Client) -> Self {
        Self {
            url: url.to_string(),
            key: key.to_string(),
            client_info: client_info.to_string(),
            client,
        }
    }

    fn get_url(&self, function_name: &str) -> String {
        format!("{}/functions/v1/{}", self.url, function_name)
    }

    /// Invoke an edge function with a JSON body (HTTP POST)
    pub async fn invoke<T: Serialize + ?Sized, R: DeserializeOwned>(
        &self,
        function_name: &str,
        body: &T,
        options: &FunctionInvokeOptions,
    ) -> Result<R> {
        let url = self.get_url(function_name);

        let mut fetch = Fetch::post(&self.client, &url)
            .header("apikey", &self.key)
            .header("X-Client-Info", &self.client_info);

        for (key, value) in &options.headers {
            fetch = fetch.header(key, value);
        }

        let token = options.authorization.as_deref().unwrap_or(&self.key);
        let fetch = fetch.bearer_auth(token).json(body)?;

        info!("invoking function {}", function_name);

        fetch.execute::<R>().await.map_err(|e| match e {
            Error::Api { status, message } if status != 401 => Error::Function(message),
            other => other,
        })
    }
}

/// Options for invoking an edge function
#[derive(Debug, Clone, Default)]
pub struct FunctionInvokeOptions {
    /// Extra request headers
    pub headers: HashMap<String, String>,

    /// Bearer token; the API key is used when absent
    pub authorization: Option<String>,
}

impl FunctionInvokeOptions {
    /// Create new empty invoke options
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a request header
    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers.insert(key.to_string(), value.to_string());
        self
    }

    /// Set the authorization token
    pub fn with_auth(mut self, token: &str) -> Self {
        self.authorization = Some(token.to_string());
        self
    }
}
