//! Configuration options for the turnover client

use std::time::Duration;
use url::Url;

use crate::error::{Error, Result};

/// Configuration options for the client
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Whether to refresh an expired session before authenticated calls
    pub auto_refresh_token: bool,

    /// Whether a signed-in session is kept by the auth client
    pub persist_session: bool,

    /// The request timeout; `None` leaves requests unbounded
    pub request_timeout: Option<Duration>,

    /// The database schema
    pub db_schema: String,

    /// Where invited cleaners land to set their password
    pub invite_redirect: Option<String>,

    /// Value of the `X-Client-Info` header
    pub client_info: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            auto_refresh_token: true,
            persist_session: true,
            request_timeout: None,
            db_schema: "public".to_string(),
            invite_redirect: None,
            client_info: format!("turnover/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientOptions {
    /// Set whether to automatically refresh the token
    pub fn with_auto_refresh_token(mut self, value: bool) -> Self {
        self.auto_refresh_token = value;
        self
    }

    /// Set whether to persist the session
    pub fn with_persist_session(mut self, value: bool) -> Self {
        self.persist_session = value;
        self
    }

    /// Set the request timeout
    pub fn with_request_timeout(mut self, value: Option<Duration>) -> Self {
        self.request_timeout = value;
        self
    }

    /// Set the database schema
    pub fn with_db_schema(mut self, value: &str) -> Self {
        self.db_schema = value.to_string();
        self
    }

    /// Set the page invited cleaners are redirected to
    pub fn with_invite_redirect(mut self, value: &str) -> Self {
        self.invite_redirect = Some(value.to_string());
        self
    }
}

/// Project location and key, plus client options
#[derive(Debug, Clone)]
pub struct TurnoverConfig {
    /// Base URL of the backend project
    pub url: Url,
    /// Anonymous (publishable) API key
    pub anon_key: String,
    /// Client options
    pub options: ClientOptions,
}

impl TurnoverConfig {
    /// Creates a configuration, validating the URL and key
    pub fn new(url: &str, anon_key: &str) -> Result<Self> {
        let url = Url::parse(url)?;
        if anon_key.trim().is_empty() {
            return Err(Error::config("anon key cannot be empty"));
        }
        Ok(Self {
            url,
            anon_key: anon_key.to_string(),
            options: ClientOptions::default(),
        })
    }

    /// Replace the client options
    pub fn with_options(mut self, options: ClientOptions) -> Self {
        self.options = options;
        self
    }

    /// Reads `SUPABASE_URL`, `SUPABASE_ANON_KEY` and the optional
    /// `TURNOVER_INVITE_REDIRECT` / `TURNOVER_REQUEST_TIMEOUT_SECS`,
    /// loading a `.env` file first when present.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        let url = std::env::var("SUPABASE_URL")
            .map_err(|_| Error::config("SUPABASE_URL environment variable not found"))?;
        let key = std::env::var("SUPABASE_ANON_KEY")
            .map_err(|_| Error::config("SUPABASE_ANON_KEY environment variable not found"))?;

        let mut options = ClientOptions::default();
        if let Ok(redirect) = std::env::var("TURNOVER_INVITE_REDIRECT") {
            options = options.with_invite_redirect(&redirect);
        }
        if let Ok(secs) = std::env::var("TURNOVER_REQUEST_TIMEOUT_SECS") {
            let secs: u64 = secs.parse().map_err(|_| {
                Error::config(format!("TURNOVER_REQUEST_TIMEOUT_SECS is not a number: {}", secs))
            })?;
            options = options.with_request_timeout(Some(Duration::from_secs(secs)));
        }

        Ok(Self::new(&url, &key)?.with_options(options))
    }

    /// Base URL without a trailing slash
    pub fn base_url(&self) -> String {
        self.url.as_str().trim_end_matches('/').to_string()
    }
}
