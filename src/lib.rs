//! Turnover: client library for a short-term-rental cleaning dashboard
//!
//! Hosts manage apartments, cleaners and cleaning tasks; cleaners see their
//! assignments and mark the days they cannot work. Persistence, auth and
//! cascading deletes live in a hosted Supabase project reached through the
//! typed clients in this crate. The pieces of real logic (month grids,
//! availability editing, task filtering) are pure functions in
//! [`calendar`], [`availability`] and [`filter`].

pub mod access;
pub mod auth;
pub mod availability;
pub mod calendar;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod fetch;
pub mod filter;
pub mod functions;
pub mod models;
pub mod postgrest;
pub mod store;

use reqwest::Client;
use std::sync::Arc;

use crate::auth::Auth;
use crate::config::{ClientOptions, TurnoverConfig};
use crate::error::Result;
use crate::functions::FunctionsClient;
use crate::postgrest::PostgrestClient;

/// The main entry point: one HTTP client and one session shared by the
/// table, auth and function clients
pub struct Turnover {
    /// The base URL for the project
    pub url: String,
    /// The anonymous API key for the project
    pub key: String,
    /// HTTP client used for requests
    pub http_client: Client,
    /// Auth client holding the signed-in session
    pub auth: Arc<Auth>,
    /// Client options
    pub options: ClientOptions,
}

impl Turnover {
    /// Create a new client with default options
    ///
    /// # Example
    ///
    /// ```
    /// use turnover::Turnover;
    ///
    /// let client = Turnover::new("https://your-project.supabase.co", "your-anon-key").unwrap();
    /// assert!(client.auth().get_session().is_none());
    /// ```
    pub fn new(url: &str, key: &str) -> Result<Self> {
        Self::from_config(&TurnoverConfig::new(url, key)?)
    }

    /// Create a new client from a validated configuration
    pub fn from_config(config: &TurnoverConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.options.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder.build()?;

        let url = config.base_url();
        let auth = Auth::new(
            &url,
            &config.anon_key,
            http_client.clone(),
            config.options.clone(),
        );

        Ok(Self {
            url,
            key: config.anon_key.clone(),
            http_client,
            auth: Arc::new(auth),
            options: config.options.clone(),
        })
    }

    /// Create a client from `SUPABASE_URL` / `SUPABASE_ANON_KEY`
    pub fn from_env() -> Result<Self> {
        Self::from_config(&TurnoverConfig::from_env()?)
    }

    /// Get a reference to the auth client
    pub fn auth(&self) -> &Auth {
        &self.auth
    }

    /// Bearer credential for the next call: the session token, refreshed
    /// when needed, or the API key when nobody is signed in
    pub async fn bearer(&self) -> Result<String> {
        if self.auth.get_session().is_some() {
            self.auth.access_token().await
        } else {
            Ok(self.key.clone())
        }
    }

    /// Table client authenticated as the current session
    ///
    /// # Example
    ///
    /// ```no_run
    /// # async fn run() -> turnover::error::Result<()> {
    /// use turnover::Turnover;
    /// use turnover::models::Apartment;
    ///
    /// let client = Turnover::new("https://your-project.supabase.co", "your-anon-key")?;
    /// let apartments: Vec<Apartment> = client.from("apartments").await?.select("*").execute().await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn from(&self, table: &str) -> Result<PostgrestClient> {
        let token = self.bearer().await?;
        Ok(PostgrestClient::new(
            &self.url,
            &self.key,
            &token,
            table,
            &self.options.db_schema,
            &self.options.client_info,
            self.http_client.clone(),
        ))
    }

    /// Client for edge function calls
    pub fn functions(&self) -> FunctionsClient {
        FunctionsClient::new(
            &self.url,
            &self.key,
            &self.options.client_info,
            self.http_client.clone(),
        )
    }
}

/// A convenience module for common imports
pub mod prelude {
    pub use crate::access::{guard, Access, CleanerTab, HostTab, Page};
    pub use crate::availability::AvailabilityChange;
    pub use crate::config::{ClientOptions, TurnoverConfig};
    pub use crate::dashboard::{CleanerDashboard, HostDashboard, Identity};
    pub use crate::error::{Error, Result};
    pub use crate::filter::{QuickFilter, TaskFilter};
    pub use crate::models::*;
    pub use crate::store::{DashboardStore, SupabaseStore};
    pub use crate::Turnover;
}
