//! Authentication against the hosted auth service

mod link;
mod session;
mod types;

use log::{debug, info};
use reqwest::Client;
use serde_json::json;
use std::sync::{Arc, RwLock};

use crate::config::ClientOptions;
use crate::error::{Error, Result};
use crate::fetch::{Fetch, FetchBuilder};

pub use link::*;
pub use session::*;
pub use types::*;

/// Client for authentication and the signed-in session
pub struct Auth {
    /// The base URL for the project
    url: String,

    /// The anonymous API key for the project
    key: String,

    /// HTTP client used for requests
    client: Client,

    /// The current session
    session: Arc<RwLock<Option<Session>>>,

    /// Client options
    options: ClientOptions,
}

impl Auth {
    /// Create a new Auth client
    pub(crate) fn new(url: &str, key: &str, client: Client, options: ClientOptions) -> Self {
        Self {
            url: url.to_string(),
            key: key.to_string(),
            client,
            session: Arc::new(RwLock::new(None)),
            options,
        }
    }

    fn get_auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1{}", self.url, path)
    }

    fn request<'a>(&'a self, fetch: FetchBuilder<'a>) -> FetchBuilder<'a> {
        fetch
            .header("apikey", &self.key)
            .header("X-Client-Info", &self.options.client_info)
    }

    async fn token_grant(&self, grant_type: &str, body: serde_json::Value) -> Result<Session> {
        let url = self.get_auth_url(&format!("/token?grant_type={}", grant_type));

        let session = self
            .request(Fetch::post(&self.client, &url))
            .json(&body)?
            .execute::<Session>()
            .await
            .map_err(|e| match e {
                Error::Api { status, message } if status == 400 || status == 401 => {
                    Error::Auth(message)
                }
                other => other,
            })?
            .stamped();

        self.store_session(session.clone());
        Ok(session)
    }

    fn store_session(&self, session: Session) {
        if self.options.persist_session {
            let mut current = self.session.write().unwrap_or_else(|e| e.into_inner());
            *current = Some(session);
        }
    }

    /// Sign in a user with email and password
    pub async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(Error::validation("Email and password are required"));
        }

        let session = self
            .token_grant(
                "password",
                json!({ "email": email.trim(), "password": password }),
            )
            .await?;
        info!("signed in as {}", email.trim());
        Ok(session)
    }

    /// Exchange a one-time authorization code for a session
    pub async fn exchange_code_for_session(
        &self,
        code: &str,
        code_verifier: Option<&str>,
    ) -> Result<Session> {
        self.token_grant(
            "pkce",
            json!({ "auth_code": code, "code_verifier": code_verifier.unwrap_or_default() }),
        )
        .await
    }

    /// Establish a session from a one-time link's credentials
    pub async fn session_from_link(&self, credentials: &LinkCredentials) -> Result<Session> {
        match credentials {
            LinkCredentials::Code(code) => {
                debug!("exchanging link code for a session");
                self.exchange_code_for_session(code, None).await
            }
            LinkCredentials::Tokens {
                access_token,
                refresh_token,
                ..
            } => {
                let session = Session::from_tokens(access_token, refresh_token)?;
                self.set_session(session.clone());
                let user = self.get_user().await?;
                let session = Session {
                    user: Some(user),
                    ..session
                };
                self.set_session(session.clone());
                Ok(session)
            }
        }
    }

    /// Trade the refresh token for a new session
    pub async fn refresh_session(&self) -> Result<Session> {
        let refresh_token = self
            .get_session()
            .ok_or(Error::NotAuthenticated)?
            .refresh_token;

        self.token_grant("refresh_token", json!({ "refresh_token": refresh_token }))
            .await
    }

    /// Access token for authenticated calls, refreshed first when expired
    pub async fn access_token(&self) -> Result<String> {
        let session = self.get_session().ok_or(Error::NotAuthenticated)?;

        if session.is_expired() {
            if !self.options.auto_refresh_token {
                return Err(Error::NotAuthenticated);
            }
            debug!("session expired, refreshing");
            return Ok(self.refresh_session().await?.access_token);
        }

        Ok(session.access_token)
    }

    /// Get the user data for the currently authenticated user
    pub async fn get_user(&self) -> Result<AuthUser> {
        let url = self.get_auth_url("/user");
        let token = self.access_token().await?;

        self.request(Fetch::get(&self.client, &url))
            .bearer_auth(&token)
            .execute::<AuthUser>()
            .await
    }

    /// Update the signed-in user
    pub async fn update_user(&self, attributes: &UserAttributes) -> Result<AuthUser> {
        let url = self.get_auth_url("/user");
        let token = self.access_token().await?;

        self.request(Fetch::put(&self.client, &url))
            .bearer_auth(&token)
            .json(attributes)?
            .execute::<AuthUser>()
            .await
    }

    /// Set a new password for the signed-in user
    pub async fn update_password(&self, password: &str) -> Result<AuthUser> {
        let user = self
            .update_user(&UserAttributes {
                password: Some(password.to_string()),
                ..Default::default()
            })
            .await?;
        info!("password updated for user {}", user.id);
        Ok(user)
    }

    /// Sign out the current user. The local session is dropped even when the
    /// server call fails.
    pub async fn sign_out(&self) -> Result<()> {
        let url = self.get_auth_url("/logout");
        let token = self
            .get_session()
            .ok_or(Error::NotAuthenticated)?
            .access_token;

        let result = self
            .request(Fetch::post(&self.client, &url))
            .bearer_auth(&token)
            .execute_empty()
            .await;

        self.clear_session();
        result
    }

    /// Get the current session
    pub fn get_session(&self) -> Option<Session> {
        let current = self.session.read().unwrap_or_else(|e| e.into_inner());
        current.clone()
    }

    /// Set the session
    pub fn set_session(&self, session: Session) {
        let mut current = self.session.write().unwrap_or_else(|e| e.into_inner());
        *current = Some(session);
    }

    /// Forget the session locally
    pub fn clear_session(&self) {
        let mut current = self.session.write().unwrap_or_else(|e| e.into_inner());
        *current = None;
    }
}
