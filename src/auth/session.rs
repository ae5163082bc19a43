//! Session management for authentication

use chrono::Utc;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::types::{AuthUser, Claims};
use crate::error::{Error, Result};

fn default_token_type() -> String {
    "bearer".to_string()
}

/// Session data
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Session {
    /// The access token
    pub access_token: String,

    /// The refresh token
    pub refresh_token: String,

    /// The token type
    #[serde(default = "default_token_type")]
    pub token_type: String,

    /// The lifetime in seconds at issue time
    #[serde(default)]
    pub expires_in: i64,

    /// The expiry timestamp
    #[serde(default)]
    pub expires_at: Option<i64>,

    /// The signed-in user, when the server returned it
    #[serde(default)]
    pub user: Option<AuthUser>,
}

impl Session {
    /// Build a session from a bare token pair, as found in a one-time link.
    ///
    /// The expiry is read from the access token's claims; the signature is
    /// not checked here, the backend checks it on every call.
    pub fn from_tokens(access_token: &str, refresh_token: &str) -> Result<Self> {
        let claims = decode_claims(access_token)?;
        let now = Utc::now().timestamp();

        Ok(Self {
            access_token: access_token.to_string(),
            refresh_token: refresh_token.to_string(),
            token_type: default_token_type(),
            expires_in: (claims.exp - now).max(0),
            expires_at: Some(claims.exp),
            user: None,
        })
    }

    /// Fill `expires_at` from `expires_in` when the server omitted it
    pub(crate) fn stamped(mut self) -> Self {
        if self.expires_at.is_none() && self.expires_in > 0 {
            self.expires_at = Some(Utc::now().timestamp() + self.expires_in);
        }
        self
    }

    /// Claims carried by the access token
    pub fn claims(&self) -> Result<Claims> {
        decode_claims(&self.access_token)
    }

    /// ID of the signed-in user
    pub fn user_id(&self) -> Result<Uuid> {
        if let Some(user) = &self.user {
            return Ok(user.id);
        }
        let sub = self.claims()?.sub;
        Uuid::parse_str(&sub).map_err(|e| Error::auth(format!("invalid subject in token: {}", e)))
    }

    /// Email of the signed-in user, if known
    pub fn email(&self) -> Option<String> {
        self.user
            .as_ref()
            .and_then(|u| u.email.clone())
            .or_else(|| self.claims().ok().and_then(|c| c.email))
    }

    /// Check if the session has expired
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires_at) => Utc::now().timestamp() >= expires_at,
            None => false,
        }
    }
}

fn decode_claims(token: &str) -> Result<Claims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    let data = decode::<Claims>(token, &DecodingKey::from_secret(&[]), &validation)?;
    Ok(data.claims)
}
