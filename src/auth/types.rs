//! Types for authentication and user management

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User record returned by the auth service
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthUser {
    /// The user ID
    pub id: Uuid,

    /// The user's email address
    pub email: Option<String>,

    /// The user's phone number
    #[serde(default)]
    pub phone: Option<String>,

    /// The auth role (`authenticated`, `anon`), not the dashboard role
    #[serde(default)]
    pub role: Option<String>,

    /// The user metadata
    #[serde(default)]
    pub user_metadata: serde_json::Value,

    /// The creation time
    #[serde(default)]
    pub created_at: Option<String>,
}

/// User attributes that can be updated
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UserAttributes {
    /// Email address
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Password
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// User metadata
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

/// Claims carried by an access token
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    /// Subject: the user ID
    pub sub: String,

    /// Expiry as a unix timestamp
    pub exp: i64,

    /// The user's email address
    #[serde(default)]
    pub email: Option<String>,

    /// The auth role
    #[serde(default)]
    pub role: Option<String>,
}
