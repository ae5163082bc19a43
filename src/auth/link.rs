//! One-time links sent by the auth service (invitations, password resets)

use url::{form_urlencoded, Url};

use crate::error::{Error, Result};

/// What a one-time link carries
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkCredentials {
    /// An authorization code to exchange for a session (`?code=`)
    Code(String),
    /// A ready-made token pair in the page fragment
    Tokens {
        access_token: String,
        refresh_token: String,
        /// `invite`, `recovery`, `magiclink`, ...
        link_type: Option<String>,
    },
}

impl LinkCredentials {
    /// Parse the full URL the user landed on
    pub fn parse(link: &str) -> Result<Self> {
        let url = Url::parse(link.trim())?;

        let query: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        let fragment: Vec<(String, String)> = url
            .fragment()
            .map(|f| form_urlencoded::parse(f.as_bytes()).into_owned().collect())
            .unwrap_or_default();

        let lookup = |key: &str| {
            fragment
                .iter()
                .chain(query.iter())
                .find(|(k, v)| k == key && !v.is_empty())
                .map(|(_, v)| v.clone())
        };

        if let Some(description) = lookup("error_description") {
            return Err(Error::Auth(description));
        }

        if let Some(code) = lookup("code") {
            return Ok(LinkCredentials::Code(code));
        }

        match (lookup("access_token"), lookup("refresh_token")) {
            (Some(access_token), Some(refresh_token)) => Ok(LinkCredentials::Tokens {
                access_token,
                refresh_token,
                link_type: lookup("type"),
            }),
            (Some(_), None) => Err(Error::auth("The link is missing its refresh token")),
            _ => Err(Error::auth(
                "The link does not contain a sign-in code or tokens; it may have expired",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_link() {
        let creds = LinkCredentials::parse("https://app.example.com/set-password?code=abc123").unwrap();
        assert_eq!(creds, LinkCredentials::Code("abc123".to_string()));
    }

    #[test]
    fn test_fragment_tokens_link() {
        let creds = LinkCredentials::parse(
            "https://app.example.com/set-password#access_token=aaa&expires_in=3600&refresh_token=rrr&token_type=bearer&type=invite",
        )
        .unwrap();
        assert_eq!(
            creds,
            LinkCredentials::Tokens {
                access_token: "aaa".to_string(),
                refresh_token: "rrr".to_string(),
                link_type: Some("invite".to_string()),
            }
        );
    }

    #[test]
    fn test_error_link_surfaces_description() {
        let result = LinkCredentials::parse(
            "https://app.example.com/set-password#error=access_denied&error_code=otp_expired&error_description=Email+link+is+invalid+or+has+expired",
        );
        match result {
            Err(Error::Auth(msg)) => assert_eq!(msg, "Email link is invalid or has expired"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_empty_link_is_rejected() {
        assert!(matches!(
            LinkCredentials::parse("https://app.example.com/set-password"),
            Err(Error::Auth(_))
        ));
        assert!(matches!(
            LinkCredentials::parse("https://app.example.com/#access_token=aaa"),
            Err(Error::Auth(_))
        ));
    }
}
