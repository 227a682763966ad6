//! Google ID token introspection

use serde::Deserialize;

use super::{IntegrationError, upstream_error};

const TOKENINFO_URL: &str = "https://oauth2.googleapis.com/tokeninfo";
const SERVICE: &str = "Google";

/// Subset of the tokeninfo response
#[derive(Debug, Clone, Deserialize)]
pub struct TokenInfo {
    pub aud: String,
    pub email: Option<String>,
    /// Sent as `"true"`/`"false"` strings by the endpoint
    pub email_verified: Option<serde_json::Value>,
    pub name: Option<String>,
}

impl TokenInfo {
    pub fn is_email_verified(&self) -> bool {
        match &self.email_verified {
            Some(serde_json::Value::Bool(b)) => *b,
            Some(serde_json::Value::String(s)) => s == "true",
            _ => false,
        }
    }
}

/// Verified Google identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoogleIdentity {
    pub email: String,
    pub name: Option<String>,
}

/// Accept the token only for our client id and a verified email
pub fn check_claims(info: TokenInfo, client_id: &str) -> Result<GoogleIdentity, IntegrationError> {
    if info.aud != client_id {
        return Err(IntegrationError::InvalidToken("audience mismatch".into()));
    }
    if !info.is_email_verified() {
        return Err(IntegrationError::InvalidToken("email not verified".into()));
    }
    let email = info
        .email
        .ok_or_else(|| IntegrationError::InvalidToken("no email in token".into()))?;
    Ok(GoogleIdentity {
        email,
        name: info.name,
    })
}

pub async fn verify_id_token(
    client: &reqwest::Client,
    client_id: Option<&str>,
    id_token: &str,
) -> Result<GoogleIdentity, IntegrationError> {
    let client_id = client_id.ok_or(IntegrationError::NotConfigured("Google sign-in"))?;

    let resp = client
        .get(TOKENINFO_URL)
        .query(&[("id_token", id_token)])
        .send()
        .await
        .map_err(|source| IntegrationError::Http {
            service: SERVICE,
            source,
        })?;

    // tokeninfo answers 400 for expired or forged tokens
    if resp.status() == reqwest::StatusCode::BAD_REQUEST {
        return Err(IntegrationError::InvalidToken("token rejected by Google".into()));
    }
    if !resp.status().is_success() {
        return Err(upstream_error(SERVICE, resp).await);
    }

    let info: TokenInfo = resp.json().await.map_err(|source| IntegrationError::Http {
        service: SERVICE,
        source,
    })?;
    check_claims(info, client_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(aud: &str, verified: serde_json::Value) -> TokenInfo {
        TokenInfo {
            aud: aud.into(),
            email: Some("jane@office.io".into()),
            email_verified: Some(verified),
            name: Some("Jane".into()),
        }
    }

    #[test]
    fn accepts_matching_audience_with_verified_email() {
        let identity = check_claims(info("client-1", "true".into()), "client-1").unwrap();
        assert_eq!(identity.email, "jane@office.io");
    }

    #[test]
    fn rejects_other_audience() {
        assert!(check_claims(info("client-2", true.into()), "client-1").is_err());
    }

    #[test]
    fn rejects_unverified_email() {
        assert!(check_claims(info("client-1", "false".into()), "client-1").is_err());
    }
}
