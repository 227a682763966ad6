//! Outbound integrations
//!
//! - [`google`] - ID token introspection for Google sign-in
//! - [`github`] - repository creation for projects

pub mod github;
pub mod google;

use shared::ErrorCode;
use thiserror::Error;

use crate::utils::AppError;

#[derive(Debug, Error)]
pub enum IntegrationError {
    #[error("{0} is not configured")]
    NotConfigured(&'static str),

    #[error("{service} request failed: {source}")]
    Http {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{service} responded {status}: {body}")]
    Upstream {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("Invalid identity token: {0}")]
    InvalidToken(String),
}

impl From<IntegrationError> for AppError {
    fn from(err: IntegrationError) -> Self {
        match err {
            IntegrationError::NotConfigured(_) => {
                AppError::with_message(ErrorCode::ConfigError, err.to_string())
            }
            IntegrationError::InvalidToken(msg) => AppError::invalid_token(msg),
            IntegrationError::Http { .. } | IntegrationError::Upstream { .. } => {
                AppError::external(err.to_string())
            }
        }
    }
}

/// Read a failed response into [`IntegrationError::Upstream`]
async fn upstream_error(service: &'static str, resp: reqwest::Response) -> IntegrationError {
    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap_or_default();
    IntegrationError::Upstream {
        service,
        status,
        body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_failures_are_bad_gateway() {
        let err: AppError = IntegrationError::Upstream {
            service: "GitHub",
            status: 422,
            body: "name already exists".into(),
        }
        .into();
        assert_eq!(err.http_status(), http::StatusCode::BAD_GATEWAY);
        assert!(err.message.contains("422"));
    }

    #[test]
    fn rejected_tokens_are_unauthorized() {
        let err: AppError = IntegrationError::InvalidToken("audience mismatch".into()).into();
        assert_eq!(err.http_status(), http::StatusCode::UNAUTHORIZED);
    }
}
