//! GitHub repository creation

use serde::Deserialize;
use shared::models::GithubRepoCreate;

use super::{IntegrationError, upstream_error};

const REPOS_URL: &str = "https://api.github.com/user/repos";
const SERVICE: &str = "GitHub";

#[derive(Debug, Deserialize)]
struct CreatedRepo {
    html_url: String,
}

/// Create a repository for the token's owner; returns its web URL
pub async fn create_repository(
    client: &reqwest::Client,
    token: Option<&str>,
    repo: &GithubRepoCreate,
) -> Result<String, IntegrationError> {
    let token = token.ok_or(IntegrationError::NotConfigured("GitHub integration"))?;

    let resp = client
        .post(REPOS_URL)
        .bearer_auth(token)
        .header(reqwest::header::ACCEPT, "application/vnd.github+json")
        .header(reqwest::header::USER_AGENT, "nextofficeflow")
        .json(&serde_json::json!({
            "name": repo.name,
            "description": repo.description,
            "private": repo.private,
        }))
        .send()
        .await
        .map_err(|source| IntegrationError::Http {
            service: SERVICE,
            source,
        })?;

    if !resp.status().is_success() {
        return Err(upstream_error(SERVICE, resp).await);
    }

    let created: CreatedRepo = resp.json().await.map_err(|source| IntegrationError::Http {
        service: SERVICE,
        source,
    })?;
    tracing::info!(repo = %repo.name, url = %created.html_url, "GitHub repository created");
    Ok(created.html_url)
}
