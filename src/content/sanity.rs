//! Sanity HTTP query API

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use super::{ContentError, ContentSource};
use crate::config::CmsConfig;

const USER_AGENT: &str = concat!("codecraft/", env!("CARGO_PKG_VERSION"));

/// Content source backed by a Sanity project's query endpoint
pub struct SanityClient {
    http: reqwest::Client,
    endpoint: Option<String>,
    token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    result: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    error: Option<ErrorBody>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    description: Option<String>,
}

impl SanityClient {
    /// Create a client for the configured project
    ///
    /// An unconfigured project still yields a client; every query then
    /// fails with [`ContentError::NotConfigured`].
    pub fn new(config: &CmsConfig) -> Result<Self, ContentError> {
        let mut builder = reqwest::Client::builder().user_agent(USER_AGENT);
        if config.timeout_secs > 0 {
            builder = builder.timeout(Duration::from_secs(config.timeout_secs));
        }

        Ok(Self {
            http: builder.build()?,
            endpoint: query_endpoint(config),
            token: config.token.clone().filter(|t| !t.is_empty()),
        })
    }

    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }
}

/// `https://{project}.{api|apicdn}.sanity.io/v{version}/data/query/{dataset}`
fn query_endpoint(config: &CmsConfig) -> Option<String> {
    if let Some(endpoint) = &config.endpoint {
        return Some(endpoint.trim_end_matches('/').to_string());
    }

    let project = config.project_id.trim();
    if project.is_empty() {
        return None;
    }

    let host = if config.use_cdn { "apicdn" } else { "api" };
    let version = config.api_version.trim_start_matches('v');
    Some(format!(
        "https://{}.{}.sanity.io/v{}/data/query/{}",
        project, host, version, config.dataset
    ))
}

#[async_trait]
impl ContentSource for SanityClient {
    async fn query(
        &self,
        query: &str,
        params: &[(&str, &str)],
    ) -> Result<serde_json::Value, ContentError> {
        let endpoint = self
            .endpoint
            .as_deref()
            .ok_or_else(|| ContentError::NotConfigured("missing cms.project_id".to_string()))?;

        // Parameters are passed as `$name=<json>`
        let mut pairs = vec![("query".to_string(), query.to_string())];
        for (name, value) in params {
            pairs.push((format!("${}", name), serde_json::to_string(value)?));
        }

        let mut request = self.http.get(endpoint).query(&pairs);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ContentError::Status {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        let body: QueryResponse = response.json().await?;
        Ok(body.result)
    }
}

fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorResponse>(body) {
        Ok(ErrorResponse {
            error:
                Some(ErrorBody {
                    description: Some(description),
                }),
            ..
        }) => description,
        Ok(ErrorResponse {
            message: Some(message),
            ..
        }) => message,
        _ => body.chars().take(200).collect(),
    }
}
