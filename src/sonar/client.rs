use log::{debug, warn};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

use crate::error::{GateLensError, Result};
use crate::report::HistorySample;
use crate::status::GateStatus;

use super::types::{AnalysesResponse, ProjectComponent, ProjectSearchResponse, ProjectStatusResponse};

const REQUEST_TIMEOUT_SECONDS: u64 = 30;
pub(super) const PAGE_SIZE: usize = 500;

/// Client for the SonarQube web API.
///
/// Issues authenticated GETs and surfaces HTTP errors immediately; this is a
/// single-shot batch job, so there is no retry policy.
pub struct SonarClient {
    client: Client,
    base_url: Url,
    token: Option<String>,
}

impl SonarClient {
    pub fn new(base_url: &str, token: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("gatelens/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECONDS))
            .build()
            .map_err(|e| GateLensError::Config(format!("Failed to create HTTP client: {e}")))?;

        let base_url = Url::parse(base_url)
            .map_err(|e| GateLensError::Config(format!("Invalid base URL '{base_url}': {e}")))?;

        Ok(Self {
            client,
            base_url,
            token,
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    /// Link to a project's dashboard on the server, for the report.
    pub fn dashboard_url(&self, project_key: &str) -> String {
        format!("{}/dashboard?id={}", self.base_url(), project_key)
    }

    async fn get<T>(&self, path: &str, query: &[(&str, String)]) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let url = self
            .base_url
            .join(path)
            .map_err(|e| GateLensError::Config(format!("Invalid API path '{path}': {e}")))?;

        debug!("GET {path} {query:?}");

        let mut request = self.client.get(url).query(query);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            return Err(GateLensError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }

    /// List all projects on the server, following pagination until a short
    /// page signals the end.
    pub async fn list_projects(&self) -> Result<Vec<ProjectComponent>> {
        let mut projects = Vec::new();
        let mut page = 1usize;

        loop {
            let response: ProjectSearchResponse = self
                .get(
                    "api/projects/search",
                    &[("p", page.to_string()), ("ps", PAGE_SIZE.to_string())],
                )
                .await?;

            let count = response.components.len();
            debug!("Fetched {count} projects on page {page}");
            projects.extend(response.components);

            if count < PAGE_SIZE {
                break;
            }
            page += 1;
        }

        Ok(projects)
    }

    /// Latest quality gate status for a project, as the raw API string.
    pub async fn quality_gate_status(&self, project_key: &str) -> Result<Option<String>> {
        let response: ProjectStatusResponse = self
            .get(
                "api/qualitygates/project_status",
                &[("projectKey", project_key.to_string())],
            )
            .await?;

        Ok(response.project_status.status)
    }

    /// Quality gate history over the last `limit` analyses, oldest first.
    ///
    /// The analyses endpoint returns newest first; the series is reversed so
    /// the report timeline reads left to right. A failed lookup for a single
    /// analysis drops that sample rather than failing the whole series.
    pub async fn quality_gate_history(
        &self,
        project_key: &str,
        limit: usize,
    ) -> Result<Vec<HistorySample>> {
        let response: AnalysesResponse = self
            .get(
                "api/project_analyses/search",
                &[("project", project_key.to_string()), ("ps", limit.to_string())],
            )
            .await?;

        let mut history = Vec::with_capacity(response.analyses.len());

        for analysis in response.analyses.iter().rev() {
            let result: Result<ProjectStatusResponse> = self
                .get(
                    "api/qualitygates/project_status",
                    &[("analysisId", analysis.key.clone())],
                )
                .await;

            match result {
                Ok(response) => history.push(HistorySample {
                    date: analysis.date.clone(),
                    status: GateStatus::normalize(response.project_status.status.as_deref()),
                }),
                Err(e) => {
                    warn!(
                        "Skipping history sample {} for project '{project_key}': {e}",
                        analysis.key
                    );
                }
            }
        }

        Ok(history)
    }
}
