use futures::future;
use log::{debug, info, warn};

use crate::config::Config;
use crate::error::Result;
use crate::grouping;
use crate::report::Project;
use crate::status::GateStatus;

use super::client::SonarClient;
use super::types::ProjectComponent;

/// Drives the per-project API calls and applies the failure policy.
pub struct SonarProvider {
    pub client: SonarClient,
}

impl SonarProvider {
    pub fn new(base_url: &str, token: Option<String>) -> Result<Self> {
        let client = SonarClient::new(base_url, token)?;
        Ok(Self { client })
    }

    /// Fetch every project with its quality gate status and history.
    ///
    /// Per-project fetches run concurrently but the returned order matches
    /// the server's listing order. In strict mode any per-project failure
    /// aborts the run; otherwise the project degrades to an unknown-status
    /// placeholder and siblings are unaffected.
    pub async fn collect_projects(&self, config: &Config) -> Result<Vec<Project>> {
        let mut components = self.client.list_projects().await?;
        info!("Retrieved {} projects from the server", components.len());

        if !config.report.include_unconfigured {
            components.retain(|c| grouping::claimed_by_any(&c.key, &config.groups));
            debug!("{} projects remain after group filtering", components.len());
        }

        let fetches = components.into_iter().map(|component| async move {
            let result = self
                .fetch_project(&component, config.report.history_limit)
                .await;
            (component, result)
        });

        let mut projects = Vec::new();
        for (component, result) in future::join_all(fetches).await {
            match result {
                Ok(project) => projects.push(project),
                Err(e) if config.report.strict => return Err(e),
                Err(e) => {
                    warn!("Degrading project '{}' to unknown status: {e}", component.key);
                    let url = self.client.dashboard_url(&component.key);
                    projects.push(Project::degraded(
                        component.key.clone(),
                        component.name.unwrap_or(component.key),
                        url,
                        component.last_analysis_date,
                    ));
                }
            }
        }

        Ok(projects)
    }

    async fn fetch_project(
        &self,
        component: &ProjectComponent,
        history_limit: usize,
    ) -> Result<Project> {
        let raw_status = self
            .client
            .quality_gate_status(&component.key)
            .await
            .map_err(|e| e.for_project(&component.key, "quality gate status"))?;

        // A failed history lookup leaves the timeline empty; the headline
        // status is already known, so the project itself is not degraded.
        let history = match self
            .client
            .quality_gate_history(&component.key, history_limit)
            .await
        {
            Ok(history) => history,
            Err(e) => {
                warn!("No history for project '{}': {e}", component.key);
                Vec::new()
            }
        };

        Ok(Project {
            key: component.key.clone(),
            name: component
                .name
                .clone()
                .unwrap_or_else(|| component.key.clone()),
            url: self.client.dashboard_url(&component.key),
            status: GateStatus::normalize(raw_status.as_deref()),
            raw_status,
            last_analysis: component.last_analysis_date.clone(),
            history,
        })
    }
}
