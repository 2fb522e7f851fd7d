use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::{GroupRule, Styling};
use crate::status::GateStatus;

/// A single project with its latest quality gate verdict and history.
///
/// Built once from the API responses and never mutated afterwards; the whole
/// model is rebuilt fresh on every run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub key: String,
    pub name: String,
    /// Link to the project dashboard on the server
    pub url: String,
    /// Raw quality gate status as returned by the API; None when the fetch
    /// was degraded
    pub raw_status: Option<String>,
    pub status: GateStatus,
    pub last_analysis: Option<String>,
    /// Historical gate statuses, oldest first
    pub history: Vec<HistorySample>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistorySample {
    pub date: String,
    pub status: GateStatus,
}

/// A configured group with its resolved members and aggregate status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    pub name: String,
    pub rule: GroupRule,
    pub projects: Vec<Project>,
    /// None when the group resolved zero members
    pub aggregate: Option<GateStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverallStatus {
    pub status: GateStatus,
    pub message: String,
}

/// The fully assembled report view, sole input to the renderer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportModel {
    pub title: String,
    pub generated_at: DateTime<Utc>,
    pub server_url: String,
    pub overall: Option<OverallStatus>,
    pub groups: Vec<Group>,
    pub ungrouped: Vec<Project>,
    pub styling: Styling,
}

impl Project {
    /// Placeholder for a project whose quality gate could not be fetched.
    /// The missing raw status normalizes to FAIL so the gap stays visible.
    pub fn degraded(key: String, name: String, url: String, last_analysis: Option<String>) -> Self {
        Self {
            key,
            name,
            url,
            raw_status: None,
            status: GateStatus::normalize(None),
            last_analysis,
            history: Vec::new(),
        }
    }
}
