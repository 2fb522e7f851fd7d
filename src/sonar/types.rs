use serde::Deserialize;

/// Response from /api/projects/search.
#[derive(Debug, Deserialize)]
pub struct ProjectSearchResponse {
    pub components: Vec<ProjectComponent>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProjectComponent {
    pub key: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "lastAnalysisDate")]
    pub last_analysis_date: Option<String>,
}

/// Response from /api/qualitygates/project_status.
#[derive(Debug, Deserialize)]
pub struct ProjectStatusResponse {
    #[serde(rename = "projectStatus")]
    pub project_status: ProjectStatus,
}

#[derive(Debug, Deserialize)]
pub struct ProjectStatus {
    pub status: Option<String>,
}

/// Response from /api/project_analyses/search.
#[derive(Debug, Deserialize)]
pub struct AnalysesResponse {
    pub analyses: Vec<Analysis>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Analysis {
    pub key: String,
    pub date: String,
}
