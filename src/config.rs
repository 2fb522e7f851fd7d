use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration file structure for gatelens.
///
/// Maps group names to project keys, configures the SonarQube connection and
/// the report styling. Loaded once per run from the current directory or a
/// specified path; read-only thereafter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    /// SonarQube server connection
    #[serde(default)]
    pub server: ServerConfig,

    /// Report generation settings
    #[serde(default)]
    pub report: ReportConfig,

    /// Report color palette
    #[serde(default)]
    pub styling: Styling,

    /// Ordered mapping from group name to member project keys or patterns
    #[serde(default)]
    pub groups: IndexMap<String, GroupConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ServerConfig {
    /// SonarQube base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// API token; usually supplied via environment or CLI instead
    pub token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ReportConfig {
    /// Directory the report and its assets are written to
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Report title; a status label prefix is added at generation time
    pub title: Option<String>,

    /// Abort the whole run on any per-project fetch failure instead of
    /// degrading that project to an unknown status
    #[serde(default)]
    pub strict: bool,

    /// Number of historical analyses to fetch per project
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    /// Whether projects not claimed by any group appear in the report
    #[serde(default = "default_true")]
    pub include_unconfigured: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Styling {
    #[serde(default = "default_primary_color")]
    pub primary_color: String,

    #[serde(default = "default_secondary_color")]
    pub secondary_color: String,

    #[serde(default = "default_pass_color")]
    pub pass_color: String,

    #[serde(default = "default_warning_color")]
    pub warning_color: String,

    #[serde(default = "default_fail_color")]
    pub fail_color: String,
}

/// A group definition: either a bare list of project keys/patterns, or a
/// table with an explicit aggregation rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GroupConfig {
    Members(Vec<String>),
    Detailed {
        projects: Vec<String>,
        #[serde(default)]
        rule: GroupRule,
    },
}

impl GroupConfig {
    pub fn members(&self) -> &[String] {
        match self {
            Self::Members(members) => members,
            Self::Detailed { projects, .. } => projects,
        }
    }

    pub fn rule(&self) -> GroupRule {
        match self {
            Self::Members(_) => GroupRule::Worst,
            Self::Detailed { rule, .. } => *rule,
        }
    }
}

/// How a group's aggregate status is computed from its members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupRule {
    /// Most severe member status wins (FAIL > WARN > PASS)
    #[default]
    Worst,
    /// Least severe member status wins
    Best,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token: None,
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            title: None,
            strict: false,
            history_limit: default_history_limit(),
            include_unconfigured: true,
        }
    }
}

impl Default for Styling {
    fn default() -> Self {
        Self {
            primary_color: default_primary_color(),
            secondary_color: default_secondary_color(),
            pass_color: default_pass_color(),
            warning_color: default_warning_color(),
            fail_color: default_fail_color(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:9000".to_string()
}

fn default_output_dir() -> String {
    "reports".to_string()
}

fn default_history_limit() -> usize {
    10
}

fn default_true() -> bool {
    true
}

fn default_primary_color() -> String {
    "#4b9fd5".to_string()
}

fn default_secondary_color() -> String {
    "#236a97".to_string()
}

fn default_pass_color() -> String {
    "#00aa00".to_string()
}

fn default_warning_color() -> String {
    "#ed7d20".to_string()
}

fn default_fail_color() -> String {
    "#d4333f".to_string()
}

impl Config {
    /// Load configuration from a file.
    ///
    /// Searches for configuration files in this order:
    /// 1. Specified path
    /// 2. ./gatelens.toml
    /// 3. ./gatelens.json
    /// 4. ./gatelens.yaml
    /// 5. ./gatelens.yml
    ///
    /// Returns default configuration if no file is found.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load_from_path(path);
        }

        let candidates = [
            "gatelens.toml",
            "gatelens.json",
            "gatelens.yaml",
            "gatelens.yml",
        ];

        for candidate in &candidates {
            let path = Path::new(candidate);
            if path.exists() {
                return Self::load_from_path(path);
            }
        }

        // No config file found, return defaults
        Ok(Self::default())
    }

    /// Load configuration from a specific file path.
    fn load_from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("");

        match extension {
            "toml" => toml::from_str(&contents)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display())),
            "json" => serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display())),
            "yaml" | "yml" => serde_yaml::from_str(&contents)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display())),
            _ => {
                // Try TOML first, then JSON, then YAML
                toml::from_str(&contents)
                    .or_else(|_| serde_json::from_str(&contents))
                    .or_else(|_| serde_yaml::from_str(&contents))
                    .with_context(|| format!("Failed to parse config file: {}", path.display()))
            }
        }
    }
}
