use thiserror::Error;

#[derive(Error, Debug)]
pub enum GateLensError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("API request returned status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("failed to fetch {operation} for project '{project}': {source}")]
    Fetch {
        project: String,
        operation: &'static str,
        #[source]
        source: Box<GateLensError>,
    },

    #[error("report rendering failed: {0}")]
    Render(#[from] std::fmt::Error),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl GateLensError {
    /// Wrap an error with the project key and operation it failed on.
    pub fn for_project(self, project: &str, operation: &'static str) -> Self {
        Self::Fetch {
            project: project.to_owned(),
            operation,
            source: Box::new(self),
        }
    }
}

pub type Result<T> = std::result::Result<T, GateLensError>;
