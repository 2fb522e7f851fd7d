use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use log::{info, warn};
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::grouping;
use crate::output::{self, PhaseProgress};
use crate::sonar::SonarProvider;

#[derive(Parser)]
#[command(name = "gatelens")]
#[command(author, version, about = "Quality Gate Report Generator", long_about = None)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output directory for the report (overrides the config file)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// SonarQube API token
    #[arg(short, long, env = "SONARQUBE_REPORT_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Abort on any per-project fetch failure instead of degrading that
    /// project to an unknown status
    #[arg(long, default_value_t = false)]
    strict: bool,
}

impl Cli {
    pub async fn execute(&self) -> Result<()> {
        let mut config = Config::load(self.config.as_deref())?;

        if let Some(output_dir) = &self.output_dir {
            config.report.output_dir = output_dir.display().to_string();
        }
        if self.strict {
            config.report.strict = true;
        }

        let token = self.token.clone().or_else(|| config.server.token.clone());
        if token.is_none() {
            warn!("No API token configured; requests will be anonymous");
        }

        info!(
            "Connecting to SonarQube server at {}",
            config.server.base_url
        );
        let provider = SonarProvider::new(&config.server.base_url, token)
            .context("Failed to set up the SonarQube client")?;

        let progress = PhaseProgress::start_phase_1();
        let projects = provider
            .collect_projects(&config)
            .await
            .context("Failed to fetch project data")?;
        if projects.is_empty() {
            warn!("No projects found on the server");
        } else {
            info!("Fetched quality gate data for {} projects", projects.len());
        }

        let progress = progress.finish_phase_1_start_phase_2();
        let report = grouping::build_report(
            projects,
            &config,
            Utc::now(),
            provider.client.base_url(),
        );

        let progress = progress.finish_phase_2_start_phase_3();
        let report_path = output::write_report(&report, Path::new(&config.report.output_dir))
            .context("Failed to write the report")?;
        progress.finish_phase_3();

        eprintln!(
            "  {} {}",
            output::cyan("Report:"),
            report_path.display()
        );

        Ok(())
    }
}
