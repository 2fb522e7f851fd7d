use chrono::NaiveDateTime;
use log::{debug, info};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::report::{Group, Project, ReportModel};

/// Stylesheet written next to the report; consumes the CSS custom
/// properties inlined in the document head.
const REPORT_CSS: &str = include_str!("../../assets/report_styles.css");

const REPORT_FILE_NAME: &str = "quality_gate_report.html";

/// Render the report model to a self-contained HTML document.
///
/// Output is deterministic: the same model (including its generation
/// timestamp) always yields byte-identical HTML.
pub fn render(model: &ReportModel) -> Result<String> {
    let mut out = String::new();

    writeln!(out, "<!DOCTYPE html>")?;
    writeln!(out, "<html lang=\"en\">")?;
    writeln!(out, "<head>")?;
    writeln!(out, "    <meta charset=\"UTF-8\">")?;
    writeln!(
        out,
        "    <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">"
    )?;
    writeln!(out, "    <title>{}</title>", escape_html(&model.title))?;
    writeln!(out, "    <style>")?;
    writeln!(out, "        :root {{")?;
    writeln!(out, "            --primary-color: {};", model.styling.primary_color)?;
    writeln!(out, "            --secondary-color: {};", model.styling.secondary_color)?;
    writeln!(out, "            --pass-color: {};", model.styling.pass_color)?;
    writeln!(out, "            --warning-color: {};", model.styling.warning_color)?;
    writeln!(out, "            --fail-color: {};", model.styling.fail_color)?;
    writeln!(out, "        }}")?;
    writeln!(out, "    </style>")?;
    writeln!(
        out,
        "    <link rel=\"stylesheet\" href=\"css/report_styles.css\">"
    )?;
    writeln!(out, "</head>")?;
    writeln!(out, "<body>")?;
    writeln!(out, "    <div class=\"container\">")?;
    writeln!(out, "        <h1>{}</h1>", escape_html(&model.title))?;
    writeln!(
        out,
        "        <p>Server: <a class=\"server-link\" href=\"{0}\">{0}</a></p>",
        escape_html(&model.server_url)
    )?;

    if let Some(overall) = &model.overall {
        writeln!(
            out,
            "        <div class=\"overall-banner {}\">{}: {}</div>",
            overall.status.css_class(),
            overall.status.label(),
            escape_html(&overall.message)
        )?;
    }

    for group in &model.groups {
        write_group(&mut out, group)?;
    }

    if !model.ungrouped.is_empty() {
        writeln!(out, "        <h2>Ungrouped</h2>")?;
        write_project_table(&mut out, &model.ungrouped)?;
    }

    writeln!(
        out,
        "        <footer>Generated at {}</footer>",
        model.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    )?;
    writeln!(out, "    </div>")?;
    writeln!(out, "</body>")?;
    writeln!(out, "</html>")?;

    Ok(out)
}

/// Render the report and write it with its stylesheet under `output_dir`,
/// creating directories as needed. The document is built fully in memory
/// first, so a render failure never leaves a partial report behind.
pub fn write_report(model: &ReportModel, output_dir: &Path) -> Result<PathBuf> {
    let html = render(model)?;

    let css_dir = output_dir.join("css");
    std::fs::create_dir_all(&css_dir)?;

    let css_path = css_dir.join("report_styles.css");
    debug!("Writing stylesheet to {}", css_path.display());
    std::fs::write(&css_path, REPORT_CSS)?;

    let report_path = output_dir.join(REPORT_FILE_NAME);
    std::fs::write(&report_path, html)?;
    info!("Generated quality gate report: {}", report_path.display());

    Ok(report_path)
}

fn write_group(out: &mut String, group: &Group) -> Result<()> {
    write!(out, "        <h2>{}", escape_html(&group.name))?;
    if let Some(aggregate) = group.aggregate {
        write!(
            out,
            " <span class=\"badge {}\">{}</span>",
            aggregate.css_class(),
            aggregate.label()
        )?;
    }
    writeln!(out, "</h2>")?;

    if group.projects.is_empty() {
        writeln!(
            out,
            "        <p class=\"empty-note\">No matching projects on the server.</p>"
        )?;
        return Ok(());
    }

    write_project_table(out, &group.projects)
}

fn write_project_table(out: &mut String, projects: &[Project]) -> Result<()> {
    writeln!(out, "        <table>")?;
    writeln!(out, "            <thead>")?;
    writeln!(out, "                <tr>")?;
    writeln!(out, "                    <th>Project</th>")?;
    writeln!(out, "                    <th>Quality Gate</th>")?;
    writeln!(out, "                    <th>Last Analysis</th>")?;
    writeln!(out, "                    <th>History</th>")?;
    writeln!(out, "                </tr>")?;
    writeln!(out, "            </thead>")?;
    writeln!(out, "            <tbody>")?;

    for project in projects {
        writeln!(out, "                <tr>")?;
        writeln!(
            out,
            "                    <td><a href=\"{}\">{}</a></td>",
            escape_html(&project.url),
            escape_html(&project.name)
        )?;
        writeln!(
            out,
            "                    <td><span class=\"badge {}\">{}</span></td>",
            project.status.css_class(),
            project.status.label()
        )?;
        writeln!(
            out,
            "                    <td>{}</td>",
            project
                .last_analysis
                .as_deref()
                .map(format_timestamp)
                .unwrap_or_else(|| "N/A".to_string())
        )?;
        write!(out, "                    <td><div class=\"history\">")?;
        for sample in &project.history {
            // Bar height encodes the numeric status value (PASS 1, WARN 0.5,
            // FAIL 0); failed samples keep a 2px stub so they stay visible.
            let height = (sample.status.history_value() * 16.0).max(2.0) as u32;
            write!(
                out,
                "<span class=\"history-cell {}\" style=\"height: {}px\" title=\"{}: {}\"></span>",
                sample.status.css_class(),
                height,
                escape_html(&format_timestamp(&sample.date)),
                sample.status.label()
            )?;
        }
        writeln!(out, "</div></td>")?;
        writeln!(out, "                </tr>")?;
    }

    writeln!(out, "            </tbody>")?;
    writeln!(out, "        </table>")?;
    Ok(())
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Format a server timestamp (e.g. `2026-01-10T08:00:00+0000`) as
/// `YYYY-MM-DD HH:MM:SS` in the server's local time; unparseable values
/// pass through untouched.
fn format_timestamp(raw: &str) -> String {
    if let Ok(dt) = chrono::DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%z") {
        return dt.format("%Y-%m-%d %H:%M:%S").to_string();
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return dt.format("%Y-%m-%d %H:%M:%S").to_string();
    }
    raw.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Styling;
    use crate::report::{HistorySample, OverallStatus};
    use crate::status::GateStatus;
    use chrono::{DateTime, Utc};

    fn fixed_time() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-03-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn sample_project(key: &str, status: GateStatus) -> Project {
        Project {
            key: key.to_string(),
            name: key.to_string(),
            url: format!("http://sonar/dashboard?id={key}"),
            raw_status: None,
            status,
            last_analysis: Some("2026-01-10T08:00:00+0000".to_string()),
            history: Vec::new(),
        }
    }

    fn sample_model() -> ReportModel {
        ReportModel {
            title: "[FAILED] Quality Gate Report".to_string(),
            generated_at: fixed_time(),
            server_url: "http://sonar".to_string(),
            overall: Some(OverallStatus {
                status: GateStatus::Fail,
                message: "1 projects failed quality gate".to_string(),
            }),
            groups: vec![Group {
                name: "Team1".to_string(),
                rule: crate::config::GroupRule::Worst,
                projects: vec![sample_project("a", GateStatus::Fail)],
                aggregate: Some(GateStatus::Fail),
            }],
            ungrouped: vec![sample_project("b", GateStatus::Pass)],
            styling: Styling::default(),
        }
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let model = sample_model();
        let first = render(&model).unwrap();
        let second = render(&model).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_user_strings_are_escaped() {
        let mut model = sample_model();
        model.groups[0].name = "<script>alert(1)</script>".to_string();
        model.groups[0].projects[0].name = "Widgets & \"Gadgets\"".to_string();

        let html = render(&model).unwrap();
        assert!(!html.contains("<script>alert"));
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(html.contains("Widgets &amp; &quot;Gadgets&quot;"));
    }

    #[test]
    fn test_empty_model_renders_without_banner() {
        let model = ReportModel {
            title: "Quality Gate Report".to_string(),
            generated_at: fixed_time(),
            server_url: "http://sonar".to_string(),
            overall: None,
            groups: Vec::new(),
            ungrouped: Vec::new(),
            styling: Styling::default(),
        };

        let html = render(&model).unwrap();
        assert!(!html.contains("overall-banner"));
        assert!(!html.contains("Ungrouped"));
        assert!(html.contains("<title>Quality Gate Report</title>"));
    }

    #[test]
    fn test_history_cells_in_order_with_heights() {
        let mut model = sample_model();
        model.groups[0].projects[0].history = vec![
            HistorySample {
                date: "2026-01-01T00:00:00+0000".to_string(),
                status: GateStatus::Pass,
            },
            HistorySample {
                date: "2026-01-02T00:00:00+0000".to_string(),
                status: GateStatus::Warn,
            },
            HistorySample {
                date: "2026-01-03T00:00:00+0000".to_string(),
                status: GateStatus::Fail,
            },
        ];

        let html = render(&model).unwrap();
        let pass_pos = html.find("history-cell pass").unwrap();
        let warn_pos = html.find("history-cell warn").unwrap();
        let fail_pos = html.find("history-cell fail").unwrap();
        assert!(pass_pos < warn_pos && warn_pos < fail_pos);
        assert!(html.contains("history-cell pass\" style=\"height: 16px\""));
        assert!(html.contains("history-cell warn\" style=\"height: 8px\""));
        assert!(html.contains("history-cell fail\" style=\"height: 2px\""));
    }

    #[test]
    fn test_styling_embedded_as_css_variables() {
        let mut model = sample_model();
        model.styling.pass_color = "#11bb11".to_string();

        let html = render(&model).unwrap();
        assert!(html.contains("--pass-color: #11bb11;"));
        assert!(html.contains("--fail-color: #d4333f;"));
        assert!(html.contains("href=\"css/report_styles.css\""));
    }

    #[test]
    fn test_timestamp_formatting() {
        assert_eq!(
            format_timestamp("2026-01-10T08:00:00+0000"),
            "2026-01-10 08:00:00"
        );
        assert_eq!(
            format_timestamp("2026-01-10T08:00:00"),
            "2026-01-10 08:00:00"
        );
        assert_eq!(format_timestamp("garbage"), "garbage");
    }

    #[test]
    fn test_write_report_creates_output_tree() {
        let dir = tempfile::tempdir().unwrap();
        let model = sample_model();

        let path = write_report(&model, dir.path()).unwrap();

        assert!(path.ends_with("quality_gate_report.html"));
        assert!(path.exists());
        assert!(dir.path().join("css/report_styles.css").exists());
        let html = std::fs::read_to_string(&path).unwrap();
        assert!(html.contains("Generated at 2026-03-01 12:00:00 UTC"));
    }
}
