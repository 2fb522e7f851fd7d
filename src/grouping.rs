use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use log::debug;

use crate::config::{Config, GroupConfig, GroupRule};
use crate::report::{Group, OverallStatus, Project, ReportModel};
use crate::status::GateStatus;

/// Assemble the report view from the fetched projects and the configured
/// group definitions.
///
/// Groups keep their configured order and members keep the configured entry
/// order; projects claimed by no group are listed separately as ungrouped
/// but still count towards the overall status.
pub fn build_report(
    projects: Vec<Project>,
    config: &Config,
    generated_at: DateTime<Utc>,
    server_url: &str,
) -> ReportModel {
    let mut claimed = vec![false; projects.len()];
    let mut groups = Vec::with_capacity(config.groups.len());

    for (name, group_config) in &config.groups {
        let members = resolve_members(group_config.members(), &projects, &mut claimed);
        if members.len() < group_config.members().len() {
            debug!(
                "Group '{name}': {} of {} configured entries resolved",
                members.len(),
                group_config.members().len()
            );
        }
        let rule = group_config.rule();
        let aggregate = aggregate(&members, rule);
        groups.push(Group {
            name: name.clone(),
            rule,
            projects: members,
            aggregate,
        });
    }

    let ungrouped: Vec<Project> = projects
        .iter()
        .zip(&claimed)
        .filter(|(_, claimed)| !**claimed)
        .map(|(project, _)| project.clone())
        .collect();

    let overall = overall_status(&groups, &ungrouped, &projects);

    let base_title = config
        .report
        .title
        .clone()
        .unwrap_or_else(|| "Quality Gate Report".to_string());
    let title = match &overall {
        Some(overall) => format!("[{}] {base_title}", overall.status.label()),
        None => base_title,
    };

    ReportModel {
        title,
        generated_at,
        server_url: server_url.to_string(),
        overall,
        groups,
        ungrouped,
        styling: config.styling.clone(),
    }
}

/// True when at least one configured group entry matches the project key.
pub fn claimed_by_any(key: &str, groups: &IndexMap<String, GroupConfig>) -> bool {
    groups
        .values()
        .flat_map(|group| group.members())
        .any(|entry| matches(entry, key))
}

/// Resolve a group's configured entries against the fetched projects.
///
/// Entries resolve in configured order; a glob entry expands to its matches
/// in fetched order. Duplicates within one group are dropped. Configured
/// keys the server did not return are dropped silently so that stale
/// configuration cannot fabricate failures.
fn resolve_members(
    entries: &[String],
    projects: &[Project],
    claimed: &mut [bool],
) -> Vec<Project> {
    let mut members: Vec<Project> = Vec::new();

    for entry in entries {
        for (index, project) in projects.iter().enumerate() {
            if !matches(entry, &project.key) {
                continue;
            }
            claimed[index] = true;
            if !members.iter().any(|m| m.key == project.key) {
                members.push(project.clone());
            }
        }
    }

    members
}

fn aggregate(members: &[Project], rule: GroupRule) -> Option<GateStatus> {
    let statuses = members.iter().map(|p| p.status);
    match rule {
        GroupRule::Worst => GateStatus::worst(statuses),
        GroupRule::Best => GateStatus::best(statuses),
    }
}

/// Worst-of across group aggregates and ungrouped projects, with a count
/// summary over all fetched projects. No projects means no overall status.
fn overall_status(
    groups: &[Group],
    ungrouped: &[Project],
    all_projects: &[Project],
) -> Option<OverallStatus> {
    let status = GateStatus::worst(
        groups
            .iter()
            .filter_map(|g| g.aggregate)
            .chain(ungrouped.iter().map(|p| p.status)),
    )?;

    let failed = all_projects
        .iter()
        .filter(|p| p.status == GateStatus::Fail)
        .count();
    let warned = all_projects
        .iter()
        .filter(|p| p.status == GateStatus::Warn)
        .count();

    let message = match status {
        GateStatus::Fail => format!("{failed} projects failed quality gate"),
        GateStatus::Warn => format!("{warned} projects have warnings"),
        GateStatus::Pass => "All projects passed quality gate".to_string(),
    };

    Some(OverallStatus { status, message })
}

/// Glob match over project keys: `*` matches any run of characters, entries
/// without `*` require an exact key match.
fn matches(pattern: &str, key: &str) -> bool {
    if !pattern.contains('*') {
        return pattern == key;
    }

    let mut segments = pattern.split('*');
    let first = segments.next().unwrap_or("");
    if !key.starts_with(first) {
        return false;
    }

    let mut rest = &key[first.len()..];
    let segments: Vec<&str> = segments.collect();

    for (i, segment) in segments.iter().enumerate() {
        let last = i == segments.len() - 1;
        if segment.is_empty() {
            if last {
                return true;
            }
            continue;
        }
        if last {
            return rest.ends_with(segment);
        }
        match rest.find(segment) {
            Some(pos) => rest = &rest[pos + segment.len()..],
            None => return false,
        }
    }

    rest.is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project(key: &str, raw: &str) -> Project {
        Project {
            key: key.to_string(),
            name: key.to_uppercase(),
            url: format!("http://sonar/dashboard?id={key}"),
            raw_status: Some(raw.to_string()),
            status: GateStatus::normalize(Some(raw)),
            last_analysis: None,
            history: Vec::new(),
        }
    }

    fn config_with_groups(groups: &[(&str, &[&str])]) -> Config {
        let mut config = Config::default();
        for (name, members) in groups {
            config.groups.insert(
                name.to_string(),
                GroupConfig::Members(members.iter().map(|m| m.to_string()).collect()),
            );
        }
        config
    }

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-03-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_glob_matching() {
        assert!(matches("svc-auth", "svc-auth"));
        assert!(!matches("svc-auth", "svc-auth-v2"));
        assert!(matches("svc-*", "svc-auth"));
        assert!(matches("*-auth", "svc-auth"));
        assert!(matches("svc-*-prod", "svc-auth-prod"));
        assert!(!matches("svc-*-prod", "svc-auth-dev"));
        assert!(matches("*", "anything"));
        assert!(!matches("svc-*", "api-auth"));
    }

    #[test]
    fn test_worst_of_group_aggregate() {
        let config = config_with_groups(&[("Team1", &["a", "b", "c"])]);
        let projects = vec![project("a", "OK"), project("b", "WARN"), project("c", "ERROR")];

        let report = build_report(projects, &config, now(), "http://sonar");

        let team1 = &report.groups[0];
        assert_eq!(team1.aggregate, Some(GateStatus::Fail));
        assert_eq!(team1.aggregate.unwrap().label(), "FAILED");
        assert_eq!(report.title, "[FAILED] Quality Gate Report");
    }

    #[test]
    fn test_passing_group_and_failing_overall() {
        let config = config_with_groups(&[("Team1", &["a", "b", "c"]), ("Team2", &["d", "e"])]);
        let projects = vec![
            project("a", "OK"),
            project("b", "WARN"),
            project("c", "ERROR"),
            project("d", "OK"),
            project("e", "OK"),
        ];

        let report = build_report(projects, &config, now(), "http://sonar");

        assert_eq!(report.groups[1].aggregate, Some(GateStatus::Pass));
        assert_eq!(report.overall.as_ref().unwrap().status, GateStatus::Fail);
        assert_eq!(
            report.overall.as_ref().unwrap().message,
            "1 projects failed quality gate"
        );
    }

    #[test]
    fn test_unclaimed_project_is_ungrouped_and_counts() {
        let config = config_with_groups(&[("Team2", &["d", "e"])]);
        let projects = vec![project("d", "OK"), project("e", "OK"), project("f", "ERROR")];

        let report = build_report(projects, &config, now(), "http://sonar");

        assert_eq!(report.groups[0].aggregate, Some(GateStatus::Pass));
        assert_eq!(report.ungrouped.len(), 1);
        assert_eq!(report.ungrouped[0].key, "f");
        assert_eq!(report.overall.as_ref().unwrap().status, GateStatus::Fail);
    }

    #[test]
    fn test_configured_but_missing_key_is_dropped() {
        let config = config_with_groups(&[("Team1", &["a", "stale-key"])]);
        let projects = vec![project("a", "OK")];

        let report = build_report(projects, &config, now(), "http://sonar");

        assert_eq!(report.groups[0].projects.len(), 1);
        assert_eq!(report.groups[0].aggregate, Some(GateStatus::Pass));
    }

    #[test]
    fn test_empty_group_has_no_aggregate() {
        let config = config_with_groups(&[("Ghost", &["stale-key"])]);
        let projects = vec![project("f", "OK")];

        let report = build_report(projects, &config, now(), "http://sonar");

        assert!(report.groups[0].aggregate.is_none());
        // the overall status still reflects the ungrouped project
        assert_eq!(report.overall.as_ref().unwrap().status, GateStatus::Pass);
    }

    #[test]
    fn test_no_projects_means_no_overall_status() {
        let config = config_with_groups(&[("Team1", &["a"])]);
        let report = build_report(Vec::new(), &config, now(), "http://sonar");

        assert!(report.overall.is_none());
        assert!(report.ungrouped.is_empty());
        assert_eq!(report.title, "Quality Gate Report");
    }

    #[test]
    fn test_member_order_follows_configuration() {
        let config = config_with_groups(&[("Team1", &["c", "a", "b"])]);
        let projects = vec![project("a", "OK"), project("b", "OK"), project("c", "OK")];

        let report = build_report(projects, &config, now(), "http://sonar");

        let keys: Vec<&str> = report.groups[0].projects.iter().map(|p| p.key.as_str()).collect();
        assert_eq!(keys, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_glob_expansion_and_duplicate_suppression() {
        let config = config_with_groups(&[("Services", &["svc-auth", "svc-*"])]);
        let projects = vec![
            project("svc-billing", "OK"),
            project("svc-auth", "WARN"),
            project("api-gw", "OK"),
        ];

        let report = build_report(projects, &config, now(), "http://sonar");

        let keys: Vec<&str> = report.groups[0].projects.iter().map(|p| p.key.as_str()).collect();
        // exact entry first, then glob matches in fetched order, no duplicate
        assert_eq!(keys, vec!["svc-auth", "svc-billing"]);
        assert_eq!(report.ungrouped.len(), 1);
        assert_eq!(report.ungrouped[0].key, "api-gw");
    }

    #[test]
    fn test_project_may_belong_to_several_groups() {
        let config = config_with_groups(&[("A", &["shared"]), ("B", &["shared"])]);
        let projects = vec![project("shared", "WARN")];

        let report = build_report(projects, &config, now(), "http://sonar");

        assert_eq!(report.groups[0].projects.len(), 1);
        assert_eq!(report.groups[1].projects.len(), 1);
        assert!(report.ungrouped.is_empty());
        assert_eq!(report.overall.as_ref().unwrap().status, GateStatus::Warn);
    }

    #[test]
    fn test_best_rule_override() {
        let mut config = Config::default();
        config.groups.insert(
            "Informational".to_string(),
            GroupConfig::Detailed {
                projects: vec!["a".to_string(), "b".to_string()],
                rule: GroupRule::Best,
            },
        );
        let projects = vec![project("a", "ERROR"), project("b", "OK")];

        let report = build_report(projects, &config, now(), "http://sonar");

        assert_eq!(report.groups[0].aggregate, Some(GateStatus::Pass));
    }

    #[test]
    fn test_all_pass_overall_message() {
        let config = config_with_groups(&[("Team", &["a", "b"])]);
        let projects = vec![project("a", "OK"), project("b", "OK")];

        let report = build_report(projects, &config, now(), "http://sonar");

        let overall = report.overall.as_ref().unwrap();
        assert_eq!(overall.status, GateStatus::Pass);
        assert_eq!(overall.message, "All projects passed quality gate");
        assert_eq!(report.title, "[PASSED] Quality Gate Report");
    }

    #[test]
    fn test_claimed_by_any() {
        let config = config_with_groups(&[("Team", &["svc-*"])]);
        assert!(claimed_by_any("svc-auth", &config.groups));
        assert!(!claimed_by_any("api-gw", &config.groups));
    }
}
