//! Section bodies rendered from a metrics snapshot.

use crate::git::top_changes::TopChange;
use crate::git::ChangeType;
use crate::metrics::MetricsDocument;
use crate::period::ReportMode;
use chrono::{DateTime, FixedOffset};

pub const TOP_CHANGES: &str = "1. Top Changes";
pub const SYSTEM_IMPACT: &str = "2. System Impact";
pub const MEETING_LINKAGE: &str = "3. Meeting Linkage";
pub const OVERVIEW_DIAGRAM: &str = "4. Overview Diagram";
pub const SUMMARY: &str = "5. Summary";
pub const GROWTH_FEEDBACK: &str = "6. Growth Feedback";
pub const GENERATED_AT: &str = "Generated At";

const NOT_AVAILABLE: &str = "n/a";

/// Document title without the leading `# `
pub fn title(mode: ReportMode, key: &str) -> String {
    format!("{} — {}", mode.title(), key)
}

/// `- [feat] subject — impact (#42)`
pub fn top_change_line(change: &TopChange) -> String {
    let mut line = format!("- [{}] {} — {}", change.change_type, change.summary, change.impact);
    if let Some(reference) = change.reference {
        line.push_str(&format!(" (#{})", reference));
    }
    line
}

pub fn top_changes(changes: &[TopChange]) -> String {
    if changes.is_empty() {
        return "No commits in this period.".to_string();
    }

    changes
        .iter()
        .map(top_change_line)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Statistics block followed by one line per external summary
pub fn system_impact(metrics: &MetricsDocument) -> String {
    let mut output = String::new();

    if !metrics.period.since.is_empty() {
        output.push_str(&format!(
            "- Period: {} to {}\n",
            metrics.period.since, metrics.period.until
        ));
    }

    if !metrics.branch.is_empty() {
        match metrics.base_branch {
            Some(ref base) => {
                output.push_str(&format!("- Branch: {} (base {})\n", metrics.branch, base))
            }
            None => output.push_str(&format!("- Branch: {}\n", metrics.branch)),
        }
    }

    if metrics.authors.is_empty() {
        output.push_str(&format!("- Commits: {}\n", metrics.commit_count));
    } else {
        output.push_str(&format!(
            "- Commits: {} by {} author(s) ({})\n",
            metrics.commit_count,
            metrics.author_count,
            metrics.authors.join(", ")
        ));
    }

    output.push_str(&format!(
        "- Lines: +{} / -{} (net {:+}) across {} file(s)\n",
        metrics.additions, metrics.deletions, metrics.net_lines, metrics.files_changed
    ));

    if metrics.mode == ReportMode::Weekly {
        output.push_str(&format!("- Active days: {}\n", metrics.active_days));
    }

    if !metrics.hotspot_files.is_empty() {
        let hotspots = metrics
            .hotspot_files
            .iter()
            .map(|h| format!("`{}` ({})", h.path, h.churn))
            .collect::<Vec<_>>()
            .join(", ");
        output.push_str(&format!("- Hotspots: {}\n", hotspots));
    }

    let build = &metrics.build;
    let status = match build.success {
        Some(true) => "success",
        Some(false) => "failed",
        None => NOT_AVAILABLE,
    };
    if build.target.is_empty() {
        output.push_str(&format!("- Build: {}, {} error(s)\n", status, build.errors));
    } else {
        output.push_str(&format!(
            "- Build: {} ({}), {} error(s)\n",
            status, build.target, build.errors
        ));
    }

    let packaging = &metrics.packaging;
    output.push_str(&format!(
        "- Packaging: {} cooked, {} skipped, {} error(s)\n",
        packaging.cooked, packaging.skipped, packaging.errors
    ));

    let tests = &metrics.tests;
    output.push_str(&format!(
        "- Tests: {} passed, {} failed, coverage {}\n",
        or_na(tests.pass),
        or_na(tests.fail),
        tests
            .coverage
            .map(|c| format!("{}%", c))
            .unwrap_or_else(|| NOT_AVAILABLE.to_string())
    ));

    let analysis = &metrics.static_analysis;
    output.push_str(&format!(
        "- Static analysis: {} warning(s) (previous {}), {} new high severity\n",
        or_na(analysis.warn_now),
        analysis.warn_prev,
        analysis.high_new
    ));

    let curated = &metrics.curated;
    if let Some(ref tag) = curated.release_tag {
        output.push_str(&format!("- Release: {}\n", tag));
    }
    if !curated.risk_items.is_empty() {
        output.push_str(&format!("- Risks: {}\n", curated.risk_items.join("; ")));
    }
    if let Some(ref mitigation) = curated.mitigation {
        output.push_str(&format!("- Mitigation: {}\n", mitigation));
    }
    if curated.api_added + curated.api_changed + curated.api_removed > 0 {
        output.push_str(&format!(
            "- API: {} added, {} changed, {} removed\n",
            curated.api_added, curated.api_changed, curated.api_removed
        ));
    }
    if !curated.next_items.is_empty() {
        output.push_str(&format!("- Next: {}\n", curated.next_items.join("; ")));
    }

    output
}

/// Mermaid pie of the non-zero change types
pub fn overview_diagram(metrics: &MetricsDocument) -> String {
    let slices: Vec<(ChangeType, u32)> = ChangeType::ALL
        .iter()
        .map(|t| (*t, metrics.count_of(*t)))
        .filter(|(_, count)| *count > 0)
        .collect();

    if slices.is_empty() {
        return "No commits in this period.".to_string();
    }

    let mut output = String::from("```mermaid\npie title Commit types\n");
    for (change_type, count) in slices {
        output.push_str(&format!("    \"{}\" : {}\n", change_type, count));
    }
    output.push_str("```");
    output
}

pub fn generated_at(at: &DateTime<FixedOffset>) -> String {
    format!("Generated at: {}", at.format("%Y-%m-%d %H:%M:%S %:z"))
}

fn or_na<T: ToString>(value: Option<T>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}
