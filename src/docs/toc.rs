//! `SUMMARY.md` table of contents for the published documentation book.

use std::collections::BTreeMap;

/// Planning categories, in output order
const PLANNING_CATEGORIES: [(&str, &[&str]); 5] = [
    ("System Design", &["multiplayer", "integration", "api", "server"]),
    ("UI/UX Design", &["figma", "ui", "design"]),
    ("Reports", &["report", "evaluation", "assessment", "진행보고서"]),
    ("Presentations", &["presentation", "발표"]),
    ("Feature Plans", &[]),
];

#[derive(Debug, Default)]
struct Groups<'a> {
    /// `YYYY-MM` -> (stem, path)
    daily: BTreeMap<&'a str, Vec<(&'a str, &'a str)>>,
    weekly: Vec<(&'a str, &'a str)>,
    monthly: Vec<(&'a str, &'a str)>,
    meetings: Vec<(&'a str, &'a str)>,
    planning: BTreeMap<usize, Vec<(&'a str, &'a str)>>,
}

/// Build the table of contents from `/`-separated paths relative to the
/// documentation root. Files outside the known folders are ignored.
pub fn build_summary(paths: &[String]) -> String {
    let mut groups = Groups::default();
    let mut has_readme = false;

    for path in paths {
        let path = path.as_str();
        let Some(stem) = path.rsplit('/').next().and_then(|n| n.strip_suffix(".md")) else {
            continue;
        };
        let parts: Vec<&str> = path.split('/').collect();

        match parts.as_slice() {
            ["README.md"] => has_readme = true,
            ["DevLog", "Daily", _] if is_date(stem) => {
                groups.daily.entry(&stem[..7]).or_default().push((stem, path));
            }
            ["DevLog", "Weekly", _] if stem.contains('W') => groups.weekly.push((stem, path)),
            ["DevLog", "Monthly", _] => groups.monthly.push((stem, path)),
            ["DevLog", _] if stem.contains("Summary") => groups.weekly.push((stem, path)),
            ["Meeting", _] => groups.meetings.push((stem, path)),
            ["Planning", _] => {
                let category = planning_category(stem);
                groups.planning.entry(category).or_default().push((stem, path));
            }
            _ => {}
        }
    }

    let mut lines: Vec<String> = vec!["# Summary".to_string(), String::new()];

    if has_readme {
        lines.push("## Introduction".to_string());
        lines.push("* [Getting Started](README.md)".to_string());
        lines.push(String::new());
    }

    lines.push("## DevLog".to_string());
    lines.push(String::new());

    for (month, entries) in groups.daily.iter_mut().rev() {
        entries.sort_by(|a, b| b.cmp(a));
        lines.push(format!("### Daily Logs ({})", month));
        for (stem, path) in entries.iter() {
            lines.push(format!("* [{}]({})", stem, path));
        }
        lines.push(String::new());
    }

    push_group(&mut lines, "### Weekly Summary", &mut groups.weekly, true);
    push_group(&mut lines, "### Monthly Summary", &mut groups.monthly, true);

    if !groups.meetings.is_empty() {
        groups.meetings.sort_by(|a, b| b.cmp(a));
        lines.push("## Meeting Notes".to_string());
        lines.push(String::new());
        for &(stem, path) in &groups.meetings {
            let title = stem
                .strip_prefix("Meeting_")
                .or_else(|| stem.strip_prefix("회의록_"))
                .unwrap_or(stem);
            lines.push(format!("* [{}]({})", title, path));
        }
        lines.push(String::new());
    }

    if !groups.planning.is_empty() {
        lines.push("## Planning".to_string());
        lines.push(String::new());
        for (index, entries) in groups.planning.iter_mut() {
            let (heading, _) = PLANNING_CATEGORIES[*index];
            // Reports read newest first
            let newest_first = heading == "Reports";
            push_group(&mut lines, &format!("### {}", heading), entries, newest_first);
        }
    }

    let mut summary = lines.join("\n").trim_end().to_string();
    summary.push('\n');
    summary
}

fn push_group(lines: &mut Vec<String>, heading: &str, entries: &mut [(&str, &str)], newest_first: bool) {
    if entries.is_empty() {
        return;
    }

    if newest_first {
        entries.sort_by(|a, b| b.cmp(a));
    } else {
        entries.sort();
    }

    lines.push(heading.to_string());
    for (stem, path) in entries.iter() {
        lines.push(format!("* [{}]({})", format_title(stem), path));
    }
    lines.push(String::new());
}

/// Index into `PLANNING_CATEGORIES`
fn planning_category(stem: &str) -> usize {
    let lower = stem.to_lowercase();
    PLANNING_CATEGORIES
        .iter()
        .position(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
        .unwrap_or(PLANNING_CATEGORIES.len() - 1)
}

/// `YYYY-MM-DD` at the start of `stem`
fn is_date(stem: &str) -> bool {
    let bytes = stem.as_bytes();
    bytes.len() >= 10
        && bytes[..10].iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}

/// Underscores become spaces and a leading `YYYY-MM-DD-` is dropped
pub fn format_title(stem: &str) -> String {
    if is_date(stem) && stem.len() == 10 {
        return stem.to_string();
    }

    let title = stem.replace('_', " ");
    if is_date(&title) && title.as_bytes().get(10) == Some(&b'-') {
        return title[11..].trim().to_string();
    }
    title.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_daily_logs_grouped_by_month() {
        let summary = build_summary(&paths(&[
            "DevLog/Daily/2025-10-30.md",
            "DevLog/Daily/2025-11-12.md",
            "DevLog/Daily/2025-11-03.md",
            "DevLog/Daily/notes.md",
        ]));

        let expected = "# Summary\n\n## DevLog\n\n\
                        ### Daily Logs (2025-11)\n\
                        * [2025-11-12](DevLog/Daily/2025-11-12.md)\n\
                        * [2025-11-03](DevLog/Daily/2025-11-03.md)\n\n\
                        ### Daily Logs (2025-10)\n\
                        * [2025-10-30](DevLog/Daily/2025-10-30.md)\n";
        assert_eq!(summary, expected);
    }

    #[test]
    fn test_weekly_monthly_and_meetings() {
        let summary = build_summary(&paths(&[
            "README.md",
            "DevLog/Weekly/2025-W45.md",
            "DevLog/Weekly/2025-W46.md",
            "DevLog/_Last30Summary.md",
            "DevLog/Monthly/2025-11.md",
            "Meeting/Meeting_251111_Daily.md",
            "Meeting/2025-11-12.md",
        ]));

        assert!(summary.contains("## Introduction\n* [Getting Started](README.md)\n"));
        assert!(summary.contains(
            "### Weekly Summary\n\
             * [Last30Summary](DevLog/_Last30Summary.md)\n\
             * [2025-W46](DevLog/Weekly/2025-W46.md)\n\
             * [2025-W45](DevLog/Weekly/2025-W45.md)\n"
        ));
        assert!(summary.contains("### Monthly Summary\n* [2025-11](DevLog/Monthly/2025-11.md)\n"));
        assert!(summary.contains(
            "## Meeting Notes\n\n\
             * [251111_Daily](Meeting/Meeting_251111_Daily.md)\n\
             * [2025-11-12](Meeting/2025-11-12.md)\n"
        ));
    }

    #[test]
    fn test_planning_categories() {
        let summary = build_summary(&paths(&[
            "Planning/Server_Integration.md",
            "Planning/Inventory_System.md",
            "Planning/Figma_Screens.md",
            "Planning/2025-11-01-Progress_Report.md",
            "Planning/Final_Presentation.md",
        ]));

        let planning = summary.split("## Planning\n\n").nth(1).unwrap();
        assert_eq!(
            planning,
            "### System Design\n* [Server Integration](Planning/Server_Integration.md)\n\n\
             ### UI/UX Design\n* [Figma Screens](Planning/Figma_Screens.md)\n\n\
             ### Reports\n* [Progress Report](Planning/2025-11-01-Progress_Report.md)\n\n\
             ### Presentations\n* [Final Presentation](Planning/Final_Presentation.md)\n\n\
             ### Feature Plans\n* [Inventory System](Planning/Inventory_System.md)\n"
        );
    }

    #[test]
    fn test_format_title() {
        assert_eq!(format_title("2025-11-12"), "2025-11-12");
        assert_eq!(format_title("2025-11-12-Sprint_Review"), "Sprint Review");
        assert_eq!(format_title("Combat_Design"), "Combat Design");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(build_summary(&[]), "# Summary\n\n## DevLog\n");
    }
}
