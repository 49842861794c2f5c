use crate::document::render;
use crate::git::{ChangeType, CommitRecord};
use crate::meeting::MeetingNote;
use crate::metrics::MetricsDocument;
use crate::period::ReportMode;

/// System prompt for summaries and meeting linkage
pub const SUMMARIZER_SYSTEM: &str = "You are a concise DevLog summarizer.";

/// System prompt for growth feedback
pub const MENTOR_SYSTEM: &str = "You are a senior engineer mentoring a developer. \
Give specific, constructive feedback grounded in the work shown. \
Reply in Markdown without top-level headers.";

/// Commits listed in the growth feedback prompt
const MAX_PROMPT_COMMITS: usize = 20;

/// Generate the period summary prompt (daily or weekly variant)
pub fn period_summary_prompt(metrics: &MetricsDocument) -> String {
    let mut prompt = String::new();

    match metrics.mode {
        ReportMode::Daily => {
            prompt.push_str(&format!(
                "Summarize the development activity of {} in 3-5 sentences.\n",
                metrics.key
            ));
            prompt.push_str("Focus on what changed and why it matters for the project.\n\n");
        }
        ReportMode::Weekly => {
            prompt.push_str(&format!(
                "Write a weekly summary for {} in one short paragraph, then list \
                 up to three themes of the week as bullets.\n",
                metrics.key
            ));
            prompt.push_str("Mention momentum across the week, not individual commits.\n\n");
        }
    }

    push_metrics(&mut prompt, metrics);

    prompt.push_str("\nTop changes:\n");
    prompt.push_str(&render::top_changes(&metrics.top_changes));
    prompt.push('\n');

    prompt
}

/// Generate the growth feedback prompt from the metrics and the commits behind them
pub fn growth_feedback_prompt(metrics: &MetricsDocument, commits: &[CommitRecord]) -> String {
    let mut prompt = String::new();

    prompt.push_str(&format!(
        "Review the work recorded in the {} for {}.\n",
        metrics.mode.title(),
        metrics.key
    ));
    prompt.push_str(
        "Give growth feedback: strengths, one or two areas to improve, \
         and a concrete suggestion for tomorrow.\n\n",
    );

    push_metrics(&mut prompt, metrics);

    prompt.push_str(&format!("\nCommits ({}):\n", commits.len()));
    for (i, commit) in commits.iter().take(MAX_PROMPT_COMMITS).enumerate() {
        prompt.push_str(&format!(
            "{}. {} - {} (+{}/-{}, {} files)\n",
            i + 1,
            commit.short_hash,
            commit.subject,
            commit.added(),
            commit.deleted(),
            commit.files.len()
        ));
    }

    if commits.len() > MAX_PROMPT_COMMITS {
        prompt.push_str(&format!(
            "(Showing first {} of {} commits)\n",
            MAX_PROMPT_COMMITS,
            commits.len()
        ));
    }

    prompt
}

/// Generate the meeting linkage prompt
pub fn meeting_link_prompt(meeting_key: &str, note: &MeetingNote, metrics: &MetricsDocument) -> String {
    let mut prompt = String::new();

    prompt.push_str(&format!(
        "Relate the meeting held on {} to the work done in {}.\n",
        meeting_key, metrics.key
    ));
    prompt.push_str(
        "State which action items progressed, which did not, \
         and anything built that the meeting did not plan. Use short bullets.\n\n",
    );

    prompt.push_str(&format!("Meeting: {}\n", note.title));
    prompt.push_str(&format!(
        "Keywords: {}\n",
        note.keywords.as_deref().unwrap_or("none")
    ));

    prompt.push_str("Action items:\n");
    if note.actions.is_empty() {
        prompt.push_str("- none\n");
    }
    for action in &note.actions {
        prompt.push_str(&format!("- {}\n", action));
    }

    prompt.push_str("\nTop changes:\n");
    prompt.push_str(&render::top_changes(&metrics.top_changes));
    prompt.push('\n');

    prompt
}

fn push_metrics(prompt: &mut String, metrics: &MetricsDocument) {
    prompt.push_str("Statistics:\n");
    prompt.push_str(&format!("- Commits: {}\n", metrics.commit_count));
    prompt.push_str(&format!("- Authors: {}\n", metrics.author_count));
    prompt.push_str(&format!("- Files changed: {}\n", metrics.files_changed));
    prompt.push_str(&format!("- Lines added: {}\n", metrics.additions));
    prompt.push_str(&format!("- Lines deleted: {}\n", metrics.deletions));
    prompt.push_str(&format!("- Net lines: {:+}\n", metrics.net_lines));

    if metrics.mode == ReportMode::Weekly {
        prompt.push_str(&format!("- Active days: {}/7\n", metrics.active_days));
    }

    let types = ChangeType::ALL
        .iter()
        .filter(|t| metrics.count_of(**t) > 0)
        .map(|t| format!("{} {}", t, metrics.count_of(*t)))
        .collect::<Vec<_>>();
    if !types.is_empty() {
        prompt.push_str(&format!("- Change types: {}\n", types.join(", ")));
    }

    if let Some(success) = metrics.build.success {
        prompt.push_str(&format!(
            "- Build: {}\n",
            if success { "success" } else { "failed" }
        ));
    }
    if let (Some(pass), Some(fail)) = (metrics.tests.pass, metrics.tests.fail) {
        prompt.push_str(&format!("- Tests: {} passed, {} failed\n", pass, fail));
    }
}
