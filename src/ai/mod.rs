pub mod claude;
pub mod prompt;

use crate::config::Config;
use crate::git::CommitRecord;
use crate::meeting::MeetingNote;
use crate::metrics::MetricsDocument;
use claude::ClaudeClient;
use tracing::{debug, warn};

/// Text used when no API key is configured
pub const SKIPPED_PLACEHOLDER: &str = "Narrative skipped (no API key configured).";

const SUMMARY_TEMPERATURE: f32 = 0.2;
const FEEDBACK_TEMPERATURE: f32 = 0.5;

/// Text used in place of a narrative whose request failed
pub fn failure_placeholder(reason: &str) -> String {
    format!("Narrative request failed: {}", reason)
}

/// Free-text sections written by a language model.
///
/// Never fails: a missing client or a failed request becomes a placeholder.
pub struct Synthesizer {
    client: Option<ClaudeClient>,
}

impl Synthesizer {
    pub fn new(client: Option<ClaudeClient>) -> Self {
        Self { client }
    }

    /// Build from the resolved credentials; no API key is a valid, disabled state
    pub fn from_config(config: &Config) -> Self {
        let client = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .and_then(|key| match ClaudeClient::new(key) {
                Ok(client) => {
                    let client = client
                        .with_model(config.model.clone())
                        .with_max_tokens(config.max_tokens);
                    Some(match config.api_url {
                        Some(ref url) => client.with_api_url(url.clone()),
                        None => client,
                    })
                }
                Err(e) => {
                    warn!("Could not create language model client: {}", e);
                    None
                }
            });

        Self { client }
    }

    pub fn is_enabled(&self) -> bool {
        self.client.is_some()
    }

    pub async fn period_summary(&self, metrics: &MetricsDocument) -> String {
        let prompt = prompt::period_summary_prompt(metrics);
        self.generate(prompt::SUMMARIZER_SYSTEM, prompt, SUMMARY_TEMPERATURE)
            .await
    }

    pub async fn growth_feedback(&self, metrics: &MetricsDocument, commits: &[CommitRecord]) -> String {
        let prompt = prompt::growth_feedback_prompt(metrics, commits);
        self.generate(prompt::MENTOR_SYSTEM, prompt, FEEDBACK_TEMPERATURE)
            .await
    }

    pub async fn meeting_linkage(
        &self,
        meeting_key: &str,
        note: &MeetingNote,
        metrics: &MetricsDocument,
    ) -> String {
        let prompt = prompt::meeting_link_prompt(meeting_key, note, metrics);
        self.generate(prompt::SUMMARIZER_SYSTEM, prompt, SUMMARY_TEMPERATURE)
            .await
    }

    async fn generate(&self, system: &str, prompt: String, temperature: f32) -> String {
        let Some(ref client) = self.client else {
            debug!("No language model client, using placeholder");
            return SKIPPED_PLACEHOLDER.to_string();
        };

        match client.complete(system, prompt, temperature).await {
            Ok(text) => text,
            Err(e) => {
                warn!("Narrative request failed: {}", e);
                failure_placeholder(&e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::stats::StatsSnapshot;
    use crate::metrics::{merge, Period, RunContext};
    use crate::period::ReportKey;
    use crate::reports::ExternalSummaries;
    use chrono::{FixedOffset, TimeZone};

    fn empty_metrics() -> MetricsDocument {
        let run = RunContext {
            key: ReportKey::parse("2025-11-12").unwrap(),
            generated_at: FixedOffset::east_opt(0)
                .unwrap()
                .with_ymd_and_hms(2025, 11, 12, 0, 0, 0)
                .unwrap(),
            period: Period::default(),
            branch: "main".to_string(),
            base_branch: None,
        };
        merge(
            None,
            &StatsSnapshot::default(),
            &[],
            &ExternalSummaries::default(),
            &run,
        )
    }

    #[tokio::test]
    async fn test_missing_credential_uses_skip_placeholder() {
        let synthesizer = Synthesizer::from_config(&Config::default());
        assert!(!synthesizer.is_enabled());

        let metrics = empty_metrics();
        assert_eq!(synthesizer.period_summary(&metrics).await, SKIPPED_PLACEHOLDER);
        assert_eq!(synthesizer.growth_feedback(&metrics, &[]).await, SKIPPED_PLACEHOLDER);
    }

    #[tokio::test]
    async fn test_blank_credential_counts_as_missing() {
        let config = Config {
            api_key: Some("  ".to_string()),
            ..Config::default()
        };
        assert!(!Synthesizer::from_config(&config).is_enabled());

        let config = Config {
            api_key: Some("sk-ant-test".to_string()),
            ..Config::default()
        };
        assert!(Synthesizer::from_config(&config).is_enabled());
    }

    #[tokio::test]
    async fn test_failed_request_uses_failure_placeholder() {
        let client = ClaudeClient::new("key".to_string())
            .unwrap()
            .with_api_url("http://127.0.0.1:1/v1/messages".to_string());
        let synthesizer = Synthesizer::new(Some(client));

        let text = synthesizer.period_summary(&empty_metrics()).await;
        assert!(text.starts_with("Narrative request failed: "));
    }
}
