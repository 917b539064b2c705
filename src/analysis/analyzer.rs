use std::time::Duration;

use derive_more::derive::Display;
use futures::future::join_all;

use crate::analysis::huggingface::HuggingFaceStrategy;
use crate::analysis::openai::OpenAiStrategy;
use crate::analysis::{rules, EmailAnalysis};
use crate::email::normalized::NormalizedEmail;
use crate::email::summary::EmailSummary;
use crate::server_config::{ModelConfig, ProvidersConfig};
use crate::HttpClient;

/// Failure of a single external strategy. Always contained by the fallback
/// chain, never surfaced to callers.
#[derive(Debug, Display)]
pub enum StrategyError {
    Http(reqwest::Error),
    Api(String),
    MalformedResponse(String),
}

impl std::error::Error for StrategyError {}

impl From<reqwest::Error> for StrategyError {
    fn from(error: reqwest::Error) -> Self {
        StrategyError::Http(error)
    }
}

/// One pluggable way of producing an analysis. The variants are tried in the
/// order the chain holds them; `Rules` is total and terminates every chain.
pub enum Strategy {
    OpenAi(OpenAiStrategy),
    HuggingFace(HuggingFaceStrategy),
    Rules,
}

impl Strategy {
    pub fn name(&self) -> &'static str {
        match self {
            Strategy::OpenAi(_) => "openai",
            Strategy::HuggingFace(_) => "huggingface",
            Strategy::Rules => "rules",
        }
    }

    async fn try_analyze(&self, email: &NormalizedEmail) -> Result<EmailAnalysis, StrategyError> {
        match self {
            Strategy::OpenAi(strategy) => strategy.analyze(email).await,
            Strategy::HuggingFace(strategy) => strategy.analyze(email).await,
            Strategy::Rules => Ok(rules::analyze(
                &email.subject,
                &email.body_text,
                &email.sender_email,
                &email.sender_name,
            )),
        }
    }
}

/// Fallback chain over the configured strategies. External strategies are
/// only added when their credential is present; the rule-based strategy is
/// always last, so analysis as a whole cannot fail.
pub struct EmailAnalyzer {
    strategies: Vec<Strategy>,
}

impl EmailAnalyzer {
    pub fn new(strategies: Vec<Strategy>) -> Self {
        let mut strategies = strategies;
        if !matches!(strategies.last(), Some(Strategy::Rules)) {
            strategies.push(Strategy::Rules);
        }
        Self { strategies }
    }

    pub fn from_config(
        http_client: HttpClient,
        providers: &ProvidersConfig,
        model: &ModelConfig,
    ) -> Self {
        let timeout = Duration::from_millis(providers.timeout_ms);
        let mut strategies = Vec::new();

        if let Some(key) = &providers.openai_api_key {
            strategies.push(Strategy::OpenAi(OpenAiStrategy::new(
                http_client.clone(),
                key.clone(),
                providers.openai_endpoint.clone(),
                model.id.clone(),
                model.temperature,
                timeout,
            )));
        }
        if let Some(key) = &providers.huggingface_api_key {
            strategies.push(Strategy::HuggingFace(HuggingFaceStrategy::new(
                http_client.clone(),
                key.clone(),
                providers.huggingface_endpoint.clone(),
                providers.summarization_model.clone(),
                providers.sentiment_model.clone(),
                timeout,
            )));
        }

        Self::new(strategies)
    }

    /// Analyze one email. A failed external strategy falls through to the
    /// next immediately; no retries within a request.
    pub async fn analyze(&self, email: &NormalizedEmail) -> EmailAnalysis {
        for strategy in &self.strategies {
            match strategy.try_analyze(email).await {
                Ok(analysis) => return analysis,
                Err(e) => {
                    tracing::warn!(
                        strategy = strategy.name(),
                        "Analysis strategy failed, falling through: {}",
                        e
                    );
                }
            }
        }

        // Unreachable in practice: the rules strategy never fails.
        rules::analyze(
            &email.subject,
            &email.body_text,
            &email.sender_email,
            &email.sender_name,
        )
    }

    /// Analyze a batch with per-email fan-out. Emails are independent, so the
    /// calls run concurrently; results are re-sorted newest first before
    /// being returned.
    pub async fn analyze_batch(&self, emails: Vec<NormalizedEmail>) -> Vec<EmailSummary> {
        let mut summaries = join_all(emails.iter().map(|email| async move {
            let analysis = self.analyze(email).await;
            EmailSummary::build(email, analysis)
        }))
        .await;

        summaries.sort_by(|a, b| b.received_at.cmp(&a.received_at));
        summaries
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration as ChronoDuration, Utc};

    use super::*;
    use crate::analysis::Sentiment;
    use crate::email::classifier::Importance;

    fn email(subject: &str, body: &str, sender: &str, hours_ago: i64) -> NormalizedEmail {
        NormalizedEmail {
            subject: subject.to_string(),
            body_text: body.to_string(),
            snippet: body.chars().take(80).collect(),
            sender_email: sender.to_string(),
            sender_name: "Sender".to_string(),
            received_at: Utc::now() - ChronoDuration::hours(hours_ago),
            is_unread: true,
        }
    }

    /// A strategy pointed at an unroutable endpoint fails fast with a
    /// connect error (or times out), which must fall through to rules.
    fn failing_openai() -> Strategy {
        Strategy::OpenAi(OpenAiStrategy::new(
            reqwest::Client::new(),
            "test-key".to_string(),
            "http://127.0.0.1:9/v1/chat/completions".to_string(),
            "gpt-3.5-turbo".to_string(),
            0.3,
            Duration::from_millis(500),
        ))
    }

    #[tokio::test]
    async fn test_failed_provider_falls_through_to_rules() {
        let analyzer = EmailAnalyzer::new(vec![failing_openai()]);
        let analysis = analyzer
            .analyze(&email("urgent question", "please reply", "a@b.com", 1))
            .await;

        // Rule-based output: neutral sentiment, critical urgency.
        assert_eq!(analysis.sentiment, Sentiment::Neutral);
        assert_eq!(
            analysis.urgency_level,
            crate::analysis::UrgencyLevel::Critical
        );
    }

    #[tokio::test]
    async fn test_unconfigured_chain_is_rules_only() {
        let analyzer =
            EmailAnalyzer::from_config(reqwest::Client::new(), &Default::default(), &Default::default());
        assert_eq!(analyzer.strategies.len(), 1);
        assert!(matches!(analyzer.strategies[0], Strategy::Rules));
    }

    #[tokio::test]
    async fn test_configured_chain_order() {
        let providers = ProvidersConfig {
            openai_api_key: Some("k1".to_string()),
            huggingface_api_key: Some("k2".to_string()),
            ..Default::default()
        };
        let analyzer = EmailAnalyzer::from_config(
            reqwest::Client::new(),
            &providers,
            &Default::default(),
        );
        let names: Vec<_> = analyzer.strategies.iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["openai", "huggingface", "rules"]);
    }

    #[tokio::test]
    async fn test_batch_sorted_newest_first() {
        let analyzer = EmailAnalyzer::new(vec![]);
        let summaries = analyzer
            .analyze_batch(vec![
                email("oldest", "b", "a@b.com", 10),
                email("newest", "b", "a@b.com", 1),
                email("middle", "b", "a@b.com", 5),
            ])
            .await;

        let subjects: Vec<_> = summaries.iter().map(|s| s.subject.as_str()).collect();
        assert_eq!(subjects, vec!["newest", "middle", "oldest"]);
    }

    #[tokio::test]
    async fn test_batch_maps_urgency_to_importance() {
        let analyzer = EmailAnalyzer::new(vec![]);
        let summaries = analyzer
            .analyze_batch(vec![email(
                "Urgent: server down",
                "fix asap",
                "ops@example.com",
                1,
            )])
            .await;

        assert_eq!(summaries[0].importance, Importance::High);
    }
}
