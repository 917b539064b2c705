use std::time::Duration;

use serde::Deserialize;
use serde_json::json;

use crate::analysis::analyzer::StrategyError;
use crate::analysis::{rules, EmailAnalysis, Sentiment};
use crate::email::normalized::NormalizedEmail;
use crate::HttpClient;

const SUMMARY_INPUT_MAX_CHARS: usize = 1000;
const SENTIMENT_INPUT_MAX_CHARS: usize = 500;

/// Analysis strategy backed by the Hugging Face inference API. Only supplies
/// a summary and a sentiment; the rest of the analysis comes from the
/// rule-based baseline.
#[derive(Debug, Clone)]
pub struct HuggingFaceStrategy {
    http_client: HttpClient,
    api_key: String,
    endpoint: String,
    summarization_model: String,
    sentiment_model: String,
    timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct SummarizationOutput {
    summary_text: String,
}

impl HuggingFaceStrategy {
    pub fn new(
        http_client: HttpClient,
        api_key: String,
        endpoint: String,
        summarization_model: String,
        sentiment_model: String,
        timeout: Duration,
    ) -> Self {
        Self {
            http_client,
            api_key,
            endpoint,
            summarization_model,
            sentiment_model,
            timeout,
        }
    }

    pub async fn analyze(&self, email: &NormalizedEmail) -> Result<EmailAnalysis, StrategyError> {
        let email_text = format!(
            "Subject: {}\nFrom: {} <{}>\nContent: {}",
            email.subject, email.sender_name, email.sender_email, email.body_text
        );

        let summary = self.summarize(&email_text).await?;
        let sentiment = self
            .classify_sentiment(&format!("{} {}", email.subject, email_text))
            .await?;

        let mut analysis = rules::analyze(
            &email.subject,
            &email.body_text,
            &email.sender_email,
            &email.sender_name,
        );
        analysis.summary = summary;
        analysis.sentiment = sentiment;

        Ok(analysis)
    }

    async fn summarize(&self, email_text: &str) -> Result<String, StrategyError> {
        let input: String = email_text.chars().take(SUMMARY_INPUT_MAX_CHARS).collect();
        let resp = self
            .http_client
            .post(format!("{}/{}", self.endpoint, self.summarization_model))
            .bearer_auth(&self.api_key)
            .timeout(self.timeout)
            .json(&json!({ "inputs": input }))
            .send()
            .await?
            .json::<Vec<SummarizationOutput>>()
            .await?;

        resp.into_iter()
            .next()
            .map(|output| output.summary_text)
            .ok_or_else(|| StrategyError::MalformedResponse("empty summarization output".into()))
    }

    async fn classify_sentiment(&self, text: &str) -> Result<Sentiment, StrategyError> {
        let input: String = text.chars().take(SENTIMENT_INPUT_MAX_CHARS).collect();
        let resp = self
            .http_client
            .post(format!("{}/{}", self.endpoint, self.sentiment_model))
            .bearer_auth(&self.api_key)
            .timeout(self.timeout)
            .json(&json!({ "inputs": input }))
            .send()
            .await?
            .json::<serde_json::Value>()
            .await?;

        top_sentiment_label(&resp)
            .map(sentiment_from_label)
            .ok_or_else(|| {
                StrategyError::MalformedResponse(format!("no sentiment label in: {}", resp))
            })
    }
}

/// The inference API returns either `[{label, score}, ...]` or the nested
/// `[[{label, score}, ...]]`; take the top-scored label from whichever shape
/// arrives.
fn top_sentiment_label(value: &serde_json::Value) -> Option<String> {
    let first = value.as_array()?.first()?;
    let entry = if first.is_array() {
        first.as_array()?.first()?
    } else {
        first
    };
    entry.get("label")?.as_str().map(|s| s.to_string())
}

fn sentiment_from_label(label: String) -> Sentiment {
    let label = label.to_lowercase();
    if label.contains("positive") {
        Sentiment::Positive
    } else if label.contains("negative") {
        Sentiment::Negative
    } else {
        Sentiment::Neutral
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_top_label_flat_shape() {
        let resp = json!([
            {"label": "positive", "score": 0.91},
            {"label": "neutral", "score": 0.07}
        ]);
        assert_eq!(top_sentiment_label(&resp).as_deref(), Some("positive"));
    }

    #[test]
    fn test_top_label_nested_shape() {
        let resp = json!([[
            {"label": "LABEL_negative", "score": 0.77},
            {"label": "LABEL_neutral", "score": 0.2}
        ]]);
        assert_eq!(
            top_sentiment_label(&resp).as_deref(),
            Some("LABEL_negative")
        );
    }

    #[test]
    fn test_top_label_malformed() {
        assert!(top_sentiment_label(&json!({"error": "loading"})).is_none());
        assert!(top_sentiment_label(&json!([])).is_none());
    }

    #[test]
    fn test_sentiment_from_label() {
        assert_eq!(
            sentiment_from_label("Positive".to_string()),
            Sentiment::Positive
        );
        assert_eq!(
            sentiment_from_label("LABEL_negative".to_string()),
            Sentiment::Negative
        );
        assert_eq!(
            sentiment_from_label("something else".to_string()),
            Sentiment::Neutral
        );
    }
}
