use std::str::FromStr;
use std::time::Duration;

use indoc::formatdoc;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::analysis::analyzer::StrategyError;
use crate::analysis::{rules, Category, EmailAnalysis, Sentiment, UrgencyLevel};
use crate::email::normalized::NormalizedEmail;
use crate::HttpClient;

const MAX_COMPLETION_TOKENS: u32 = 500;

/// Analysis strategy backed by the OpenAI chat completions API.
#[derive(Debug, Clone)]
pub struct OpenAiStrategy {
    http_client: HttpClient,
    api_key: String,
    endpoint: String,
    model_id: String,
    temperature: f64,
    timeout: Duration,
}

impl OpenAiStrategy {
    pub fn new(
        http_client: HttpClient,
        api_key: String,
        endpoint: String,
        model_id: String,
        temperature: f64,
        timeout: Duration,
    ) -> Self {
        Self {
            http_client,
            api_key,
            endpoint,
            model_id,
            temperature,
            timeout,
        }
    }

    pub async fn analyze(&self, email: &NormalizedEmail) -> Result<EmailAnalysis, StrategyError> {
        let resp = self
            .http_client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .timeout(self.timeout)
            .json(&json!({
                "model": &self.model_id,
                "temperature": self.temperature,
                "max_tokens": MAX_COMPLETION_TOKENS,
                "messages": [
                    {
                        "role": "user",
                        "content": analysis_prompt(email)
                    }
                ],
            }))
            .send()
            .await?
            .json::<serde_json::Value>()
            .await?;

        let parsed = serde_json::from_value::<ChatApiResponseOrError>(resp.clone())
            .map_err(|_| StrategyError::MalformedResponse(format!("unexpected shape: {}", resp)))?;

        let parsed = match parsed {
            ChatApiResponseOrError::Error(error) => {
                return Err(StrategyError::Api(error.message));
            }
            ChatApiResponseOrError::Response(parsed) => parsed,
        };

        let content = parsed
            .choices
            .first()
            .map(|choice| choice.message.content.as_str())
            .ok_or_else(|| StrategyError::MalformedResponse("no choices in response".into()))?;

        let partial = parse_analysis_content(content)?;
        // The provider is not trusted to return every field; backfill anything
        // missing from the rule-based baseline.
        let baseline = rules::analyze(
            &email.subject,
            &email.body_text,
            &email.sender_email,
            &email.sender_name,
        );

        Ok(partial.overlay_on(baseline))
    }
}

fn analysis_prompt(email: &NormalizedEmail) -> String {
    formatdoc! {r#"
        You are an AI assistant specialized in helping freelancers manage their emails. Analyze this email and provide structured insights:

        Subject: {subject}
        From: {name} <{address}>
        Content: {body}

        Please analyze this email and respond with a JSON object containing:
        1. summary: A concise 1-2 sentence summary
        2. actionItems: Array of specific action items (max 3)
        3. urgencyLevel: critical/high/medium/low
        4. suggestedResponse: Brief suggested response if action needed
        5. deadline: Extract any mentioned deadlines (YYYY-MM-DD format or "none")
        6. category: client_work/job_opportunity/payment/meeting/marketing/personal/other
        7. tips: Array of 2-3 actionable tips for the freelancer
        8. sentiment: positive/neutral/negative
        9. estimatedReadTime: "X min read"

        Focus on freelancing context - clients, projects, payments, deadlines, opportunities."#,
        subject = email.subject,
        name = email.sender_name,
        address = email.sender_email,
        body = email.body_text,
    }
}

/// Fields the model may supply. Everything is optional; anything absent or
/// unparseable is backfilled from the rule-based baseline.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProviderAnalysis {
    pub summary: Option<String>,
    pub action_items: Option<Vec<String>>,
    pub urgency_level: Option<String>,
    pub suggested_response: Option<String>,
    pub deadline: Option<String>,
    pub category: Option<String>,
    pub tips: Option<Vec<String>>,
    pub sentiment: Option<String>,
    pub estimated_read_time: Option<String>,
}

impl ProviderAnalysis {
    pub fn overlay_on(self, mut base: EmailAnalysis) -> EmailAnalysis {
        if let Some(summary) = self.summary {
            base.summary = summary;
        }
        if let Some(mut items) = self.action_items {
            items.truncate(3);
            base.action_items = items;
        }
        if let Some(urgency) = self.urgency_level.and_then(|u| UrgencyLevel::from_str(&u).ok()) {
            base.urgency_level = urgency;
        }
        if let Some(response) = self.suggested_response.filter(|r| !r.is_empty()) {
            base.suggested_response = Some(response);
        }
        if let Some(deadline) = self
            .deadline
            .filter(|d| !d.is_empty() && !d.eq_ignore_ascii_case("none"))
        {
            base.deadline = Some(deadline);
        }
        if let Some(category) = self.category.and_then(|c| Category::from_str(&c).ok()) {
            base.category = category;
        }
        if let Some(mut tips) = self.tips {
            tips.truncate(3);
            if !tips.is_empty() {
                base.tips = tips;
            }
        }
        if let Some(sentiment) = self.sentiment.and_then(|s| Sentiment::from_str(&s).ok()) {
            base.sentiment = sentiment;
        }
        if let Some(read_time) = self.estimated_read_time {
            base.estimated_read_time = read_time;
        }
        base
    }
}

/// Parse the model's JSON answer. Models occasionally wrap the object in
/// prose or fences, so fall back to extracting the first `{...}` block.
fn parse_analysis_content(content: &str) -> Result<ProviderAnalysis, StrategyError> {
    if let Ok(parsed) = serde_json::from_str::<ProviderAnalysis>(content) {
        return Ok(parsed);
    }

    static RE_JSON_OBJECT: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"(?s)\{.*\}").unwrap());

    RE_JSON_OBJECT
        .find(content)
        .and_then(|m| serde_json::from_str::<ProviderAnalysis>(m.as_str()).ok())
        .ok_or_else(|| {
            StrategyError::MalformedResponse(format!("unparseable model answer: {}", content))
        })
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PromptUsage {
    pub prompt_tokens: i64,
    pub completion_tokens: i64,
    pub total_tokens: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatChoice {
    pub index: i32,
    pub message: ChatMessage,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatApiResponse {
    pub choices: Vec<ChatChoice>,
    pub usage: Option<PromptUsage>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatApiError {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChatApiResponseOrError {
    Response(ChatApiResponse),
    Error(ChatApiError),
}
