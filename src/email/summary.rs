use chrono::{DateTime, Utc};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::analysis::EmailAnalysis;
use crate::email::classifier::{classify, Importance};
use crate::email::normalized::NormalizedEmail;

/// A classified email as presented to the dashboard: the normalized record
/// plus importance, tags, and the full analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailSummary {
    pub sender: String,
    pub sender_email: String,
    pub subject: String,
    pub summary: String,
    pub importance: Importance,
    pub tags: Vec<String>,
    pub received_at: DateTime<Utc>,
    pub is_unread: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<EmailAnalysis>,
}

impl EmailSummary {
    /// Attach an analysis to a normalized email. Importance comes from the
    /// analysis urgency; tags start from the keyword/domain classifier and
    /// are enriched with the analysis category and action-item hints.
    pub fn build(email: &NormalizedEmail, analysis: EmailAnalysis) -> Self {
        let classification = classify(&email.subject, &email.snippet, &email.sender_email);

        let mut tags: IndexSet<String> = classification.tags.into_iter().collect();
        if let Some(category_tag) = analysis.category.as_tag() {
            tags.insert(category_tag.to_string());
        }
        for item in &analysis.action_items {
            let item = item.to_lowercase();
            if item.contains("respond") {
                tags.insert("needs response".to_string());
            }
            if item.contains("review") {
                tags.insert("needs review".to_string());
            }
            if item.contains("schedule") {
                tags.insert("scheduling".to_string());
            }
        }

        EmailSummary {
            sender: email.sender_name.clone(),
            sender_email: email.sender_email.clone(),
            subject: email.subject.clone(),
            summary: analysis.summary.clone(),
            importance: analysis.urgency_level.to_importance(),
            tags: tags.into_iter().collect(),
            received_at: email.received_at,
            is_unread: email.is_unread,
            analysis: Some(analysis),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::analysis::{rules, Category};

    fn email(subject: &str, body: &str, sender: &str) -> NormalizedEmail {
        NormalizedEmail {
            subject: subject.to_string(),
            body_text: body.to_string(),
            snippet: body.to_string(),
            sender_email: sender.to_string(),
            sender_name: "Test Sender".to_string(),
            received_at: Utc::now(),
            is_unread: true,
        }
    }

    fn build(subject: &str, body: &str, sender: &str) -> EmailSummary {
        let email = email(subject, body, sender);
        let analysis = rules::analyze(
            &email.subject,
            &email.body_text,
            &email.sender_email,
            &email.sender_name,
        );
        EmailSummary::build(&email, analysis)
    }

    #[test]
    fn test_importance_follows_urgency() {
        let summary = build("urgent fix needed", "asap please", "ops@example.com");
        assert_eq!(summary.importance, Importance::High);

        let summary = build("newsletter", "nothing pressing", "news@example.com");
        assert_eq!(summary.importance, Importance::Low);
    }

    #[test]
    fn test_category_tag_added() {
        let summary = build("about the job", "an opportunity for you", "hr@example.com");
        assert_eq!(
            summary.analysis.as_ref().unwrap().category,
            Category::JobOpportunity
        );
        assert!(summary.tags.contains(&"job opportunity".to_string()));
    }

    #[test]
    fn test_other_category_adds_no_tag() {
        let summary = build("hello", "just checking in", "friend@example.com");
        assert!(!summary.tags.iter().any(|t| t == "other"));
    }

    #[test]
    fn test_action_item_tags() {
        let summary = build(
            "project sync",
            "please reply and schedule a meeting, also review the doc",
            "pm@example.com",
        );
        assert!(summary.tags.contains(&"needs response".to_string()));
        assert!(summary.tags.contains(&"needs review".to_string()));
        assert!(summary.tags.contains(&"scheduling".to_string()));
    }

    #[test]
    fn test_tags_deduplicated() {
        // "meeting" arrives from the keyword tagger and the category tag.
        let summary = build("meeting tomorrow", "meeting at noon", "pm@example.com");
        let meeting_count = summary.tags.iter().filter(|t| *t == "meeting").count();
        assert_eq!(meeting_count, 1);
    }

    #[test]
    fn test_wire_format_camel_case() {
        let summary = build("subject", "body", "a@b.com");
        let json = serde_json::to_value(&summary).unwrap();
        assert!(json.get("senderEmail").is_some());
        assert!(json.get("receivedAt").is_some());
        assert!(json.get("isUnread").is_some());
        assert!(json["analysis"].get("urgencyLevel").is_some());
        assert!(json["analysis"].get("estimatedReadTime").is_some());
    }
}
