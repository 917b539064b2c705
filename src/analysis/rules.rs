use lazy_static::lazy_static;
use regex::Regex;

use crate::analysis::{Category, EmailAnalysis, Sentiment, UrgencyLevel};
use crate::email::classifier::resolve_category;
use crate::email::normalized::sender_domain;

const SUMMARY_MAX_CHARS: usize = 150;
const MAX_ACTION_ITEMS: usize = 3;
const READ_TIME_CHARS_PER_MIN: usize = 1000;

lazy_static! {
    // Tried in order; the first capture wins. Best-effort literal extraction,
    // not a validated date.
    static ref DEADLINE_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"(?i)by (\w+ \d{1,2})").unwrap(),
        Regex::new(r"(?i)deadline[:\s]+(\w+ \d{1,2})").unwrap(),
        Regex::new(r"(?i)due[:\s]+(\w+ \d{1,2})").unwrap(),
    ];
}

/// Rule-based analysis strategy. Deterministic, no I/O, and total: any
/// string input, including empty strings, produces a full analysis. This is
/// the terminal fallback of the strategy chain and must never fail.
pub fn analyze(
    subject: &str,
    body: &str,
    sender_email: &str,
    sender_name: &str,
) -> EmailAnalysis {
    let text = format!("{} {}", subject, body).to_lowercase();
    let domain = sender_domain(sender_email);

    let category = resolve_category(&text, &domain);
    let urgency_level = determine_urgency(&text);
    let action_items = extract_action_items(&text);
    let deadline = extract_deadline(&text);

    let summary = if body.chars().count() > SUMMARY_MAX_CHARS {
        let truncated: String = body.chars().take(SUMMARY_MAX_CHARS).collect();
        format!("{}...", truncated)
    } else if body.is_empty() {
        format!("Email from {} regarding: {}", sender_name, subject)
    } else {
        body.to_string()
    };

    EmailAnalysis {
        summary,
        action_items,
        urgency_level,
        suggested_response: suggested_response(category),
        deadline,
        category,
        tips: tips_for(category),
        // No sentiment heuristic exists at this layer.
        sentiment: Sentiment::Neutral,
        estimated_read_time: format!(
            "{} min read",
            body.chars().count().div_ceil(READ_TIME_CHARS_PER_MIN)
        ),
    }
}

fn determine_urgency(text: &str) -> UrgencyLevel {
    if text.contains("urgent") || text.contains("asap") || text.contains("emergency") {
        UrgencyLevel::Critical
    } else if text.contains("important") || text.contains("deadline") || text.contains("tomorrow")
    {
        UrgencyLevel::High
    } else if text.contains("soon") || text.contains("this week") {
        UrgencyLevel::Medium
    } else {
        UrgencyLevel::Low
    }
}

fn extract_action_items(text: &str) -> Vec<String> {
    let mut items = Vec::new();
    if text.contains("respond") || text.contains("reply") {
        items.push("Respond to this email".to_string());
    }
    if text.contains("review") || text.contains("check") {
        items.push("Review the attached documents or links".to_string());
    }
    if text.contains("schedule") || text.contains("meeting") {
        items.push("Schedule a meeting or call".to_string());
    }
    if text.contains("payment") || text.contains("invoice") {
        items.push("Handle payment or invoicing".to_string());
    }
    items.truncate(MAX_ACTION_ITEMS);
    items
}

fn extract_deadline(text: &str) -> Option<String> {
    DEADLINE_PATTERNS.iter().find_map(|pattern| {
        pattern
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    })
}

fn tips_for(category: Category) -> Vec<String> {
    let tips: [&str; 3] = match category {
        Category::ClientWork => [
            "Respond within 24 hours to maintain good client relationships",
            "Keep detailed records of project communications",
            "Clarify project scope and deadlines upfront",
        ],
        Category::JobOpportunity => [
            "Research the company before responding",
            "Tailor your response to highlight relevant experience",
            "Follow up if you don't hear back within a week",
        ],
        Category::Payment => [
            "Track payment due dates in your calendar",
            "Send friendly reminders for overdue payments",
            "Keep detailed invoice records",
        ],
        Category::Meeting => [
            "Prepare an agenda before the meeting",
            "Confirm meeting details 24 hours prior",
            "Follow up with meeting notes and action items",
        ],
        _ => [
            "Process emails in batches to improve efficiency",
            "Set up filters to automatically organize similar emails",
            "Use templates for common responses",
        ],
    };
    tips.iter().map(|t| t.to_string()).collect()
}

fn suggested_response(category: Category) -> Option<String> {
    let template = match category {
        Category::ClientWork => {
            "Thank you for your email. I'll review this and get back to you within [timeframe]."
        }
        Category::JobOpportunity => {
            "Thank you for considering me for this opportunity. I'm interested and would like to learn more."
        }
        Category::Meeting => {
            "Thank you for the meeting invitation. I'm available and will prepare accordingly."
        }
        _ => return None,
    };
    Some(template.to_string())
}
