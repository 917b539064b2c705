use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use strum::Display;

use crate::analysis::Category;
use crate::email::normalized::sender_domain;

/// Keywords that mark a message as high importance when found anywhere in the
/// subject or body text.
pub const IMPORTANT_KEYWORDS: [&str; 17] = [
    "urgent",
    "interview",
    "client",
    "job offer",
    "project",
    "deadline",
    "payment",
    "invoice",
    "contract",
    "meeting",
    "important",
    "asap",
    "proposal",
    "milestone",
    "freelance",
    "upwork",
    "freelancer",
];

/// Sender domains that mark a message as high importance regardless of its
/// text content.
pub const IMPORTANT_DOMAINS: [&str; 12] = [
    "upwork.com",
    "freelancer.com",
    "linkedin.com",
    "indeed.com",
    "glassdoor.com",
    "angel.co",
    "stackoverflow.com",
    "fiverr.com",
    "guru.com",
    "99designs.com",
    "toptal.com",
    "peopleperhour.com",
];

const MEDIUM_KEYWORDS: [&str; 3] = ["notification", "update", "reminder"];

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Importance {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub importance: Importance,
    pub tags: Vec<String>,
    pub category: Category,
}

/// Classify a message from its subject, body text, and sender address.
/// Pure and total: any string input, including empty strings and addresses
/// without a domain, produces a classification.
pub fn classify(subject: &str, text_blob: &str, sender_email: &str) -> Classification {
    let text = format!("{} {}", subject, text_blob).to_lowercase();
    let domain = sender_domain(sender_email);

    let has_important_keyword = IMPORTANT_KEYWORDS.iter().any(|k| text.contains(k));
    let has_important_domain = IMPORTANT_DOMAINS.iter().any(|d| domain.contains(d));

    let importance = if has_important_keyword || has_important_domain {
        Importance::High
    } else if MEDIUM_KEYWORDS.iter().any(|k| text.contains(k)) {
        Importance::Medium
    } else {
        Importance::Low
    };

    Classification {
        importance,
        tags: extract_tags(&text, &domain),
        category: resolve_category(&text, &domain),
    }
}

/// First-match-wins category resolution over lower-cased text and sender
/// domain. The domain check precedes the payment keyword check, so a payment
/// notice from a freelance platform resolves to `client_work`.
pub fn resolve_category(text: &str, domain: &str) -> Category {
    if domain.contains("upwork") || domain.contains("freelancer") || domain.contains("fiverr") {
        Category::ClientWork
    } else if text.contains("job") || text.contains("opportunity") || domain.contains("linkedin") {
        Category::JobOpportunity
    } else if text.contains("payment") || text.contains("invoice") || text.contains("paid") {
        Category::Payment
    } else if text.contains("meeting") || text.contains("call") || text.contains("zoom") {
        Category::Meeting
    } else {
        Category::Other
    }
}

fn extract_tags(text: &str, domain: &str) -> Vec<String> {
    let mut tags: IndexSet<String> = IMPORTANT_KEYWORDS
        .iter()
        .filter(|k| text.contains(*k))
        .map(|k| k.to_string())
        .collect();

    if domain.contains("linkedin") {
        tags.insert("career".to_string());
    }
    if domain.contains("github") {
        tags.insert("development".to_string());
    }
    if domain.contains("upwork") || domain.contains("freelancer") || domain.contains("fiverr") {
        tags.insert("freelance".to_string());
    }

    tags.into_iter().collect()
}
