pub mod analyzer;
pub mod huggingface;
pub mod insights;
pub mod openai;
pub mod rules;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::email::classifier::Importance;

/// Structured per-email analysis produced by one of the analysis strategies.
/// Immutable once produced; field names match the wire contract consumed by
/// the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailAnalysis {
    pub summary: String,
    pub action_items: Vec<String>,
    pub urgency_level: UrgencyLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_response: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<String>,
    pub category: Category,
    pub tips: Vec<String>,
    pub sentiment: Sentiment,
    pub estimated_read_time: String,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum UrgencyLevel {
    Critical,
    High,
    Medium,
    Low,
}

impl UrgencyLevel {
    /// Fixed mapping down to the coarser importance bucket used by the
    /// dashboard and the pattern aggregator.
    pub fn to_importance(self) -> Importance {
        match self {
            UrgencyLevel::Critical | UrgencyLevel::High => Importance::High,
            UrgencyLevel::Medium => Importance::Medium,
            UrgencyLevel::Low => Importance::Low,
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Category {
    ClientWork,
    JobOpportunity,
    Payment,
    Meeting,
    Marketing,
    Personal,
    Other,
}

impl Category {
    /// Human-readable tag added to an email's tag list, `None` for the
    /// catch-all category.
    pub fn as_tag(self) -> Option<&'static str> {
        match self {
            Category::ClientWork => Some("client work"),
            Category::JobOpportunity => Some("job opportunity"),
            Category::Payment => Some("payment"),
            Category::Meeting => Some("meeting"),
            Category::Marketing => Some("marketing"),
            Category::Personal => Some("personal"),
            Category::Other => None,
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn test_urgency_maps_to_importance() {
        assert_eq!(UrgencyLevel::Critical.to_importance(), Importance::High);
        assert_eq!(UrgencyLevel::High.to_importance(), Importance::High);
        assert_eq!(UrgencyLevel::Medium.to_importance(), Importance::Medium);
        assert_eq!(UrgencyLevel::Low.to_importance(), Importance::Low);
    }

    #[test]
    fn test_category_wire_format() {
        let json = serde_json::to_string(&Category::ClientWork).unwrap();
        assert_eq!(json, "\"client_work\"");

        let parsed: Category = serde_json::from_str("\"job_opportunity\"").unwrap();
        assert_eq!(parsed, Category::JobOpportunity);
    }

    #[test]
    fn test_category_from_provider_string() {
        assert_eq!(
            Category::from_str("client_work").unwrap(),
            Category::ClientWork
        );
        assert!(Category::from_str("spam").is_err());
    }
}
