use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single inbox message after the mail-provider boundary has already done
/// header parsing and MIME extraction. This is the only input shape the
/// analysis pipeline consumes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedEmail {
    pub subject: String,
    pub body_text: String,
    #[serde(default)]
    pub snippet: String,
    pub sender_email: String,
    pub sender_name: String,
    pub received_at: DateTime<Utc>,
    #[serde(default)]
    pub is_unread: bool,
}

impl NormalizedEmail {
    /// Lower-cased domain portion of the sender address. A sender without an
    /// `@` yields an empty domain rather than an error, so domain rules
    /// simply never match.
    pub fn sender_domain(&self) -> String {
        sender_domain(&self.sender_email)
    }
}

pub fn sender_domain(sender_email: &str) -> String {
    sender_email
        .rsplit_once('@')
        .map(|(_, domain)| domain.to_lowercase())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sender_domain() {
        assert_eq!(sender_domain("jobs@linkedin.com"), "linkedin.com");
        assert_eq!(sender_domain("Jobs@LinkedIn.COM"), "linkedin.com");
    }

    #[test]
    fn test_sender_domain_missing_at() {
        assert_eq!(sender_domain("not-an-address"), "");
        assert_eq!(sender_domain(""), "");
    }

    #[test]
    fn test_sender_domain_takes_last_at() {
        assert_eq!(sender_domain("\"odd@name\"@example.org"), "example.org");
    }
}
