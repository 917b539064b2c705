use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Tokens for one connected mail account, keyed by the account address. The
/// OAuth exchange itself happens elsewhere; this only holds the result.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountCredentials {
    pub email: String,
    pub name: String,
    pub access_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    pub connected_at: DateTime<Utc>,
}

/// Capability interface for credential storage, injected through server
/// state so the analysis core and its tests never touch a concrete global.
/// A deployment can back this with a persistent store without changes here.
pub trait CredentialStore: Send + Sync {
    fn get(&self, email: &str) -> Option<AccountCredentials>;
    fn set(&self, credentials: AccountCredentials);
    fn delete(&self, email: &str) -> bool;
    fn list(&self) -> Vec<AccountCredentials>;
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryCredentialStore {
    inner: Arc<RwLock<HashMap<String, AccountCredentials>>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStore for InMemoryCredentialStore {
    fn get(&self, email: &str) -> Option<AccountCredentials> {
        self.inner.read().unwrap().get(email).cloned()
    }

    fn set(&self, credentials: AccountCredentials) {
        self.inner
            .write()
            .unwrap()
            .insert(credentials.email.clone(), credentials);
    }

    fn delete(&self, email: &str) -> bool {
        self.inner.write().unwrap().remove(email).is_some()
    }

    fn list(&self) -> Vec<AccountCredentials> {
        let mut accounts: Vec<_> = self.inner.read().unwrap().values().cloned().collect();
        accounts.sort_by(|a, b| a.email.cmp(&b.email));
        accounts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creds(email: &str) -> AccountCredentials {
        AccountCredentials {
            email: email.to_string(),
            name: "Test".to_string(),
            access_token: "token".to_string(),
            refresh_token: None,
            connected_at: Utc::now(),
        }
    }

    #[test]
    fn test_set_get_delete() {
        let store = InMemoryCredentialStore::new();
        assert!(store.get("a@example.com").is_none());

        store.set(creds("a@example.com"));
        assert!(store.get("a@example.com").is_some());

        assert!(store.delete("a@example.com"));
        assert!(!store.delete("a@example.com"));
        assert!(store.get("a@example.com").is_none());
    }

    #[test]
    fn test_set_replaces_existing() {
        let store = InMemoryCredentialStore::new();
        store.set(creds("a@example.com"));
        let mut updated = creds("a@example.com");
        updated.access_token = "rotated".to_string();
        store.set(updated);

        assert_eq!(store.get("a@example.com").unwrap().access_token, "rotated");
        assert_eq!(store.list().len(), 1);
    }

    #[test]
    fn test_list_sorted_by_email() {
        let store = InMemoryCredentialStore::new();
        store.set(creds("b@example.com"));
        store.set(creds("a@example.com"));

        let emails: Vec<_> = store.list().into_iter().map(|c| c.email).collect();
        assert_eq!(emails, vec!["a@example.com", "b@example.com"]);
    }
}
