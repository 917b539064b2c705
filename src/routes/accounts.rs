use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    error::{AppError, AppJsonResult},
    state::credential_store::AccountCredentials,
    ServerState,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectAccountRequest {
    pub email: String,
    pub name: String,
    pub access_token: String,
    pub refresh_token: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectedAccount {
    pub email: String,
    pub name: String,
    pub is_connected: bool,
    pub last_sync: DateTime<Utc>,
}

impl From<AccountCredentials> for ConnectedAccount {
    fn from(credentials: AccountCredentials) -> Self {
        ConnectedAccount {
            email: credentials.email,
            name: credentials.name,
            is_connected: true,
            last_sync: credentials.connected_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountsResponse {
    pub accounts: Vec<ConnectedAccount>,
}

/// # GET /api/accounts
pub async fn list_accounts(State(state): State<ServerState>) -> AppJsonResult<AccountsResponse> {
    let accounts = state
        .credentials
        .list()
        .into_iter()
        .map(ConnectedAccount::from)
        .collect();

    Ok(Json(AccountsResponse { accounts }))
}

/// # POST /api/accounts
///
/// Registers tokens for a mail account so it shows up as connected. Token
/// exchange happens at the OAuth boundary; this only stores the result.
pub async fn connect_account(
    State(state): State<ServerState>,
    Json(req): Json<ConnectAccountRequest>,
) -> AppJsonResult<ConnectedAccount> {
    if req.email.is_empty() || req.access_token.is_empty() {
        return Err(AppError::BadRequest(
            "email and accessToken are required".to_string(),
        ));
    }

    let credentials = AccountCredentials {
        email: req.email,
        name: req.name,
        access_token: req.access_token,
        refresh_token: req.refresh_token,
        connected_at: Utc::now(),
    };
    state.credentials.set(credentials.clone());

    Ok(Json(credentials.into()))
}

/// # DELETE /api/accounts/:email
pub async fn disconnect_account(
    State(state): State<ServerState>,
    Path(email): Path<String>,
) -> AppJsonResult<serde_json::Value> {
    if !state.credentials.delete(&email) {
        return Err(AppError::NotFound(format!(
            "No connected account for {}",
            email
        )));
    }

    Ok(Json(serde_json::json!({ "message": "Logged out successfully" })))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::analysis::analyzer::EmailAnalyzer;
    use crate::state::credential_store::InMemoryCredentialStore;

    fn test_state() -> ServerState {
        ServerState {
            http_client: reqwest::Client::new(),
            analyzer: Arc::new(EmailAnalyzer::new(vec![])),
            credentials: Arc::new(InMemoryCredentialStore::new()),
        }
    }

    fn connect_request(email: &str) -> ConnectAccountRequest {
        ConnectAccountRequest {
            email: email.to_string(),
            name: "Primary Account".to_string(),
            access_token: "ya29.token".to_string(),
            refresh_token: Some("1//refresh".to_string()),
        }
    }

    #[tokio::test]
    async fn test_connect_then_list() {
        let state = test_state();
        connect_account(State(state.clone()), Json(connect_request("user@gmail.com")))
            .await
            .unwrap();

        let Json(resp) = list_accounts(State(state)).await.unwrap();
        assert_eq!(resp.accounts.len(), 1);
        assert_eq!(resp.accounts[0].email, "user@gmail.com");
        assert!(resp.accounts[0].is_connected);
    }

    #[tokio::test]
    async fn test_connect_requires_token() {
        let state = test_state();
        let mut req = connect_request("user@gmail.com");
        req.access_token = String::new();

        let result = connect_account(State(state), Json(req)).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_disconnect_unknown_account() {
        let state = test_state();
        let result =
            disconnect_account(State(state), Path("missing@gmail.com".to_string())).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_disconnect_removes_account() {
        let state = test_state();
        connect_account(State(state.clone()), Json(connect_request("user@gmail.com")))
            .await
            .unwrap();

        disconnect_account(State(state.clone()), Path("user@gmail.com".to_string()))
            .await
            .unwrap();

        let Json(resp) = list_accounts(State(state)).await.unwrap();
        assert!(resp.accounts.is_empty());
    }
}
