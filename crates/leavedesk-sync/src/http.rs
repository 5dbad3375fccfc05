//! HTTP client for the backend's management endpoints.
//!
//! A thin typed wrapper, nothing more: the backend owns authentication and
//! persistence, and the engine only needs the profile and the record list
//! fetched before it runs.

use leavedesk_core::{EmployeeProfile, LeaveRequest};
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}: {body}")]
    Server { status: u16, body: String },
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Client for the backend's `/django/management` endpoints.
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

#[derive(Deserialize)]
struct ProfileResponse {
    user: EmployeeProfile,
}

#[derive(Deserialize)]
struct LeavesResponse {
    leaves: Vec<LeaveRequest>,
}

impl ApiClient {
    /// Create a client for the given backend base URL.
    ///
    /// `base_url` should be like `http://localhost:8000` (no trailing
    /// slash). `token` is attached as a bearer credential when present;
    /// obtaining and refreshing it is the caller's concern.
    pub fn new(base_url: String, token: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    /// Fetch the profile of the authenticated employee.
    pub async fn fetch_profile(&self) -> Result<EmployeeProfile, SyncError> {
        let url = format!("{}/django/management/status/employee", self.base_url);

        info!(url = %url, "fetching employee profile");
        let resp = self.authed(self.client.get(&url)).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SyncError::Server {
                status: status.as_u16(),
                body,
            });
        }

        let profile: ProfileResponse = resp.json().await?;
        Ok(profile.user)
    }

    /// Fetch all leave records for an employee by email.
    pub async fn fetch_leaves(&self, email: &str) -> Result<Vec<LeaveRequest>, SyncError> {
        let url = format!("{}/django/management/leave-employee-email", self.base_url);

        info!(url = %url, email = %email, "fetching leave records");
        let resp = self
            .authed(self.client.post(&url))
            .json(&serde_json::json!({ "email": email }))
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SyncError::Server {
                status: status.as_u16(),
                body,
            });
        }

        let leaves: LeavesResponse = resp.json().await?;
        info!(count = leaves.leaves.len(), "fetched leave records");
        Ok(leaves.leaves)
    }

    fn authed(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }
}
