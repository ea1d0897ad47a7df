/// HTTP client for the TaskDesk REST API
///
/// Every dashboard action maps to exactly one call here. Errors keep the
/// API's `detail` text so the page can show it verbatim.
///
/// # Example
///
/// ```no_run
/// use taskdesk_dashboard::client::ApiClient;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = ApiClient::new("http://127.0.0.1:8000", 10)?;
/// let token = client.login("alice", "wonderland").await?;
/// let tasks = client.list_tasks(&token.access_token).await?;
/// println!("{} tasks", tasks.len());
/// # Ok(())
/// # }
/// ```

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use taskdesk_shared::models::{
    task::{Task, TaskStatus},
    user::UserProfile,
};
use tracing::debug;

/// Error type for API calls
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The API rejected the bearer token or the credentials
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Any other non-success response
    #[error("{detail}")]
    Api { status: StatusCode, detail: String },

    /// Connection, timeout or decoding failure
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
}

impl ClientError {
    /// Text suitable for showing to the user
    pub fn detail(&self) -> String {
        match self {
            ClientError::Unauthorized(detail) | ClientError::Api { detail, .. } => detail.clone(),
            ClientError::Transport(e) => e.to_string(),
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Unauthorized(_) => Some(StatusCode::UNAUTHORIZED),
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Transport(e) => e.status(),
        }
    }
}

/// `POST /token` response
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<String>,
}

#[derive(Serialize)]
struct Credentials<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct TaskBody<'a> {
    title: &'a str,
    description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<TaskStatus>,
}

/// Thin typed wrapper over `reqwest::Client`
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    /// Creates a client for the API at `base_url`
    pub fn new(base_url: impl Into<String>, timeout_seconds: u64) -> Result<Self, ClientError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Exchanges credentials for an access token
    pub async fn login(&self, username: &str, password: &str) -> Result<TokenResponse, ClientError> {
        let request = self
            .http
            .post(self.url("/token"))
            .form(&Credentials { username, password });

        expect_json(send(request).await?).await
    }

    /// Registers a new account
    pub async fn signup(&self, username: &str, password: &str) -> Result<UserProfile, ClientError> {
        let request = self
            .http
            .post(self.url("/users/"))
            .json(&Credentials { username, password });

        expect_json(send(request).await?).await
    }

    /// Profile of the token's owner
    pub async fn me(&self, token: &str) -> Result<UserProfile, ClientError> {
        let request = self.http.get(self.url("/users/me/")).bearer_auth(token);

        expect_json(send(request).await?).await
    }

    /// Tasks visible to the token's owner
    pub async fn list_tasks(&self, token: &str) -> Result<Vec<Task>, ClientError> {
        let request = self.http.get(self.url("/tasks/")).bearer_auth(token);

        expect_json(send(request).await?).await
    }

    pub async fn create_task(
        &self,
        token: &str,
        title: &str,
        description: Option<&str>,
    ) -> Result<Task, ClientError> {
        let request = self
            .http
            .post(self.url("/tasks/"))
            .bearer_auth(token)
            .json(&TaskBody {
                title,
                description,
                status: None,
            });

        expect_json(send(request).await?).await
    }

    pub async fn update_task(
        &self,
        token: &str,
        task_id: i64,
        title: &str,
        description: Option<&str>,
        status: TaskStatus,
    ) -> Result<Task, ClientError> {
        let request = self
            .http
            .put(self.url(&format!("/tasks/{}", task_id)))
            .bearer_auth(token)
            .json(&TaskBody {
                title,
                description,
                status: Some(status),
            });

        expect_json(send(request).await?).await
    }

    /// Deletes a task; only 204 counts as success
    pub async fn delete_task(&self, token: &str, task_id: i64) -> Result<(), ClientError> {
        let request = self
            .http
            .delete(self.url(&format!("/tasks/{}", task_id)))
            .bearer_auth(token);

        let status = send(request).await?.status();
        if status == StatusCode::NO_CONTENT {
            Ok(())
        } else {
            Err(ClientError::Api {
                status,
                detail: status.as_u16().to_string(),
            })
        }
    }
}

/// Sends the request and turns error statuses into `ClientError`
async fn send(request: RequestBuilder) -> Result<Response, ClientError> {
    let response = request.send().await?;
    let status = response.status();

    debug!(status = status.as_u16(), url = %response.url(), "API response");

    if status.is_success() {
        return Ok(response);
    }

    let detail = response
        .json::<ErrorBody>()
        .await
        .ok()
        .and_then(|body| body.detail)
        .unwrap_or_else(|| "Unknown error".to_string());

    if status == StatusCode::UNAUTHORIZED {
        Err(ClientError::Unauthorized(detail))
    } else {
        Err(ClientError::Api { status, detail })
    }
}

async fn expect_json<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    Ok(response.json::<T>().await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_normalized() {
        let client = ApiClient::new("http://localhost:8000/", 5).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000");
        assert_eq!(client.url("/tasks/"), "http://localhost:8000/tasks/");
    }

    #[test]
    fn test_task_body_omits_status_on_create() {
        let body = serde_json::to_value(TaskBody {
            title: "Write report",
            description: None,
            status: None,
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({ "title": "Write report", "description": null }));

        let body = serde_json::to_value(TaskBody {
            title: "Write report",
            description: Some("v2"),
            status: Some(TaskStatus::InProgress),
        })
        .unwrap();
        assert_eq!(body["status"], "in_progress");
    }

    #[test]
    fn test_error_status() {
        let err = ClientError::Api {
            status: StatusCode::FORBIDDEN,
            detail: "Not authorized to update this task".to_string(),
        };
        assert_eq!(err.status(), Some(StatusCode::FORBIDDEN));
        assert_eq!(err.to_string(), "Not authorized to update this task");
        assert_eq!(err.detail(), "Not authorized to update this task");
        assert_eq!(
            ClientError::Unauthorized("x".into()).status(),
            Some(StatusCode::UNAUTHORIZED)
        );
    }
}
