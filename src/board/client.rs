//! HTTP client for the board backend.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::models::{
    BoardKey, BoardResponse, CreateWorkflowStatus, MessageResponse, UpdateWorkflowStatus,
    WorkflowStatus,
};
use super::state::BoardState;
use super::sync::SyncRequest;
use crate::board_config::BackendConfig;
use crate::errors::ClientError;

/// The calls the board controller needs from a backend.
#[async_trait]
pub trait BoardApi: Send + Sync + 'static {
    /// Fetch and validate the full board.
    async fn fetch_board(&self, key: &BoardKey) -> Result<BoardState, ClientError>;

    /// Mirror one local edit.
    async fn send(&self, request: &SyncRequest) -> Result<(), ClientError>;
}

/// Pull a human-readable message out of an error body.
///
/// Tries `message` (string or list of strings), then `error`, then falls
/// back to the raw body.
fn extract_error_message(body: &str) -> String {
    if let Ok(json) = serde_json::from_str::<serde_json::Value>(body) {
        match json.get("message") {
            Some(serde_json::Value::String(msg)) => return msg.clone(),
            Some(serde_json::Value::Array(items)) => {
                let parts: Vec<&str> = items.iter().filter_map(|v| v.as_str()).collect();
                if !parts.is_empty() {
                    return parts.join("; ");
                }
            }
            _ => {}
        }
        if let Some(err) = json.get("error").and_then(|v| v.as_str()) {
            return err.to_string();
        }
    }
    body.to_string()
}

fn error_for_status(status: StatusCode, message: String) -> ClientError {
    match status.as_u16() {
        400 | 422 => ClientError::Validation(message),
        401 => ClientError::Unauthorized(message),
        403 => ClientError::Forbidden(message),
        404 => ClientError::NotFound(message),
        409 => ClientError::Conflict(message),
        code => ClientError::Api {
            status: code,
            message,
        },
    }
}

/// reqwest-backed board client.
#[derive(Clone)]
pub struct BoardClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl BoardClient {
    pub fn new(
        base_url: impl Into<String>,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ClientError::Transport)?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
        })
    }

    pub fn from_config(config: &BackendConfig) -> Result<Self, ClientError> {
        Self::new(
            config.base_url.clone(),
            config.token.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Map a non-success response to a `ClientError`.
    async fn check_response(response: Response) -> Result<Response, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(error_for_status(status, extract_error_message(&body)))
    }

    async fn execute(&self, builder: RequestBuilder) -> Result<Response, ClientError> {
        let response = self.authorize(builder).send().await?;
        Self::check_response(response).await
    }

    async fn execute_json<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<T, ClientError> {
        let response = self.execute(builder).await?;
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| ClientError::Decode(e.to_string()))
    }

    // -- Board --

    pub async fn get_board(&self, key: &BoardKey) -> Result<BoardResponse, ClientError> {
        let url = self.url(&format!("boards/workflow/{}", key.workflow_id));
        debug!(%url, project_id = key.project_id, "fetching board");
        self.execute_json(
            self.client
                .get(url)
                .query(&[("projectId", key.project_id)]),
        )
        .await
    }

    async fn send_sync(&self, request: &SyncRequest) -> Result<(), ClientError> {
        let builder = match request {
            SyncRequest::ReorderColumns {
                board_id,
                project_id,
                body,
            } => self
                .client
                .patch(self.url(&format!("boards/{}/columns/reorder", board_id)))
                .query(&[("projectId", *project_id)])
                .json(body),
            SyncRequest::ReorderCards {
                column_id,
                project_id,
                body,
            } => self
                .client
                .patch(self.url(&format!("boards/columns/{}/cards/reorder", column_id)))
                .query(&[("projectId", *project_id)])
                .json(body),
            SyncRequest::MoveCard {
                card_id,
                project_id,
                body,
                ..
            } => self
                .client
                .patch(self.url(&format!("boards/cards/{}/move", card_id)))
                .query(&[("projectId", *project_id)])
                .json(body),
        };
        self.execute(builder).await?;
        Ok(())
    }

    // -- Workflow statuses --

    pub async fn list_statuses(
        &self,
        workflow_id: i64,
        project_id: i64,
    ) -> Result<Vec<WorkflowStatus>, ClientError> {
        self.execute_json(
            self.client
                .get(self.url("workflow-statuses"))
                .query(&[("workflowId", workflow_id), ("projectId", project_id)]),
        )
        .await
    }

    pub async fn get_status(
        &self,
        id: i64,
        project_id: i64,
    ) -> Result<WorkflowStatus, ClientError> {
        self.execute_json(
            self.client
                .get(self.url(&format!("workflow-statuses/{}", id)))
                .query(&[("projectId", project_id)]),
        )
        .await
    }

    pub async fn create_status(
        &self,
        data: &CreateWorkflowStatus,
        project_id: i64,
    ) -> Result<WorkflowStatus, ClientError> {
        data.validate()?;
        self.execute_json(
            self.client
                .post(self.url("workflow-statuses"))
                .query(&[("projectId", project_id)])
                .json(data),
        )
        .await
    }

    pub async fn update_status(
        &self,
        id: i64,
        data: &UpdateWorkflowStatus,
        project_id: i64,
    ) -> Result<WorkflowStatus, ClientError> {
        data.validate()?;
        self.execute_json(
            self.client
                .patch(self.url(&format!("workflow-statuses/{}", id)))
                .query(&[("projectId", project_id)])
                .json(data),
        )
        .await
    }

    pub async fn delete_status(
        &self,
        id: i64,
        project_id: i64,
    ) -> Result<MessageResponse, ClientError> {
        self.execute_json(
            self.client
                .delete(self.url(&format!("workflow-statuses/{}", id)))
                .query(&[("projectId", project_id)]),
        )
        .await
    }
}

#[async_trait]
impl BoardApi for BoardClient {
    async fn fetch_board(&self, key: &BoardKey) -> Result<BoardState, ClientError> {
        let response = self.get_board(key).await?;
        Ok(BoardState::from_response(response)?)
    }

    async fn send(&self, request: &SyncRequest) -> Result<(), ClientError> {
        debug!(kind = request.kind(), %request, "syncing board edit");
        self.send_sync(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_error_message_prefers_message_field() {
        assert_eq!(
            extract_error_message(r#"{"message":"Issue not found","error":"Not Found"}"#),
            "Issue not found"
        );
    }

    #[test]
    fn test_extract_error_message_joins_message_lists() {
        assert_eq!(
            extract_error_message(r#"{"message":["status_name must be a string","workflow_id is required"]}"#),
            "status_name must be a string; workflow_id is required"
        );
    }

    #[test]
    fn test_extract_error_message_falls_back_to_error_then_body() {
        assert_eq!(extract_error_message(r#"{"error":"nope"}"#), "nope");
        assert_eq!(extract_error_message("gateway timeout"), "gateway timeout");
    }

    #[test]
    fn test_error_for_status_mapping() {
        assert!(matches!(
            error_for_status(StatusCode::BAD_REQUEST, "x".into()),
            ClientError::Validation(_)
        ));
        assert!(matches!(
            error_for_status(StatusCode::UNAUTHORIZED, "x".into()),
            ClientError::Unauthorized(_)
        ));
        assert!(matches!(
            error_for_status(StatusCode::FORBIDDEN, "x".into()),
            ClientError::Forbidden(_)
        ));
        assert!(matches!(
            error_for_status(StatusCode::NOT_FOUND, "x".into()),
            ClientError::NotFound(_)
        ));
        assert!(matches!(
            error_for_status(StatusCode::CONFLICT, "x".into()),
            ClientError::Conflict(_)
        ));
        assert!(matches!(
            error_for_status(StatusCode::BAD_GATEWAY, "x".into()),
            ClientError::Api { status: 502, .. }
        ));
    }

    #[tokio::test]
    async fn test_invalid_status_form_is_rejected_locally() {
        // Nothing listens on this port; validation must fail first.
        let client =
            BoardClient::new("http://127.0.0.1:9/api", None, Duration::from_secs(1)).unwrap();
        let err = client
            .create_status(
                &CreateWorkflowStatus {
                    workflow_id: 1,
                    status_name: "   ".into(),
                    status_category: Some("later".into()),
                    is_initial_status: false,
                    order_index: None,
                },
                1,
            )
            .await
            .unwrap_err();
        match err {
            ClientError::Invalid(errors) => {
                assert!(errors.has("status_name"));
                assert!(errors.has("status_category"));
            }
            other => panic!("expected local validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_url_joining_normalizes_slashes() {
        let client = BoardClient::new("http://localhost:3142/api/", None, Duration::from_secs(5))
            .unwrap();
        assert_eq!(client.base_url(), "http://localhost:3142/api");
        assert_eq!(
            client.url("/boards/workflow/1"),
            "http://localhost:3142/api/boards/workflow/1"
        );
    }
}
