//! Typed access to the to-do backend.
//!
//! Every call is a single request with no retry. Non-2xx responses become
//! [`ApiError::Application`] carrying the body's `error` message when present.

use crate::config::Config;
use crate::errors::ApiError;
use crate::models::{
    AuthResponse, DailyStats, DayStats, ErrorBody, LoginRequest, MonthStats, NewTask,
    RegisterRequest, SessionStatus, Task, TaskId, TaskPatch, User,
};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

#[derive(Clone, Debug)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        Self::build(base_url.into(), Client::builder())
    }

    pub fn from_config(config: &Config) -> Result<Self, ApiError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.api_timeout {
            builder = builder.timeout(timeout);
        }
        Self::build(config.api_base_url.clone(), builder)
    }

    fn build(base_url: String, builder: reqwest::ClientBuilder) -> Result<Self, ApiError> {
        // The session lives in a server cookie.
        let http = builder.cookie_store(true).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn check_auth(&self) -> Result<SessionStatus, ApiError> {
        self.fetch(self.http.get(self.url("/api/check-auth"))).await
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<User, ApiError> {
        let body = LoginRequest { username, password };
        let response: AuthResponse = self
            .fetch(self.http.post(self.url("/api/login")).json(&body))
            .await?;
        Ok(response.user)
    }

    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<User, ApiError> {
        let body = RegisterRequest {
            username,
            email,
            password,
        };
        let response: AuthResponse = self
            .fetch(self.http.post(self.url("/api/register")).json(&body))
            .await?;
        Ok(response.user)
    }

    pub async fn logout(&self) -> Result<(), ApiError> {
        self.ack(self.http.post(self.url("/api/logout"))).await
    }

    pub async fn list_todos(&self) -> Result<Vec<Task>, ApiError> {
        self.fetch(self.http.get(self.url("/api/todos"))).await
    }

    pub async fn create_todo(&self, text: &str) -> Result<(), ApiError> {
        self.ack(self.http.post(self.url("/api/todos")).json(&NewTask { text }))
            .await
    }

    pub async fn update_todo(&self, id: TaskId, patch: &TaskPatch) -> Result<(), ApiError> {
        self.ack(self.http.put(self.todo_url(id)).json(patch)).await
    }

    pub async fn delete_todo(&self, id: TaskId) -> Result<(), ApiError> {
        self.ack(self.http.delete(self.todo_url(id))).await
    }

    pub async fn today_stats(&self) -> Result<DailyStats, ApiError> {
        self.fetch(self.http.get(self.url("/api/stats/today"))).await
    }

    pub async fn week_stats(&self) -> Result<Vec<DayStats>, ApiError> {
        self.fetch(self.http.get(self.url("/api/stats/week"))).await
    }

    pub async fn monthly_stats(&self) -> Result<Vec<MonthStats>, ApiError> {
        self.fetch(self.http.get(self.url("/api/stats/monthly"))).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn todo_url(&self, id: TaskId) -> String {
        format!("{}/api/todos/{id}", self.base_url)
    }

    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = send(request).await?;
        Ok(response.json::<T>().await?)
    }

    async fn ack(&self, request: RequestBuilder) -> Result<(), ApiError> {
        send(request).await?;
        Ok(())
    }
}

async fn send(request: RequestBuilder) -> Result<Response, ApiError> {
    let response = request.send().await?;
    let status = response.status();
    debug!(%status, url = %response.url(), "backend response");
    if status.is_success() {
        return Ok(response);
    }

    // A missing or non-JSON error body still counts as an application failure.
    let body = response.json::<ErrorBody>().await.unwrap_or_default();
    Err(ApiError::Application {
        status,
        message: body.error,
    })
}
