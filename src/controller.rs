//! Screen logic for the to-do client.
//!
//! The controller owns a [`ClientState`] behind a lock and an [`ApiClient`]. Every
//! operation reads the backend, then writes the result into the page. The lock is
//! never held across a request, so loads can overlap; per-view request tokens make
//! sure only the newest response of a view is rendered.

use crate::api::ApiClient;
use crate::errors::ApiError;
use crate::models::{TaskId, TaskPatch, User};
use crate::state::{AuthForm, ClientState, Section, View};
use crate::ui::DELETE_PROMPT;
use chrono::Local;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

pub const FILL_ALL_FIELDS: &str = "Please fill in all fields";
pub const PASSWORD_TOO_SHORT: &str = "Password must be at least 6 characters";
pub const CONNECTION_ERROR: &str = "Connection error. Please try again.";
pub const LOGIN_FAILED: &str = "Login failed";
pub const REGISTRATION_FAILED: &str = "Registration failed";
pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Clone)]
pub struct Controller {
    api: ApiClient,
    state: Arc<Mutex<ClientState>>,
}

impl Controller {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            state: Arc::new(Mutex::new(ClientState::default())),
        }
    }

    pub async fn snapshot(&self) -> ClientState {
        self.state.lock().await.clone()
    }

    /// Page load: date label, then the session check.
    pub async fn bootstrap(&self) {
        self.state
            .lock()
            .await
            .set_current_date(Local::now().date_naive());
        self.check_auth().await;
    }

    pub async fn check_auth(&self) {
        match self.api.check_auth().await {
            Ok(status) if status.authenticated => match status.user {
                Some(user) => self.show_main_app(user).await,
                None => {
                    warn!("backend reported a session without a user");
                    self.state.lock().await.show_auth_screen();
                }
            },
            Ok(_) => self.state.lock().await.show_auth_screen(),
            Err(err) => {
                error!("auth check failed: {err}");
                self.state.lock().await.show_auth_screen();
            }
        }
    }

    async fn show_main_app(&self, user: User) {
        {
            let mut state = self.state.lock().await;
            state.clear_errors();
            state.show_main_app(user);
        }
        self.load_today_tasks().await;
    }

    pub async fn show_login(&self) {
        self.state.lock().await.show_auth_form(AuthForm::Login);
    }

    pub async fn show_register(&self) {
        self.state.lock().await.show_auth_form(AuthForm::Register);
    }

    pub async fn login(&self, username: &str, password: &str) {
        {
            let mut state = self.state.lock().await;
            state.page.login.username = username.to_string();
            state.page.login.password = password.to_string();
            if username.trim().is_empty() || password.is_empty() {
                state.set_login_error(FILL_ALL_FIELDS);
                return;
            }
        }

        match self.api.login(username.trim(), password).await {
            Ok(user) => {
                info!(username = %user.username, "signed in");
                self.show_main_app(user).await;
            }
            Err(err) => {
                let message = auth_failure_message(&err, LOGIN_FAILED);
                self.state.lock().await.set_login_error(message);
            }
        }
    }

    pub async fn register(&self, username: &str, email: &str, password: &str) {
        {
            let mut state = self.state.lock().await;
            let form = &mut state.page.register;
            form.username = username.to_string();
            form.email = email.to_string();
            form.password = password.to_string();

            if username.trim().is_empty() || email.trim().is_empty() || password.is_empty() {
                state.set_register_error(FILL_ALL_FIELDS);
                return;
            }
            if password.chars().count() < MIN_PASSWORD_LEN {
                state.set_register_error(PASSWORD_TOO_SHORT);
                return;
            }
        }

        match self
            .api
            .register(username.trim(), email.trim(), password)
            .await
        {
            Ok(user) => {
                info!(username = %user.username, "registered");
                self.show_main_app(user).await;
            }
            Err(err) => {
                let message = auth_failure_message(&err, REGISTRATION_FAILED);
                self.state.lock().await.set_register_error(message);
            }
        }
    }

    /// Leaves the main app at once; the backend call only gets logged if it fails.
    pub async fn logout(&self) {
        self.state.lock().await.sign_out();
        match self.api.logout().await {
            Ok(()) => info!("signed out"),
            Err(err) => error!("logout failed: {err}"),
        }
    }

    pub async fn show_section(&self, section: Section) {
        self.state.lock().await.activate_section(section);
        match section {
            Section::Today => self.load_today_tasks().await,
            Section::Weekly => self.load_weekly_stats().await,
            Section::Monthly => self.load_monthly_stats().await,
        }
    }

    pub async fn load_today_tasks(&self) {
        let token = self.state.lock().await.begin_request(View::Tasks);
        let result = self.api.list_todos().await;
        {
            let mut state = self.state.lock().await;
            if !state.is_current(token) {
                debug!("discarding superseded task list");
                return;
            }
            match result {
                Ok(tasks) => state.render_tasks(tasks),
                Err(err) if err.is_unauthorized() => {
                    warn!("session expired while loading tasks");
                    state.show_auth_screen();
                    return;
                }
                Err(err) => {
                    error!("error loading todos: {err}");
                    return;
                }
            }
        }
        self.update_daily_progress().await;
    }

    pub async fn add_todo(&self, text: &str) {
        let trimmed = text.trim();
        {
            let mut state = self.state.lock().await;
            state.page.todo_input = text.to_string();
            state.page.todo_input_focused = trimmed.is_empty();
            if trimmed.is_empty() {
                return;
            }
        }

        match self.api.create_todo(trimmed).await {
            Ok(()) => {
                self.state.lock().await.page.todo_input.clear();
                self.load_today_tasks().await;
            }
            Err(err) => log_mutation_failure("adding todo", &err),
        }
    }

    /// Sends the negation of the last-rendered flag; the server copy is not re-read first.
    pub async fn toggle_todo(&self, id: TaskId, completed_before: bool) {
        let result = self
            .api
            .update_todo(id, &TaskPatch::completed(!completed_before))
            .await;
        if backend_answered("toggling todo", &result) {
            self.load_today_tasks().await;
        }
    }

    pub async fn start_edit(&self, id: TaskId, text: &str) {
        if !self.state.lock().await.begin_edit(id, text) {
            warn!(id, "no rendered task to edit");
        }
    }

    /// Blank text counts as cancel.
    pub async fn save_edit(&self, id: TaskId, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            self.cancel_edit(id).await;
            return;
        }

        let result = self.api.update_todo(id, &TaskPatch::text(text)).await;
        if backend_answered("updating todo", &result) {
            self.state.lock().await.end_edit();
            self.load_today_tasks().await;
        }
    }

    pub async fn cancel_edit(&self, id: TaskId) {
        debug!(id, "edit cancelled");
        self.state.lock().await.end_edit();
        self.load_today_tasks().await;
    }

    /// `confirm` is asked before anything is sent; a declined prompt is a no-op.
    pub async fn delete_todo(&self, id: TaskId, confirm: impl FnOnce(&str) -> bool) {
        if !confirm(DELETE_PROMPT) {
            debug!(id, "delete declined");
            return;
        }

        let result = self.api.delete_todo(id).await;
        if backend_answered("deleting todo", &result) {
            self.load_today_tasks().await;
        }
    }

    pub async fn update_daily_progress(&self) {
        let token = self.state.lock().await.begin_request(View::DailyProgress);
        let result = self.api.today_stats().await;
        let mut state = self.state.lock().await;
        if !state.is_current(token) {
            debug!("discarding superseded daily stats");
            return;
        }
        match result {
            Ok(stats) => state.apply_daily_stats(&stats),
            Err(err) => error!("error updating progress: {err}"),
        }
    }

    pub async fn load_weekly_stats(&self) {
        let token = self.state.lock().await.begin_request(View::Weekly);
        let result = self.api.week_stats().await;
        let mut state = self.state.lock().await;
        if !state.is_current(token) {
            debug!("discarding superseded weekly stats");
            return;
        }
        match result {
            Ok(days) => state.render_weekly(days),
            Err(err) => error!("error loading weekly stats: {err}"),
        }
    }

    pub async fn load_monthly_stats(&self) {
        let token = self.state.lock().await.begin_request(View::Monthly);
        let result = self.api.monthly_stats().await;
        let mut state = self.state.lock().await;
        if !state.is_current(token) {
            debug!("discarding superseded monthly stats");
            return;
        }
        match result {
            Ok(months) => state.render_monthly(months),
            Err(err) => error!("error loading monthly stats: {err}"),
        }
    }
}

fn auth_failure_message(err: &ApiError, fallback: &str) -> String {
    match err {
        ApiError::Transport(inner) => {
            error!("auth request failed: {inner}");
            CONNECTION_ERROR.to_string()
        }
        ApiError::Application { .. } => {
            warn!("{err}");
            err.server_message().unwrap_or(fallback).to_string()
        }
    }
}

fn log_mutation_failure(action: &str, err: &ApiError) {
    match err {
        ApiError::Transport(_) => error!("error {action}: {err}"),
        ApiError::Application { .. } => warn!("{action} rejected: {err}"),
    }
}

/// True when the backend sent any response. Rejections are logged and not shown.
fn backend_answered(action: &str, result: &Result<(), ApiError>) -> bool {
    match result {
        Ok(()) => true,
        Err(err) => {
            log_mutation_failure(action, err);
            matches!(err, ApiError::Application { .. })
        }
    }
}
