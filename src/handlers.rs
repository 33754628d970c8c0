use crate::errors::AppError;
use crate::models::TaskId;
use crate::state::{AppState, ClientState, Section};
use crate::ui::render_index;
use axum::{
    extract::{Path, State},
    response::{Html, Redirect},
    Form, Json,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct LoginInput {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterInput {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct TextInput {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct ToggleInput {
    #[serde(default)]
    pub completed: bool,
}

#[derive(Debug, Deserialize)]
pub struct DeleteInput {
    #[serde(default)]
    pub confirmed: bool,
}

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let snapshot = state.controller.snapshot().await;
    Html(render_index(&snapshot))
}

pub async fn get_state(State(state): State<AppState>) -> Json<ClientState> {
    Json(state.controller.snapshot().await)
}

pub async fn login(State(state): State<AppState>, Form(input): Form<LoginInput>) -> Redirect {
    state.controller.login(&input.username, &input.password).await;
    Redirect::to("/")
}

pub async fn register(
    State(state): State<AppState>,
    Form(input): Form<RegisterInput>,
) -> Redirect {
    state
        .controller
        .register(&input.username, &input.email, &input.password)
        .await;
    Redirect::to("/")
}

pub async fn logout(State(state): State<AppState>) -> Redirect {
    state.controller.logout().await;
    Redirect::to("/")
}

pub async fn show_login(State(state): State<AppState>) -> Redirect {
    state.controller.show_login().await;
    Redirect::to("/")
}

pub async fn show_register(State(state): State<AppState>) -> Redirect {
    state.controller.show_register().await;
    Redirect::to("/")
}

pub async fn show_section(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Redirect, AppError> {
    let section: Section = name.parse().map_err(AppError::bad_request)?;
    state.controller.show_section(section).await;
    Ok(Redirect::to("/"))
}

pub async fn add_todo(State(state): State<AppState>, Form(input): Form<TextInput>) -> Redirect {
    state.controller.add_todo(&input.text).await;
    Redirect::to("/")
}

pub async fn toggle_todo(
    State(state): State<AppState>,
    Path(id): Path<TaskId>,
    Form(input): Form<ToggleInput>,
) -> Redirect {
    state.controller.toggle_todo(id, input.completed).await;
    Redirect::to("/")
}

pub async fn start_edit(
    State(state): State<AppState>,
    Path(id): Path<TaskId>,
    Form(input): Form<TextInput>,
) -> Redirect {
    state.controller.start_edit(id, &input.text).await;
    Redirect::to("/")
}

pub async fn save_edit(
    State(state): State<AppState>,
    Path(id): Path<TaskId>,
    Form(input): Form<TextInput>,
) -> Redirect {
    state.controller.save_edit(id, &input.text).await;
    Redirect::to("/")
}

pub async fn cancel_edit(State(state): State<AppState>, Path(id): Path<TaskId>) -> Redirect {
    state.controller.cancel_edit(id).await;
    Redirect::to("/")
}

pub async fn delete_todo(
    State(state): State<AppState>,
    Path(id): Path<TaskId>,
    Form(input): Form<DeleteInput>,
) -> Redirect {
    state
        .controller
        .delete_todo(id, |_prompt| input.confirmed)
        .await;
    Redirect::to("/")
}
