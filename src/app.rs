use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/state", get(handlers::get_state))
        .route("/auth/login", post(handlers::login))
        .route("/auth/register", post(handlers::register))
        .route("/auth/logout", post(handlers::logout))
        .route("/auth/show/login", post(handlers::show_login))
        .route("/auth/show/register", post(handlers::show_register))
        .route("/sections/:name", post(handlers::show_section))
        .route("/todos", post(handlers::add_todo))
        .route("/todos/:id/toggle", post(handlers::toggle_todo))
        .route("/todos/:id/edit", post(handlers::start_edit))
        .route("/todos/:id/save", post(handlers::save_edit))
        .route("/todos/:id/cancel", post(handlers::cancel_edit))
        .route("/todos/:id/delete", post(handlers::delete_todo))
        .with_state(state)
}
