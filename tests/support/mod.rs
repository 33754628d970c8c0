//! In-memory stand-in for the to-do backend.
#![allow(dead_code)]

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use chrono::{Duration as Days, Local};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone)]
struct MockUser {
    id: i64,
    email: String,
    password: String,
}

#[derive(Debug, Clone)]
pub struct MockTodo {
    pub id: i64,
    pub owner: String,
    pub text: String,
    pub completed: bool,
}

#[derive(Default)]
struct Data {
    users: HashMap<String, MockUser>,
    sessions: HashMap<String, String>,
    todos: Vec<MockTodo>,
    next_id: i64,
    next_session: u64,
    hits: HashMap<String, usize>,
    slow_list: Option<Duration>,
    reject_mutations: bool,
}

impl Data {
    fn hit(&mut self, key: &str) {
        *self.hits.entry(key.to_string()).or_default() += 1;
    }

    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn open_session(&mut self, username: &str) -> String {
        self.next_session += 1;
        let token = format!("s{}", self.next_session);
        self.sessions.insert(token.clone(), username.to_string());
        format!("session={token}; Path=/; HttpOnly")
    }

    fn owned(&self, user: &str) -> impl Iterator<Item = &MockTodo> {
        self.todos.iter().filter(move |todo| todo.owner == user)
    }
}

type Shared = Arc<Mutex<Data>>;

pub struct MockBackend {
    addr: SocketAddr,
    data: Shared,
}

impl MockBackend {
    /// Serves on the calling test's runtime.
    pub async fn start() -> Self {
        let data = Shared::default();
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock backend");
        let addr = listener.local_addr().unwrap();
        let app = routes(Arc::clone(&data));
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("mock backend stopped");
        });
        Self { addr, data }
    }

    /// Serves from its own thread, so it outlives any single test runtime.
    pub fn start_detached() -> Self {
        let data = Shared::default();
        let shared = Arc::clone(&data);
        let (tx, rx) = std::sync::mpsc::channel();
        std::thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("mock backend runtime");
            runtime.block_on(async move {
                let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                    .await
                    .expect("bind mock backend");
                tx.send(listener.local_addr().unwrap()).unwrap();
                axum::serve(listener, routes(shared))
                    .await
                    .expect("mock backend stopped");
            });
        });
        let addr = rx.recv().expect("mock backend address");
        Self { addr, data }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn hits(&self, key: &str) -> usize {
        self.data.lock().unwrap().hits.get(key).copied().unwrap_or(0)
    }

    pub fn add_user(&self, username: &str, password: &str) {
        let mut data = self.data.lock().unwrap();
        let id = data.next_id();
        data.users.insert(
            username.to_string(),
            MockUser {
                id,
                email: format!("{username}@example.com"),
                password: password.to_string(),
            },
        );
    }

    pub fn todos_of(&self, username: &str) -> Vec<MockTodo> {
        self.data.lock().unwrap().owned(username).cloned().collect()
    }

    /// Drops every server-side session, as an expiry would.
    pub fn expire_sessions(&self) {
        self.data.lock().unwrap().sessions.clear();
    }

    /// The next task list response is computed on arrival but sent after `delay`.
    pub fn slow_next_list(&self, delay: Duration) {
        self.data.lock().unwrap().slow_list = Some(delay);
    }

    pub fn reject_mutations(&self, reject: bool) {
        self.data.lock().unwrap().reject_mutations = reject;
    }
}

fn routes(data: Shared) -> Router {
    Router::new()
        .route("/api/check-auth", get(check_auth))
        .route("/api/login", post(login))
        .route("/api/register", post(register))
        .route("/api/logout", post(logout))
        .route("/api/todos", get(list_todos).post(create_todo))
        .route("/api/todos/:id", put(update_todo).delete(delete_todo))
        .route("/api/stats/today", get(today_stats))
        .route("/api/stats/week", get(week_stats))
        .route("/api/stats/monthly", get(monthly_stats))
        .with_state(data)
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

fn session_token(headers: &HeaderMap) -> Option<String> {
    let cookies = headers.get(header::COOKIE)?.to_str().ok()?;
    cookies
        .split(';')
        .find_map(|pair| pair.trim().strip_prefix("session="))
        .map(str::to_string)
}

fn require_user(data: &Data, headers: &HeaderMap) -> Result<String, Response> {
    session_token(headers)
        .and_then(|token| data.sessions.get(&token).cloned())
        .ok_or_else(|| error(StatusCode::UNAUTHORIZED, "Authentication required"))
}

fn progress(completed: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (completed as f64 / total as f64 * 1000.0).round() / 10.0
}

fn todo_json(todo: &MockTodo) -> Value {
    let today = Local::now().date_naive();
    json!({
        "id": todo.id,
        "text": todo.text,
        "completed": todo.completed,
        "date": today.format("%Y-%m-%d").to_string(),
        "month": today.format("%Y-%m").to_string(),
        "created_at": format!("{} 09:00:00", today.format("%Y-%m-%d")),
    })
}

fn auth_success(status: StatusCode, cookie: String, id: i64, username: &str, message: &str) -> Response {
    (
        status,
        [(header::SET_COOKIE, cookie)],
        Json(json!({
            "message": message,
            "user": { "id": id, "username": username },
        })),
    )
        .into_response()
}

async fn check_auth(State(shared): State<Shared>, headers: HeaderMap) -> Response {
    let mut data = shared.lock().unwrap();
    data.hit("GET /api/check-auth");
    match require_user(&data, &headers) {
        Ok(username) => {
            let id = data.users.get(&username).map(|user| user.id);
            Json(json!({
                "authenticated": true,
                "user": { "id": id, "username": username },
            }))
            .into_response()
        }
        Err(_) => Json(json!({ "authenticated": false })).into_response(),
    }
}

async fn login(State(shared): State<Shared>, Json(body): Json<Value>) -> Response {
    let mut data = shared.lock().unwrap();
    data.hit("POST /api/login");
    let username = body["username"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();

    let matched = data
        .users
        .get(username)
        .filter(|user| user.password == password)
        .map(|user| user.id);
    match matched {
        Some(id) => {
            let cookie = data.open_session(username);
            auth_success(StatusCode::OK, cookie, id, username, "Login successful")
        }
        None => error(StatusCode::UNAUTHORIZED, "Invalid credentials"),
    }
}

async fn register(State(shared): State<Shared>, Json(body): Json<Value>) -> Response {
    let mut data = shared.lock().unwrap();
    data.hit("POST /api/register");
    let username = body["username"].as_str().unwrap_or_default();
    let email = body["email"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();

    if username.is_empty() || email.is_empty() || password.is_empty() {
        return error(StatusCode::BAD_REQUEST, "All fields required");
    }
    if data.users.contains_key(username) {
        return error(StatusCode::BAD_REQUEST, "Username already exists");
    }
    if data.users.values().any(|user| user.email == email) {
        return error(StatusCode::BAD_REQUEST, "Email already exists");
    }

    let id = data.next_id();
    data.users.insert(
        username.to_string(),
        MockUser {
            id,
            email: email.to_string(),
            password: password.to_string(),
        },
    );
    let cookie = data.open_session(username);
    auth_success(StatusCode::CREATED, cookie, id, username, "Registration successful")
}

async fn logout(State(shared): State<Shared>, headers: HeaderMap) -> Response {
    let mut data = shared.lock().unwrap();
    data.hit("POST /api/logout");
    if let Some(token) = session_token(&headers) {
        data.sessions.remove(&token);
    }
    Json(json!({ "message": "Logged out successfully" })).into_response()
}

async fn list_todos(State(shared): State<Shared>, headers: HeaderMap) -> Response {
    // The delay applies to rejections too, so a late 401 can race a newer load.
    let (response, delay) = {
        let mut data = shared.lock().unwrap();
        data.hit("GET /api/todos");
        let delay = data.slow_list.take();
        let response = match require_user(&data, &headers) {
            Ok(user) => {
                let todos: Vec<Value> = data.owned(&user).map(todo_json).collect();
                Json(todos).into_response()
            }
            Err(response) => response,
        };
        (response, delay)
    };
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
    response
}

async fn create_todo(
    State(shared): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut data = shared.lock().unwrap();
    data.hit("POST /api/todos");
    let user = match require_user(&data, &headers) {
        Ok(user) => user,
        Err(response) => return response,
    };
    if data.reject_mutations {
        return error(StatusCode::INTERNAL_SERVER_ERROR, "Database unavailable");
    }

    let todo = MockTodo {
        id: data.next_id(),
        owner: user,
        text: body["text"].as_str().unwrap_or_default().to_string(),
        completed: false,
    };
    let response = todo_json(&todo);
    data.todos.push(todo);
    (StatusCode::CREATED, Json(response)).into_response()
}

async fn update_todo(
    State(shared): State<Shared>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut data = shared.lock().unwrap();
    data.hit("PUT /api/todos/:id");
    let user = match require_user(&data, &headers) {
        Ok(user) => user,
        Err(response) => return response,
    };
    if data.reject_mutations {
        return error(StatusCode::INTERNAL_SERVER_ERROR, "Database unavailable");
    }

    let Some(todo) = data
        .todos
        .iter_mut()
        .find(|todo| todo.id == id && todo.owner == user)
    else {
        return error(StatusCode::NOT_FOUND, "Todo not found");
    };
    if let Some(text) = body.get("text").and_then(Value::as_str) {
        todo.text = text.to_string();
    }
    if let Some(completed) = body.get("completed").and_then(Value::as_bool) {
        todo.completed = completed;
    }
    Json(todo_json(todo)).into_response()
}

async fn delete_todo(
    State(shared): State<Shared>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Response {
    let mut data = shared.lock().unwrap();
    data.hit("DELETE /api/todos/:id");
    let user = match require_user(&data, &headers) {
        Ok(user) => user,
        Err(response) => return response,
    };
    if data.reject_mutations {
        return error(StatusCode::INTERNAL_SERVER_ERROR, "Database unavailable");
    }

    let before = data.todos.len();
    data.todos.retain(|todo| !(todo.id == id && todo.owner == user));
    if data.todos.len() == before {
        return error(StatusCode::NOT_FOUND, "Todo not found");
    }
    Json(json!({ "message": "Todo deleted" })).into_response()
}

async fn today_stats(State(shared): State<Shared>, headers: HeaderMap) -> Response {
    let mut data = shared.lock().unwrap();
    data.hit("GET /api/stats/today");
    let user = match require_user(&data, &headers) {
        Ok(user) => user,
        Err(response) => return response,
    };
    let total = data.owned(&user).count();
    let completed = data.owned(&user).filter(|todo| todo.completed).count();
    Json(json!({
        "total": total,
        "completed": completed,
        "pending": total - completed,
        "progress": progress(completed, total),
    }))
    .into_response()
}

async fn week_stats(State(shared): State<Shared>, headers: HeaderMap) -> Response {
    let mut data = shared.lock().unwrap();
    data.hit("GET /api/stats/week");
    let user = match require_user(&data, &headers) {
        Ok(user) => user,
        Err(response) => return response,
    };
    let today = Local::now().date_naive();
    let week: Vec<Value> = (0..7)
        .rev()
        .map(|offset| {
            let date = today - Days::days(offset);
            // Every mock task belongs to today.
            let (total, completed) = if offset == 0 {
                (
                    data.owned(&user).count(),
                    data.owned(&user).filter(|todo| todo.completed).count(),
                )
            } else {
                (0, 0)
            };
            json!({
                "date": date.format("%Y-%m-%d").to_string(),
                "day": date.format("%a").to_string(),
                "total": total,
                "completed": completed,
                "progress": progress(completed, total),
            })
        })
        .collect();
    Json(week).into_response()
}

async fn monthly_stats(State(shared): State<Shared>, headers: HeaderMap) -> Response {
    let mut data = shared.lock().unwrap();
    data.hit("GET /api/stats/monthly");
    let user = match require_user(&data, &headers) {
        Ok(user) => user,
        Err(response) => return response,
    };
    let total = data.owned(&user).count();
    if total == 0 {
        return Json(json!([])).into_response();
    }
    let completed = data.owned(&user).filter(|todo| todo.completed).count();
    let today = Local::now().date_naive();
    Json(json!([{
        "month": today.format("%Y-%m").to_string(),
        "month_name": today.format("%B %Y").to_string(),
        "total": total,
        "completed": completed,
        "pending": total - completed,
        "progress": progress(completed, total),
    }]))
    .into_response()
}
