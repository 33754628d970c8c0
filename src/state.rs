use crate::controller::Controller;
use crate::models::{DailyStats, DayStats, MonthStats, Task, TaskId, User};
use chrono::NaiveDate;
use serde::Serialize;
use std::{fmt, str::FromStr};

/// Shared state of the axum front end.
#[derive(Clone)]
pub struct AppState {
    pub controller: Controller,
}

impl AppState {
    pub fn new(controller: Controller) -> Self {
        Self { controller }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Screen {
    /// Session not checked yet.
    #[default]
    Checking,
    Auth,
    Main,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthForm {
    #[default]
    Login,
    Register,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    #[default]
    Today,
    Weekly,
    Monthly,
}

impl Section {
    pub const ALL: [Section; 3] = [Section::Today, Section::Weekly, Section::Monthly];

    pub fn as_str(self) -> &'static str {
        match self {
            Section::Today => "today",
            Section::Weekly => "weekly",
            Section::Monthly => "monthly",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Section {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "today" => Ok(Section::Today),
            "weekly" => Ok(Section::Weekly),
            "monthly" => Ok(Section::Monthly),
            other => Err(format!("unknown section '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct LoginForm {
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub error: Option<String>,
}

/// Compact progress shown above today's list.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProgressHeader {
    pub width: f64,
    pub text: String,
    pub completed: u64,
    pub total: u64,
}

/// Detail tiles under today's list.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StatTiles {
    pub total: u64,
    pub completed: u64,
    pub pending: u64,
}

/// Everything the page shows. Rendering reads only from here.
#[derive(Debug, Clone, Serialize)]
pub struct Page {
    pub screen: Screen,
    pub auth_form: AuthForm,
    pub login: LoginForm,
    pub register: RegisterForm,
    pub user_name: String,
    pub current_date: String,
    pub section: Section,
    pub todo_input: String,
    pub todo_input_focused: bool,
    pub todos: Vec<Task>,
    pub empty_state: bool,
    pub edit_text: String,
    pub header_progress: ProgressHeader,
    pub detail_stats: StatTiles,
    pub weekly: Option<Vec<DayStats>>,
    pub monthly: Option<Vec<MonthStats>>,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            screen: Screen::default(),
            auth_form: AuthForm::default(),
            login: LoginForm::default(),
            register: RegisterForm::default(),
            user_name: String::new(),
            current_date: String::new(),
            section: Section::default(),
            todo_input: String::new(),
            todo_input_focused: false,
            todos: Vec::new(),
            empty_state: false,
            edit_text: String::new(),
            header_progress: ProgressHeader {
                text: "0%".to_string(),
                ..ProgressHeader::default()
            },
            detail_stats: StatTiles::default(),
            weekly: None,
            monthly: None,
        }
    }
}

/// Views that load independently and can have a fetch in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Tasks,
    DailyProgress,
    Weekly,
    Monthly,
}

impl View {
    fn index(self) -> usize {
        match self {
            View::Tasks => 0,
            View::DailyProgress => 1,
            View::Weekly => 2,
            View::Monthly => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestToken {
    view: View,
    generation: u64,
}

/// Per-view generation counters. Only the latest started fetch of a view may render.
#[derive(Debug, Clone, Default)]
pub struct RequestGenerations {
    latest: [u64; 4],
}

impl RequestGenerations {
    pub fn begin(&mut self, view: View) -> RequestToken {
        let slot = &mut self.latest[view.index()];
        *slot = slot.wrapping_add(1);
        RequestToken {
            view,
            generation: *slot,
        }
    }

    pub fn is_current(&self, token: RequestToken) -> bool {
        self.latest[token.view.index()] == token.generation
    }
}

/// Client-side state: the signed-in user, the row being edited and the page.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ClientState {
    pub current_user: Option<User>,
    pub editing_todo_id: Option<TaskId>,
    pub page: Page,
    #[serde(skip)]
    requests: RequestGenerations,
}

impl ClientState {
    pub fn begin_request(&mut self, view: View) -> RequestToken {
        self.requests.begin(view)
    }

    pub fn is_current(&self, token: RequestToken) -> bool {
        self.requests.is_current(token)
    }

    pub fn set_current_date(&mut self, date: NaiveDate) {
        self.page.current_date = date.format("%A, %B %-d, %Y").to_string();
    }

    pub fn show_auth_screen(&mut self) {
        self.page.screen = Screen::Auth;
    }

    /// Typed passwords and the register form do not outlive a successful sign-in.
    pub fn show_main_app(&mut self, user: User) {
        self.page.login.password.clear();
        self.page.register = RegisterForm::default();
        self.page.user_name = user.username.clone();
        self.current_user = Some(user);
        self.page.screen = Screen::Main;
    }

    pub fn show_auth_form(&mut self, form: AuthForm) {
        self.page.auth_form = form;
        self.clear_errors();
    }

    pub fn clear_errors(&mut self) {
        self.page.login.error = None;
        self.page.register.error = None;
    }

    pub fn set_login_error(&mut self, message: impl Into<String>) {
        self.page.login.error = Some(message.into());
    }

    pub fn set_register_error(&mut self, message: impl Into<String>) {
        self.page.register.error = Some(message.into());
    }

    /// Drops the user and everything shown for them; only the date label survives.
    pub fn sign_out(&mut self) {
        self.current_user = None;
        self.editing_todo_id = None;
        self.page = Page {
            current_date: std::mem::take(&mut self.page.current_date),
            ..Page::default()
        };
        self.show_auth_screen();
    }

    pub fn activate_section(&mut self, section: Section) {
        self.page.section = section;
    }

    /// Replaces the rendered list. A re-render ends any in-progress edit.
    pub fn render_tasks(&mut self, tasks: Vec<Task>) {
        self.page.empty_state = tasks.is_empty();
        self.page.todos = tasks;
        self.end_edit();
    }

    /// Opens the inline editor on a rendered row. Returns false when no such row exists.
    pub fn begin_edit(&mut self, id: TaskId, text: &str) -> bool {
        if !self.page.todos.iter().any(|task| task.id == id) {
            return false;
        }
        self.editing_todo_id = Some(id);
        self.page.edit_text = text.to_string();
        true
    }

    pub fn end_edit(&mut self) {
        self.editing_todo_id = None;
        self.page.edit_text.clear();
    }

    /// Updates the header bar and the detail tiles together.
    pub fn apply_daily_stats(&mut self, stats: &DailyStats) {
        self.page.header_progress = ProgressHeader {
            width: crate::stats::bar_width(stats.progress),
            text: format!("{}%", crate::stats::format_percent(stats.progress)),
            completed: stats.completed,
            total: stats.total,
        };
        self.page.detail_stats = StatTiles {
            total: stats.total,
            completed: stats.completed,
            pending: stats.pending,
        };
    }

    pub fn render_weekly(&mut self, days: Vec<DayStats>) {
        self.page.weekly = Some(days);
    }

    pub fn render_monthly(&mut self, months: Vec<MonthStats>) {
        self.page.monthly = Some(months);
    }
}
