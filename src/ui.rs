use crate::models::{Task, TaskId};
use crate::state::{AuthForm, ClientState, Screen, Section};
use crate::stats::{bar_width, render_monthly_container, render_weekly_grid};

pub const DELETE_PROMPT: &str = "Are you sure you want to delete this task?";

/// Escapes text for element content and quoted attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

/// Rows of today's list. `editing` opens the inline editor on one row.
pub fn render_task_list(tasks: &[Task], editing: Option<TaskId>, edit_text: &str) -> String {
    let mut html = String::new();
    for task in tasks {
        let is_editing = editing == Some(task.id);
        let text = escape_html(&task.text);
        let edit_value = if is_editing {
            escape_html(edit_text)
        } else {
            text.clone()
        };
        let hidden = r#" style="display: none;""#;
        let (view_style, edit_style) = if is_editing { (hidden, "") } else { ("", hidden) };

        html.push_str(&format!(
            r#"
        <li class="task-item{completed_class}" data-id="{id}">
          <form class="toggle-form" method="post" action="/todos/{id}/toggle">
            <input type="hidden" name="completed" value="{completed}">
            <button class="checkbox{checked_class}" type="submit" aria-label="Toggle task"></button>
          </form>
          <span class="task-text"{view_style}>{text}</span>
          <form id="edit-form-{id}" class="edit-form" method="post" action="/todos/{id}/save">
            <input type="text" class="edit-input{active_class}" name="text" value="{edit_value}"{autofocus}>
          </form>
          <div class="task-actions">
            <form method="post" action="/todos/{id}/edit"{view_style}>
              <input type="hidden" name="text" value="{text}">
              <button class="action-btn edit-btn" type="submit">Edit</button>
            </form>
            <form method="post" action="/todos/{id}/delete" onsubmit="return confirm('{prompt}');"{view_style}>
              <input type="hidden" name="confirmed" value="true">
              <button class="action-btn delete-btn" type="submit">Delete</button>
            </form>
            <button class="action-btn save-btn" type="submit" form="edit-form-{id}"{edit_style}>Save</button>
            <form method="post" action="/todos/{id}/cancel"{edit_style}>
              <button class="action-btn cancel-btn" type="submit">Cancel</button>
            </form>
          </div>
        </li>"#,
            id = task.id,
            completed = task.completed,
            completed_class = if task.completed { " completed" } else { "" },
            checked_class = if task.completed { " checked" } else { "" },
            active_class = if is_editing { " active" } else { "" },
            autofocus = if is_editing { " autofocus" } else { "" },
            prompt = escape_html(DELETE_PROMPT),
        ));
    }
    html
}

pub fn render_index(state: &ClientState) -> String {
    let page = &state.page;
    let shown = "flex";
    let (auth_display, main_display) = match page.screen {
        Screen::Checking => ("none", "none"),
        Screen::Auth => (shown, "none"),
        Screen::Main => ("none", shown),
    };
    let active = |on: bool| if on { " active" } else { "" };
    let show = |on: bool| if on { " show" } else { "" };
    let autofocus = |on: bool| if on { " autofocus" } else { "" };
    let section_active = |section: Section| active(page.section == section);

    let todo_list = render_task_list(&page.todos, state.editing_todo_id, &page.edit_text);
    let weekly = page
        .weekly
        .as_deref()
        .map(render_weekly_grid)
        .unwrap_or_default();
    let monthly = page
        .monthly
        .as_deref()
        .map(render_monthly_container)
        .unwrap_or_default();
    let login_error = page.login.error.as_deref().unwrap_or_default();
    let register_error = page.register.error.as_deref().unwrap_or_default();

    fill(
        INDEX_HTML,
        &[
            ("AUTH_DISPLAY", auth_display.to_string()),
            ("MAIN_DISPLAY", main_display.to_string()),
            ("LOGIN_ACTIVE", active(page.auth_form == AuthForm::Login).to_string()),
            ("REGISTER_ACTIVE", active(page.auth_form == AuthForm::Register).to_string()),
            ("LOGIN_USERNAME", escape_html(&page.login.username)),
            ("LOGIN_PASSWORD", escape_html(&page.login.password)),
            ("LOGIN_ERROR_SHOW", show(page.login.error.is_some()).to_string()),
            ("LOGIN_ERROR", escape_html(login_error)),
            ("REGISTER_USERNAME", escape_html(&page.register.username)),
            ("REGISTER_EMAIL", escape_html(&page.register.email)),
            ("REGISTER_PASSWORD", escape_html(&page.register.password)),
            ("REGISTER_ERROR_SHOW", show(page.register.error.is_some()).to_string()),
            ("REGISTER_ERROR", escape_html(register_error)),
            ("USER_NAME", escape_html(&page.user_name)),
            ("CURRENT_DATE", escape_html(&page.current_date)),
            ("NAV_TODAY", section_active(Section::Today).to_string()),
            ("NAV_WEEKLY", section_active(Section::Weekly).to_string()),
            ("NAV_MONTHLY", section_active(Section::Monthly).to_string()),
            ("PROGRESS_WIDTH", bar_width(page.header_progress.width).to_string()),
            ("PROGRESS_TEXT", escape_html(&page.header_progress.text)),
            ("COMPLETED_COUNT", page.header_progress.completed.to_string()),
            ("TOTAL_COUNT", page.header_progress.total.to_string()),
            ("STAT_TOTAL", page.detail_stats.total.to_string()),
            ("STAT_COMPLETED", page.detail_stats.completed.to_string()),
            ("STAT_PENDING", page.detail_stats.pending.to_string()),
            ("TODO_INPUT", escape_html(&page.todo_input)),
            ("TODO_AUTOFOCUS", autofocus(page.todo_input_focused).to_string()),
            ("TODO_LIST", todo_list),
            ("EMPTY_SHOW", show(page.empty_state).to_string()),
            ("WEEKLY_GRID", weekly),
            ("MONTHLY_CONTAINER", monthly),
        ],
    )
}

/// Substitutes `{{KEY}}` markers in one pass, so inserted values are never rescanned.
fn fill(template: &str, values: &[(&str, String)]) -> String {
    let mut out = String::with_capacity(template.len() * 2);
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find("}}") {
            Some(end) => {
                let key = &after[..end];
                match values.iter().find(|(name, _)| *name == key) {
                    Some((_, value)) => out.push_str(value),
                    None => out.push_str(&rest[start..start + 2 + end + 2]),
                }
                rest = &after[end + 2..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Daily Todo</title>
  <style>
    :root {
      --bg-1: #f8f3e6;
      --bg-2: #f5d3a7;
      --ink: #2b2a28;
      --accent: #ff6b4a;
      --accent-2: #2f4858;
      --card: rgba(255, 255, 255, 0.9);
      --shadow: 0 24px 60px rgba(47, 72, 88, 0.18);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: linear-gradient(135deg, var(--bg-1), #ffe9d4 60%, #f9f2e9 100%);
      color: var(--ink);
      font-family: "Space Grotesk", "Trebuchet MS", sans-serif;
      padding: 32px 18px 48px;
    }

    .screen {
      width: min(860px, 100%);
      margin: 0 auto;
      flex-direction: column;
      gap: 24px;
    }

    .card {
      background: var(--card);
      border-radius: 24px;
      box-shadow: var(--shadow);
      padding: 28px;
    }

    .auth-form, .content-section {
      display: none;
    }

    .auth-form.active, .content-section.active {
      display: grid;
      gap: 14px;
    }

    .error {
      display: none;
      color: #c63b2b;
    }

    .error.show {
      display: block;
    }

    header.app-header {
      display: flex;
      justify-content: space-between;
      align-items: center;
      gap: 16px;
    }

    nav {
      display: flex;
      gap: 6px;
    }

    .nav-btn {
      border: none;
      border-radius: 999px;
      padding: 8px 14px;
      font-weight: 600;
      background: transparent;
      color: #6b645d;
      cursor: pointer;
    }

    .nav-btn.active {
      background: white;
      color: var(--accent-2);
      box-shadow: 0 8px 16px rgba(47, 72, 88, 0.12);
    }

    .progress-bar, .day-bar, .month-bar-container {
      height: 10px;
      background: rgba(47, 72, 88, 0.1);
      border-radius: 999px;
      overflow: hidden;
    }

    .progress-fill, .day-bar-fill, .month-bar-fill {
      height: 100%;
      background: var(--accent);
    }

    .task-list {
      list-style: none;
      margin: 0;
      padding: 0;
      display: grid;
      gap: 10px;
    }

    .task-item {
      display: flex;
      align-items: center;
      gap: 12px;
      background: white;
      border-radius: 16px;
      padding: 12px 16px;
    }

    .task-item.completed .task-text {
      text-decoration: line-through;
      color: #8b857d;
    }

    .checkbox {
      width: 22px;
      height: 22px;
      border-radius: 6px;
      border: 2px solid var(--accent-2);
      background: white;
      cursor: pointer;
    }

    .checkbox.checked {
      background: var(--accent-2);
    }

    .task-text {
      flex: 1;
    }

    .edit-input {
      display: none;
    }

    .edit-input.active {
      display: inline-block;
    }

    .task-actions {
      display: flex;
      gap: 6px;
    }

    .empty-state {
      display: none;
      text-align: center;
      color: #6f6a65;
    }

    .empty-state.show {
      display: block;
    }

    .stat-tiles, .weekly-grid, .month-stats {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(120px, 1fr));
      gap: 12px;
    }

    .day-card, .month-card, .stat-tile {
      background: white;
      border-radius: 16px;
      padding: 14px;
      display: grid;
      gap: 6px;
    }
  </style>
</head>
<body>
  <div id="authScreen" class="screen" style="display: {{AUTH_DISPLAY}};">
    <div class="card">
      <h1>Daily Todo</h1>
      <form id="loginForm" class="auth-form{{LOGIN_ACTIVE}}" method="post" action="/auth/login">
        <h2>Sign in</h2>
        <input id="loginUsername" name="username" type="text" placeholder="Username" value="{{LOGIN_USERNAME}}">
        <input id="loginPassword" name="password" type="password" placeholder="Password" value="{{LOGIN_PASSWORD}}">
        <div id="loginError" class="error{{LOGIN_ERROR_SHOW}}">{{LOGIN_ERROR}}</div>
        <button type="submit">Login</button>
        <button type="submit" formaction="/auth/show/register">Create an account</button>
      </form>
      <form id="registerForm" class="auth-form{{REGISTER_ACTIVE}}" method="post" action="/auth/register">
        <h2>Create account</h2>
        <input id="registerUsername" name="username" type="text" placeholder="Username" value="{{REGISTER_USERNAME}}">
        <input id="registerEmail" name="email" type="email" placeholder="Email" value="{{REGISTER_EMAIL}}">
        <input id="registerPassword" name="password" type="password" placeholder="Password (6+ characters)" value="{{REGISTER_PASSWORD}}">
        <div id="registerError" class="error{{REGISTER_ERROR_SHOW}}">{{REGISTER_ERROR}}</div>
        <button type="submit">Register</button>
        <button type="submit" formaction="/auth/show/login">I already have an account</button>
      </form>
    </div>
  </div>

  <div id="mainApp" class="screen" style="display: {{MAIN_DISPLAY}};">
    <header class="app-header card">
      <div>
        <h1>Hello, <span id="userName">{{USER_NAME}}</span></h1>
        <p id="currentDate">{{CURRENT_DATE}}</p>
      </div>
      <form method="post" action="/auth/logout">
        <button type="submit">Logout</button>
      </form>
    </header>

    <nav class="card">
      <form method="post" action="/sections/today"><button class="nav-btn{{NAV_TODAY}}" type="submit">Today</button></form>
      <form method="post" action="/sections/weekly"><button class="nav-btn{{NAV_WEEKLY}}" type="submit">Weekly</button></form>
      <form method="post" action="/sections/monthly"><button class="nav-btn{{NAV_MONTHLY}}" type="submit">Monthly</button></form>
    </nav>

    <section id="todaySection" class="content-section card{{NAV_TODAY}}">
      <div class="progress-header">
        <span id="dailyProgressText">{{PROGRESS_TEXT}}</span>
        <span><span id="completedCount">{{COMPLETED_COUNT}}</span>/<span id="totalCount">{{TOTAL_COUNT}}</span> done</span>
        <div class="progress-bar"><div id="dailyProgressBar" class="progress-fill" style="width: {{PROGRESS_WIDTH}}%"></div></div>
      </div>

      <form id="addForm" method="post" action="/todos">
        <input id="todoInput" name="text" type="text" placeholder="What needs doing today?" value="{{TODO_INPUT}}"{{TODO_AUTOFOCUS}}>
        <button type="submit">Add</button>
      </form>

      <ul id="todoList" class="task-list">{{TODO_LIST}}
      </ul>
      <div id="emptyState" class="empty-state{{EMPTY_SHOW}}">
        <h3>No tasks for today</h3>
        <p>Add your first task above</p>
      </div>

      <div class="stat-tiles">
        <div class="stat-tile"><span id="statTotal">{{STAT_TOTAL}}</span><span>Total</span></div>
        <div class="stat-tile"><span id="statCompleted">{{STAT_COMPLETED}}</span><span>Completed</span></div>
        <div class="stat-tile"><span id="statPending">{{STAT_PENDING}}</span><span>Pending</span></div>
      </div>
    </section>

    <section id="weeklySection" class="content-section card{{NAV_WEEKLY}}">
      <h2>This week</h2>
      <div id="weeklyGrid" class="weekly-grid">{{WEEKLY_GRID}}
      </div>
    </section>

    <section id="monthlySection" class="content-section card{{NAV_MONTHLY}}">
      <h2>By month</h2>
      <div id="monthlyContainer">{{MONTHLY_CONTAINER}}
      </div>
    </section>
  </div>
</body>
</html>
"#;
