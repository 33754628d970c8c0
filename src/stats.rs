use crate::models::{DayStats, MonthStats};
use crate::ui::escape_html;

pub const NO_MONTHLY_DATA: &str = "No monthly data yet!";

/// Prints a percent the way the backend sends it: `50`, `33.3`.
pub fn format_percent(progress: f64) -> String {
    if progress.is_finite() {
        progress.to_string()
    } else {
        "0".to_string()
    }
}

/// Width for a progress bar fill, clamped to the bar.
pub fn bar_width(progress: f64) -> f64 {
    if progress.is_finite() {
        progress.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

/// One card per returned day, in order.
pub fn render_weekly_grid(days: &[DayStats]) -> String {
    let mut html = String::new();
    for day in days {
        html.push_str(&format!(
            r#"
        <div class="day-card">
          <div class="day-name">{name}</div>
          <div class="day-progress">{percent}%</div>
          <div class="day-tasks">{completed}/{total} tasks</div>
          <div class="day-bar">
            <div class="day-bar-fill" style="width: {width}%"></div>
          </div>
        </div>"#,
            name = escape_html(&day.day),
            percent = format_percent(day.progress),
            completed = day.completed,
            total = day.total,
            width = bar_width(day.progress),
        ));
    }
    html
}

pub fn render_monthly_container(months: &[MonthStats]) -> String {
    if months.is_empty() {
        return format!(
            r#"
        <div class="empty-state show">
          <div class="empty-icon">&#128202;</div>
          <h3>{NO_MONTHLY_DATA}</h3>
          <p>Start adding tasks to see your monthly progress</p>
        </div>"#
        );
    }

    let mut html = String::new();
    for month in months {
        html.push_str(&format!(
            r#"
        <div class="month-card">
          <div class="month-header">
            <div class="month-name">{name}</div>
            <div class="month-progress-text">{percent}%</div>
          </div>
          <div class="month-bar-container">
            <div class="month-bar-fill" style="width: {width}%"></div>
          </div>
          <div class="month-stats">
            <div class="month-stat">
              <span class="month-stat-value">{total}</span>
              <span class="month-stat-label">Total</span>
            </div>
            <div class="month-stat">
              <span class="month-stat-value">{completed}</span>
              <span class="month-stat-label">Completed</span>
            </div>
            <div class="month-stat">
              <span class="month-stat-value">{pending}</span>
              <span class="month-stat-label">Pending</span>
            </div>
          </div>
        </div>"#,
            name = escape_html(&month.month_name),
            percent = format_percent(month.progress),
            width = bar_width(month.progress),
            total = month.total,
            completed = month.completed,
            pending = month.pending,
        ));
    }
    html
}
