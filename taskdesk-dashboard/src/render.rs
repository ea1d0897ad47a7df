/// HTML rendering for the dashboard
///
/// Pages are built as plain strings. Every value that came from a user or
/// from the API goes through [`escape`] before it reaches the markup.

use std::fmt::Write;

use taskdesk_shared::models::task::{Task, TaskStatus};

const PAGE_TITLE: &str = "Task Manager";

const STYLE: &str = "\
body { font-family: system-ui, sans-serif; max-width: 860px; margin: 2rem auto; padding: 0 1rem; color: #1f2933; }
h1 { margin-bottom: 0.25rem; }
header { display: flex; justify-content: space-between; align-items: center; }
section { border: 1px solid #d9e2ec; border-radius: 6px; padding: 1rem; margin: 1rem 0; }
label { display: block; margin: 0.5rem 0 0.2rem; font-weight: 600; }
input, textarea, select { width: 100%; box-sizing: border-box; padding: 0.4rem; }
button { margin-top: 0.6rem; padding: 0.4rem 0.9rem; cursor: pointer; }
.columns { display: flex; gap: 1rem; }
.columns > section { flex: 1; }
.flash { padding: 0.6rem 0.9rem; border-radius: 4px; margin: 1rem 0; }
.flash.success { background: #e3f9e5; color: #05400a; }
.flash.error { background: #ffe3e3; color: #610404; }
.flash.info { background: #e6f6ff; color: #03449e; }
.actions { display: flex; gap: 0.5rem; }
.danger { background: #ffe3e3; }
";

/// One-shot message shown above the page content
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flash {
    Success(String),
    Error(String),
    Info(String),
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Flash::Success(message.into())
    }

    pub fn error(message: impl Into<String>) -> Self {
        Flash::Error(message.into())
    }

    pub fn info(message: impl Into<String>) -> Self {
        Flash::Info(message.into())
    }

    fn parts(&self) -> (&'static str, &str) {
        match self {
            Flash::Success(message) => ("success", message),
            Flash::Error(message) => ("error", message),
            Flash::Info(message) => ("info", message),
        }
    }
}

/// Status filter selected on the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(TaskStatus),
}

impl StatusFilter {
    /// Parses the `status` query value; anything unknown means `All`
    pub fn from_query(raw: Option<&str>) -> Self {
        raw.and_then(|value| value.parse().ok())
            .map(StatusFilter::Only)
            .unwrap_or_default()
    }

    pub fn matches(&self, task: &Task) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(status) => task.status == *status,
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            StatusFilter::All => "All",
            StatusFilter::Only(status) => status.as_str(),
        }
    }
}

/// Escapes text for use in element content and quoted attributes
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// Login and sign-up forms side by side
pub fn login_page(flash: Option<&Flash>) -> String {
    let body = format!(
        r#"<h1>{title}</h1>
{flash}
<div class="columns">
<section>
<h2>Login</h2>
<form method="post" action="/login">
<label for="login-username">Username</label>
<input id="login-username" name="username" required>
<label for="login-password">Password</label>
<input id="login-password" name="password" type="password" required>
<button type="submit">Login</button>
</form>
</section>
<section>
<h2>Sign Up</h2>
<form method="post" action="/signup">
<label for="signup-username">Username</label>
<input id="signup-username" name="username" required>
<label for="signup-password">Password</label>
<input id="signup-password" name="password" type="password" required>
<label for="signup-confirm">Confirm Password</label>
<input id="signup-confirm" name="confirm_password" type="password" required>
<button type="submit">Sign Up</button>
</form>
</section>
</div>"#,
        title = PAGE_TITLE,
        flash = flash_html(flash),
    );

    layout(&body)
}

/// Task dashboard for a logged-in user
///
/// `tasks` is `None` when the list could not be fetched.
pub fn dashboard_page(
    username: &str,
    tasks: Option<&[Task]>,
    filter: StatusFilter,
    flash: Option<&Flash>,
) -> String {
    let mut body = format!(
        r#"<header>
<h1>{title}</h1>
<form method="post" action="/logout"><button type="submit">Logout</button></form>
</header>
<p>Welcome, {username}!</p>
{flash}
<section>
<h2>Create New Task</h2>
<form method="post" action="/tasks">
{filter_field}
<label for="new-title">Title</label>
<input id="new-title" name="title" maxlength="200">
<label for="new-description">Description</label>
<textarea id="new-description" name="description"></textarea>
<button type="submit">Create Task</button>
</form>
</section>
<section>
<h2>Your Tasks</h2>
{filter}
"#,
        title = PAGE_TITLE,
        username = escape(username),
        flash = flash_html(flash),
        filter_field = filter_field(filter),
        filter = filter_form(filter),
    );

    match tasks {
        None => body.push_str(r#"<p class="flash error">Failed to fetch tasks</p>"#),
        Some(tasks) => {
            let visible: Vec<&Task> = tasks.iter().filter(|task| filter.matches(task)).collect();
            if visible.is_empty() {
                body.push_str("<p>No tasks found. Create a new task to get started!</p>");
            }
            for task in visible {
                body.push_str(&task_card(task, filter));
            }
        }
    }

    body.push_str("</section>");
    layout(&body)
}

fn layout(body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<style>{style}</style>
</head>
<body>
{body}
</body>
</html>
"#,
        title = PAGE_TITLE,
        style = STYLE,
        body = body,
    )
}

fn flash_html(flash: Option<&Flash>) -> String {
    match flash {
        Some(flash) => {
            let (kind, message) = flash.parts();
            format!(r#"<div class="flash {}">{}</div>"#, kind, escape(message))
        }
        None => String::new(),
    }
}

fn filter_form(selected: StatusFilter) -> String {
    let mut options = String::new();
    let choices = std::iter::once(StatusFilter::All)
        .chain(TaskStatus::ALL.into_iter().map(StatusFilter::Only));

    for choice in choices {
        let _ = write!(
            options,
            r#"<option value="{value}"{selected}>{value}</option>"#,
            value = choice.as_str(),
            selected = if choice == selected { " selected" } else { "" },
        );
    }

    format!(
        r#"<form method="get" action="/">
<label for="status-filter">Filter by status</label>
<select id="status-filter" name="status">{}</select>
<button type="submit">Apply</button>
</form>"#,
        options
    )
}

/// Hidden input that carries the active filter through a form post
fn filter_field(filter: StatusFilter) -> String {
    format!(
        r#"<input type="hidden" name="filter" value="{}">"#,
        filter.as_str()
    )
}

fn task_card(task: &Task, filter: StatusFilter) -> String {
    let mut status_options = String::new();
    for status in TaskStatus::ALL {
        let _ = write!(
            status_options,
            r#"<option value="{value}"{selected}>{value}</option>"#,
            value = status.as_str(),
            selected = if status == task.status { " selected" } else { "" },
        );
    }

    format!(
        r#"<section class="task">
<h3>{title} ({status})</h3>
<form method="post" action="/tasks/{id}/update">
{filter_field}
<label for="title-{id}">Title</label>
<input id="title-{id}" name="title" value="{title}" maxlength="200">
<label for="description-{id}">Description</label>
<textarea id="description-{id}" name="description">{description}</textarea>
<label for="status-{id}">Status</label>
<select id="status-{id}" name="status">{options}</select>
<div class="actions">
<button type="submit">Update</button>
<button type="submit" class="danger" formaction="/tasks/{id}/delete">Delete</button>
</div>
</form>
</section>
"#,
        id = task.id,
        title = escape(&task.title),
        status = task.status,
        description = escape(task.description.as_deref().unwrap_or("")),
        options = status_options,
        filter_field = filter_field(filter),
    )
}
