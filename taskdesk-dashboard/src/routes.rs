/// Dashboard request handlers
///
/// Each handler performs at most one API call (plus the task listing for
/// the re-rendered page) and answers with a complete HTML page.

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, HeaderValue},
    response::{Html, IntoResponse, Response},
    Form,
};
use serde::Deserialize;
use taskdesk_shared::models::task::TaskStatus;
use tracing::{info, warn};

use crate::{
    app::DashboardState,
    client::ClientError,
    render::{dashboard_page, login_page, Flash, StatusFilter},
    session::{clear_cookie_headers, Session},
};

#[derive(Debug, Deserialize)]
pub struct IndexQuery {
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct SignupForm {
    pub username: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Deserialize)]
pub struct NewTaskForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Status filter active when the form was submitted
    pub filter: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EditTaskForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: TaskStatus,
    pub filter: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteTaskForm {
    pub filter: Option<String>,
}

/// GET /
pub async fn index(
    State(state): State<DashboardState>,
    headers: HeaderMap,
    Query(query): Query<IndexQuery>,
) -> Response {
    match Session::from_headers(&headers) {
        Some(session) => {
            let filter = StatusFilter::from_query(query.status.as_deref());
            dashboard(&state, &session, filter, None, Vec::new()).await
        }
        None => page(login_page(None), Vec::new()),
    }
}

/// POST /login
pub async fn login(State(state): State<DashboardState>, Form(form): Form<LoginForm>) -> Response {
    match state.client.login(&form.username, &form.password).await {
        Ok(token) => {
            info!(username = %form.username, "Dashboard login");
            let session = Session {
                token: token.access_token,
                username: form.username,
            };
            let cookies = session.set_cookie_headers(state.secure_cookies());
            dashboard(&state, &session, StatusFilter::All, None, cookies).await
        }
        Err(ClientError::Transport(e)) => {
            warn!(error = %e, "API unreachable during login");
            page(
                login_page(Some(&Flash::error(format!("Error: {}", e)))),
                Vec::new(),
            )
        }
        Err(_) => page(
            login_page(Some(&Flash::error("Invalid username or password"))),
            Vec::new(),
        ),
    }
}

/// POST /signup
pub async fn signup(State(state): State<DashboardState>, Form(form): Form<SignupForm>) -> Response {
    if form.password != form.confirm_password {
        return page(
            login_page(Some(&Flash::error("Passwords don't match"))),
            Vec::new(),
        );
    }

    let flash = match state.client.signup(&form.username, &form.password).await {
        Ok(user) => {
            info!(username = %user.username, "Account created from dashboard");
            Flash::success("Account created successfully! Please log in.")
        }
        Err(e) => Flash::error(format!("Error: {}", e.detail())),
    };

    page(login_page(Some(&flash)), Vec::new())
}

/// POST /logout
pub async fn logout(State(state): State<DashboardState>) -> Response {
    page(
        login_page(Some(&Flash::info("You have been logged out."))),
        clear_cookie_headers(state.secure_cookies()),
    )
}

/// POST /tasks
pub async fn create_task(
    State(state): State<DashboardState>,
    headers: HeaderMap,
    Form(form): Form<NewTaskForm>,
) -> Response {
    let Some(session) = Session::from_headers(&headers) else {
        return page(login_page(None), Vec::new());
    };

    let filter = StatusFilter::from_query(form.filter.as_deref());

    let title = form.title.trim();
    if title.is_empty() {
        let flash = Flash::error("Title is required");
        return dashboard(&state, &session, filter, Some(flash), Vec::new()).await;
    }

    let result = state
        .client
        .create_task(&session.token, title, non_empty(&form.description))
        .await;

    let flash = match result {
        Ok(_) => Flash::success("Task created successfully!"),
        Err(ClientError::Unauthorized(_)) => return session_expired(&state),
        Err(e) => Flash::error(format!("Error creating task: {}", e.detail())),
    };

    dashboard(&state, &session, filter, Some(flash), Vec::new()).await
}

/// POST /tasks/:task_id/update
pub async fn update_task(
    State(state): State<DashboardState>,
    Path(task_id): Path<i64>,
    headers: HeaderMap,
    Form(form): Form<EditTaskForm>,
) -> Response {
    let Some(session) = Session::from_headers(&headers) else {
        return page(login_page(None), Vec::new());
    };

    let result = state
        .client
        .update_task(
            &session.token,
            task_id,
            form.title.trim(),
            non_empty(&form.description),
            form.status,
        )
        .await;

    let flash = match result {
        Ok(_) => Flash::success("Task updated successfully!"),
        Err(ClientError::Unauthorized(_)) => return session_expired(&state),
        Err(e) => Flash::error(format!("Error updating task: {}", e.detail())),
    };

    let filter = StatusFilter::from_query(form.filter.as_deref());
    dashboard(&state, &session, filter, Some(flash), Vec::new()).await
}

/// POST /tasks/:task_id/delete
pub async fn delete_task(
    State(state): State<DashboardState>,
    Path(task_id): Path<i64>,
    headers: HeaderMap,
    Form(form): Form<DeleteTaskForm>,
) -> Response {
    let Some(session) = Session::from_headers(&headers) else {
        return page(login_page(None), Vec::new());
    };

    let flash = match state.client.delete_task(&session.token, task_id).await {
        Ok(()) => Flash::success("Task deleted successfully!"),
        Err(ClientError::Unauthorized(_)) => return session_expired(&state),
        Err(e) => Flash::error(format!("Error deleting task: {}", e.detail())),
    };

    let filter = StatusFilter::from_query(form.filter.as_deref());
    dashboard(&state, &session, filter, Some(flash), Vec::new()).await
}

/// Fetches the task list and renders the dashboard
///
/// A 401 while listing means the token expired; the session is dropped.
async fn dashboard(
    state: &DashboardState,
    session: &Session,
    filter: StatusFilter,
    flash: Option<Flash>,
    cookies: Vec<HeaderValue>,
) -> Response {
    let tasks = match state.client.list_tasks(&session.token).await {
        Ok(tasks) => Some(tasks),
        Err(ClientError::Unauthorized(_)) => return session_expired(state),
        Err(e) => {
            warn!(error = %e, username = %session.username, "Failed to fetch tasks");
            None
        }
    };

    page(
        dashboard_page(&session.username, tasks.as_deref(), filter, flash.as_ref()),
        cookies,
    )
}

fn session_expired(state: &DashboardState) -> Response {
    page(
        login_page(Some(&Flash::info("Your session has expired. Please log in again."))),
        clear_cookie_headers(state.secure_cookies()),
    )
}

fn page(body: String, cookies: Vec<HeaderValue>) -> Response {
    let mut response = Html(body).into_response();
    let headers = response.headers_mut();
    for cookie in cookies {
        headers.append(header::SET_COOKIE, cookie);
    }
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}

fn non_empty(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty(""), None);
        assert_eq!(non_empty("   "), None);
        assert_eq!(non_empty(" notes "), Some("notes"));
    }

    #[test]
    fn test_page_sets_cookies_and_disables_caching() {
        let cookies = vec![
            HeaderValue::from_static("a=1; Path=/"),
            HeaderValue::from_static("b=2; Path=/"),
        ];
        let response = page("<p>hi</p>".to_string(), cookies);

        assert_eq!(response.headers().get_all(header::SET_COOKIE).iter().count(), 2);
        assert_eq!(response.headers()[header::CACHE_CONTROL], "no-store");
        assert!(response.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/html"));
    }
}
