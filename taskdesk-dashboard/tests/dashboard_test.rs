//! End-to-end tests for the dashboard
//!
//! Each test starts a real API server on an ephemeral port with a fresh
//! in-memory database, points the dashboard at it and drives the HTML
//! forms in-process.

use axum::body::Body;
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use axum::Router;
use std::collections::HashMap;
use taskdesk_api::app::AppState;
use taskdesk_dashboard::app::{build_router, DashboardState};
use taskdesk_dashboard::config::Config;
use taskdesk_shared::db::{connect, pool::DatabaseConfig};
use tower::ServiceExt;

const PASSWORD: &str = "s3cret-pass";

struct Page {
    status: StatusCode,
    headers: HeaderMap,
    html: String,
}

impl Page {
    /// `Cookie` header value built from this response's `Set-Cookie` headers
    fn cookie_header(&self) -> String {
        self.headers
            .get_all(header::SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap().split(';').next().unwrap().to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }

    fn first_task_id(&self) -> i64 {
        let start = self.html.find("action=\"/tasks/").expect("no task on page") + 15;
        let digits: String = self.html[start..]
            .chars()
            .take_while(|c| c.is_ascii_digit())
            .collect();
        digits.parse().unwrap()
    }
}

struct Harness {
    dashboard: Router,
}

impl Harness {
    async fn start() -> Self {
        let vars: HashMap<&str, &str> = [
            ("JWT_SECRET", "dashboard-test-secret-at-least-32-bytes"),
            ("DATABASE_URL", "sqlite::memory:"),
        ]
        .into_iter()
        .collect();
        let api_config =
            taskdesk_api::config::Config::from_vars(|key| vars.get(key).map(|v| v.to_string()))
                .unwrap();

        let db = connect(DatabaseConfig::in_memory()).await.unwrap();
        let api = taskdesk_api::app::build_router(AppState::new(db, api_config));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, api).await.unwrap();
        });

        let api_url = format!("http://{}", addr);
        let config = Config::from_vars(|key| (key == "API_URL").then(|| api_url.clone())).unwrap();

        Harness {
            dashboard: build_router(DashboardState::new(config).unwrap()),
        }
    }

    async fn request(&self, method: Method, uri: &str, cookie: Option<&str>, form: &str) -> Page {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = builder
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(form.to_string()))
            .unwrap();

        let response = self.dashboard.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        Page {
            status,
            headers,
            html: String::from_utf8(bytes.to_vec()).unwrap(),
        }
    }

    async fn get(&self, uri: &str, cookie: Option<&str>) -> Page {
        self.request(Method::GET, uri, cookie, "").await
    }

    async fn post(&self, uri: &str, cookie: Option<&str>, form: &str) -> Page {
        self.request(Method::POST, uri, cookie, form).await
    }

    async fn signup(&self, username: &str) -> Page {
        let form = format!(
            "username={}&password={}&confirm_password={}",
            username, PASSWORD, PASSWORD
        );
        self.post("/signup", None, &form).await
    }

    /// Signs up and logs in, returning the session cookie header
    async fn logged_in(&self, username: &str) -> String {
        self.signup(username).await;
        let page = self
            .post("/login", None, &format!("username={}&password={}", username, PASSWORD))
            .await;
        assert!(page.html.contains(&format!("Welcome, {}!", username)));
        page.cookie_header()
    }
}

#[tokio::test]
async fn test_login_page_without_session() {
    let harness = Harness::start().await;

    let page = harness.get("/", None).await;

    assert_eq!(page.status, StatusCode::OK);
    assert!(page.html.contains("<title>Task Manager</title>"));
    assert!(page.html.contains(r#"action="/login""#));
    assert!(page.html.contains(r#"action="/signup""#));
    assert!(page.headers.contains_key("content-security-policy"));
    assert_eq!(page.headers["x-frame-options"], "DENY");
}

#[tokio::test]
async fn test_signup_flow() {
    let harness = Harness::start().await;

    let page = harness
        .post(
            "/signup",
            None,
            "username=alice&password=one-password&confirm_password=other-password",
        )
        .await;
    assert!(page.html.contains("Passwords don&#x27;t match"));

    let page = harness.signup("alice").await;
    assert!(page.html.contains("Account created successfully! Please log in."));

    let page = harness.signup("alice").await;
    assert!(page.html.contains("Error: Username already registered"));
}

#[tokio::test]
async fn test_login_sets_session_cookies() {
    let harness = Harness::start().await;
    harness.signup("alice").await;

    let page = harness
        .post("/login", None, "username=alice&password=wrong-password")
        .await;
    assert!(page.html.contains("Invalid username or password"));
    assert!(page.headers.get(header::SET_COOKIE).is_none());

    let page = harness
        .post("/login", None, &format!("username=alice&password={}", PASSWORD))
        .await;
    assert_eq!(page.headers.get_all(header::SET_COOKIE).iter().count(), 2);
    assert!(page.html.contains("Welcome, alice!"));
    assert!(page
        .html
        .contains("No tasks found. Create a new task to get started!"));

    let page = harness.get("/", Some(&page.cookie_header())).await;
    assert!(page.html.contains("Welcome, alice!"));
}

#[tokio::test]
async fn test_task_lifecycle() {
    let harness = Harness::start().await;
    let cookie = harness.logged_in("alice").await;

    let page = harness.post("/tasks", Some(&cookie), "title=++&description=").await;
    assert!(page.html.contains("Title is required"));

    let page = harness
        .post("/tasks", Some(&cookie), "title=Write+report&description=Quarterly")
        .await;
    assert!(page.html.contains("Task created successfully!"));
    assert!(page.html.contains("Write report (pending)"));
    assert!(page.html.contains("Quarterly</textarea>"));

    let id = page.first_task_id();
    let page = harness
        .post(
            &format!("/tasks/{}/update", id),
            Some(&cookie),
            "title=Write+final+report&description=&status=done",
        )
        .await;
    assert!(page.html.contains("Task updated successfully!"));
    assert!(page.html.contains("Write final report (done)"));

    let page = harness.get("/?status=pending", Some(&cookie)).await;
    assert!(!page.html.contains("Write final report (done)"));
    assert!(page.html.contains("No tasks found"));

    let page = harness.get("/?status=done", Some(&cookie)).await;
    assert!(page.html.contains("Write final report (done)"));

    let page = harness
        .post(&format!("/tasks/{}/delete", id), Some(&cookie), "")
        .await;
    assert!(page.html.contains("Task deleted successfully!"));
    assert!(page.html.contains("No tasks found"));

    let page = harness
        .post(&format!("/tasks/{}/delete", id), Some(&cookie), "")
        .await;
    assert!(page.html.contains("Error deleting task: 404"));
}

#[tokio::test]
async fn test_status_filter_survives_form_posts() {
    let harness = Harness::start().await;
    let cookie = harness.logged_in("alice").await;

    let page = harness
        .post("/tasks", Some(&cookie), "title=Ship+it&description=&filter=done")
        .await;
    assert!(page.html.contains("Task created successfully!"));
    assert!(page
        .html
        .contains(r#"<option value="done" selected>done</option>"#));
    assert!(!page.html.contains("Ship it (pending)"));

    let page = harness.get("/?status=pending", Some(&cookie)).await;
    let id = page.first_task_id();

    let page = harness
        .post(
            &format!("/tasks/{}/update", id),
            Some(&cookie),
            "title=Ship+it&description=&status=done&filter=pending",
        )
        .await;
    assert!(page.html.contains("Task updated successfully!"));
    assert!(page
        .html
        .contains(r#"<option value="pending" selected>pending</option>"#));
    assert!(page.html.contains("No tasks found"));

    let page = harness
        .post(&format!("/tasks/{}/delete", id), Some(&cookie), "filter=done")
        .await;
    assert!(page.html.contains("Task deleted successfully!"));
    assert!(page
        .html
        .contains(r#"<input type="hidden" name="filter" value="done">"#));
}

#[tokio::test]
async fn test_other_users_task_is_rejected() {
    let harness = Harness::start().await;
    let alice = harness.logged_in("alice").await;
    let bob = harness.logged_in("bob").await;

    let page = harness
        .post("/tasks", Some(&alice), "title=Private&description=")
        .await;
    let id = page.first_task_id();

    let page = harness.get("/", Some(&bob)).await;
    assert!(!page.html.contains("Private (pending)"));

    let page = harness
        .post(
            &format!("/tasks/{}/update", id),
            Some(&bob),
            "title=Hijacked&description=&status=done",
        )
        .await;
    assert!(page
        .html
        .contains("Error updating task: Not authorized to update this task"));

    let page = harness.get("/", Some(&alice)).await;
    assert!(page.html.contains("Private (pending)"));
}

#[tokio::test]
async fn test_invalid_token_clears_session() {
    let harness = Harness::start().await;

    let page = harness
        .get("/", Some("taskdesk_token=not-a-jwt; taskdesk_user=mallory"))
        .await;

    assert!(page.html.contains(r#"action="/login""#));
    assert!(!page.html.contains("Welcome"));
    let cleared: Vec<_> = page.headers.get_all(header::SET_COOKIE).iter().collect();
    assert_eq!(cleared.len(), 2);
    assert!(cleared
        .iter()
        .all(|v| v.to_str().unwrap().contains("Max-Age=0")));
}

#[tokio::test]
async fn test_logout_clears_session() {
    let harness = Harness::start().await;
    let cookie = harness.logged_in("alice").await;

    let page = harness.post("/logout", Some(&cookie), "").await;

    assert!(page.html.contains(r#"action="/login""#));
    assert!(page
        .headers
        .get_all(header::SET_COOKIE)
        .iter()
        .all(|v| v.to_str().unwrap().contains("Max-Age=0")));
}
