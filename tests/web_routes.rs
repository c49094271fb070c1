//! Request-level tests of the router against the in-memory store.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
    response::Response,
};
use http_body_util::BodyExt;
use mockable::DefaultClock;
use rstest::{fixture, rstest};
use teamboard::persistence::InMemoryStore;
use teamboard::web::{AppState, Store, WebConfig, csrf::CSRF_COOKIE, router, session::SESSION_COOKIE};
use teamboard::web::csrf::CSRF_HEADER;
use teamboard::worker::domain::{Requester, WorkerId};
use teamboard::worker::services::RegistrationRequest;
use tower::ServiceExt;

const PASSWORD: &str = "correct horse battery";
const CSRF: &str = "0123456789abcdef0123456789abcdef";

struct Harness {
    app: Router,
    state: Arc<AppState>,
}

impl Harness {
    async fn send(&self, request: Request<Body>) -> Response {
        self.app
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible")
    }

    async fn register(&self, username: &str) -> WorkerId {
        self.state
            .workers()
            .register(RegistrationRequest {
                username: username.to_owned(),
                email: format!("{username}@example.com"),
                first_name: "Olena".to_owned(),
                last_name: "Kovalenko".to_owned(),
                position: None,
                password1: PASSWORD.to_owned(),
                password2: PASSWORD.to_owned(),
            })
            .await
            .expect("worker registered")
            .id()
    }

    async fn superuser(&self, username: &str) -> WorkerId {
        self.state
            .workers()
            .ensure_superuser(username, &format!("{username}@example.com"), PASSWORD)
            .await
            .expect("superuser ensured")
            .id()
    }

    async fn sign_in(&self, username: &str) -> String {
        let body = format!("csrfmiddlewaretoken={CSRF}&username={username}&password=correct+horse+battery");
        let response = self.send(post_form("/login/", &body, None)).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        set_cookie(&response, SESSION_COOKIE).expect("session cookie issued")
    }
}

fn harness_with(config: WebConfig) -> Harness {
    let store: Arc<Store> = Arc::new(InMemoryStore::new());
    let state = Arc::new(AppState::new(store, Arc::new(DefaultClock), config).expect("templates load"));
    Harness {
        app: router(Arc::clone(&state)),
        state,
    }
}

#[fixture]
fn harness() -> Harness {
    harness_with(WebConfig {
        allowed_hosts: vec!["*".to_owned()],
        ..WebConfig::new("test-secret")
    })
}

fn get(uri: &str, session: Option<&str>) -> Request<Body> {
    let mut builder = Request::get(uri).header(header::HOST, "localhost");
    if let Some(token) = session {
        builder = builder.header(header::COOKIE, format!("{SESSION_COOKIE}={token}; {CSRF_COOKIE}={CSRF}"));
    }
    builder.body(Body::empty()).expect("request builds")
}

fn post_form(uri: &str, body: &str, session: Option<&str>) -> Request<Body> {
    let cookie = session.map_or_else(
        || format!("{CSRF_COOKIE}={CSRF}"),
        |token| format!("{SESSION_COOKIE}={token}; {CSRF_COOKIE}={CSRF}"),
    );
    Request::post(uri)
        .header(header::HOST, "localhost")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .header(header::COOKIE, cookie)
        .body(Body::from(body.to_owned()))
        .expect("request builds")
}

fn set_cookie(response: &Response, name: &str) -> Option<String> {
    let prefix = format!("{name}=");
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find_map(|value| {
            value
                .strip_prefix(prefix.as_str())
                .and_then(|rest| rest.split(';').next())
                .map(str::to_owned)
        })
}

fn location(response: &Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
}

async fn text(response: Response) -> String {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body readable")
        .to_bytes();
    String::from_utf8(bytes.to_vec()).expect("utf-8 body")
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn health_reports_ok(harness: Harness) {
    let response = harness.send(get("/health", None)).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(text(response).await.contains("\"status\":\"ok\""));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn anonymous_pages_redirect_to_sign_in(harness: Harness) {
    let response = harness.send(get("/tasks/?status=completed", None)).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login/?next=%2Ftasks%2F%3Fstatus%3Dcompleted");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn anonymous_ajax_calls_get_json_401(harness: Harness) {
    let request = Request::get("/notifications/poll/")
        .header(header::HOST, "localhost")
        .header("x-requested-with", "XMLHttpRequest")
        .body(Body::empty())
        .expect("request builds");

    let response = harness.send(request).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(text(response).await.contains("\"success\":false"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn sign_in_page_sets_csrf_cookie(harness: Harness) {
    let response = harness.send(get("/login/", None)).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(set_cookie(&response, CSRF_COOKIE).is_some());
    assert!(text(response).await.contains("name=\"csrfmiddlewaretoken\""));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn posts_without_matching_token_are_forbidden(harness: Harness) {
    let response = harness
        .send(post_form("/login/", "username=a&password=b&csrfmiddlewaretoken=wrong", None))
        .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test(flavor = "multi_thread")]
async fn unknown_hosts_are_rejected() {
    let harness = harness_with(WebConfig {
        allowed_hosts: vec!["teamboard.example".to_owned()],
        ..WebConfig::new("test-secret")
    });

    let response = harness.send(get("/health", None)).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn wrong_password_rerenders_the_form(harness: Harness) {
    harness.register("olena").await;
    let body = format!("csrfmiddlewaretoken={CSRF}&username=olena&password=nope-nope");

    let response = harness.send(post_form("/login/", &body, None)).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(text(response).await.contains("Please enter a correct username and password."));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn signed_in_worker_reaches_the_dashboard(harness: Harness) {
    harness.register("olena").await;
    let session = harness.sign_in("olena").await;

    let response = harness.send(get("/", Some(&session))).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(text(response).await.contains("Olena Kovalenko"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn created_task_is_shown_on_its_page(harness: Harness) {
    harness.register("olena").await;
    let session = harness.sign_in("olena").await;
    let body = format!("csrfmiddlewaretoken={CSRF}&name=Prepare+release+notes&description=&priority=High");

    let created = harness.send(post_form("/tasks/create/", &body, Some(&session))).await;

    assert_eq!(created.status(), StatusCode::SEE_OTHER);
    let target = location(&created).to_owned();
    assert!(target.starts_with("/tasks/"));
    let detail = harness.send(get(&target, Some(&session))).await;
    assert_eq!(detail.status(), StatusCode::OK);
    let page = text(detail).await;
    assert!(page.contains("Prepare release notes"));
    assert!(page.contains("Task created successfully!"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn blank_task_name_is_a_form_error(harness: Harness) {
    harness.register("olena").await;
    let session = harness.sign_in("olena").await;
    let body = format!("csrfmiddlewaretoken={CSRF}&name=+++&priority=Low");

    let response = harness.send(post_form("/tasks/create/", &body, Some(&session))).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(text(response).await.contains("form-error"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn poll_reports_an_empty_inbox(harness: Harness) {
    harness.register("olena").await;
    let session = harness.sign_in("olena").await;

    let response = harness.send(get("/notifications/poll/", Some(&session))).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = text(response).await;
    assert!(body.contains("\"unread_count\":0"));
    assert!(body.contains("\"notifications\":[]"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn sign_out_ends_the_session(harness: Harness) {
    harness.register("olena").await;
    let session = harness.sign_in("olena").await;
    let body = format!("csrfmiddlewaretoken={CSRF}");

    let response = harness.send(post_form("/logout/", &body, Some(&session))).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let after = harness.send(get("/tasks/", Some(&session))).await;
    assert_eq!(after.status(), StatusCode::SEE_OTHER);
    assert!(location(&after).starts_with("/login/"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn staff_consoles_refuse_regular_workers(harness: Harness) {
    harness.register("olena").await;
    let session = harness.sign_in("olena").await;

    let response = harness.send(get("/admin/task-types/", Some(&session))).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unknown_paths_are_404(harness: Harness) {
    let response = harness.send(get("/no-such-page/", None)).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn malformed_task_ids_render_the_404_page(harness: Harness) {
    harness.register("olena").await;
    let session = harness.sign_in("olena").await;

    let response = harness.send(get("/tasks/not-a-uuid/", Some(&session))).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(text(response).await.contains("Page not found"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn malformed_ids_in_ajax_calls_get_json_404(harness: Harness) {
    harness.register("olena").await;
    let session = harness.sign_in("olena").await;
    let request = Request::post("/notifications/garbage/read/")
        .header(header::HOST, "localhost")
        .header(header::COOKIE, format!("{SESSION_COOKIE}={session}; {CSRF_COOKIE}={CSRF}"))
        .header("x-requested-with", "XMLHttpRequest")
        .header(CSRF_HEADER, CSRF)
        .body(Body::empty())
        .expect("request builds");

    let response = harness.send(request).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = text(response).await;
    assert!(body.contains("\"success\":false"));
    assert!(body.contains("\"error\":\"page not found\""));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn audit_console_filters_by_type_and_text(harness: Harness) {
    harness.superuser("root").await;
    let session = harness.sign_in("root").await;
    for name in ["Prepare+release+notes", "Rotate+keys"] {
        let body = format!("csrfmiddlewaretoken={CSRF}&name={name}&description=&priority=Low");
        let created = harness.send(post_form("/tasks/create/", &body, Some(&session))).await;
        assert_eq!(created.status(), StatusCode::SEE_OTHER);
    }

    let filtered = harness
        .send(get("/admin/activity/?kind=created&search=RELEASE", Some(&session)))
        .await;
    assert_eq!(filtered.status(), StatusCode::OK);
    let page = text(filtered).await;
    assert!(page.contains("Prepare release notes"));
    assert!(!page.contains("Rotate keys"));

    let deleted = harness
        .send(get("/admin/activity/?kind=deleted", Some(&session)))
        .await;
    assert!(text(deleted).await.contains("No activity matches."));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn notification_console_names_deactivated_recipients(harness: Harness) {
    let root = harness.superuser("root").await;
    let taras = harness.register("taras").await;
    let session = harness.sign_in("root").await;
    let body = format!(
        "csrfmiddlewaretoken={CSRF}&name=Audit+invoices&description=&priority=High&assignees={taras}"
    );
    let created = harness.send(post_form("/tasks/create/", &body, Some(&session))).await;
    assert_eq!(created.status(), StatusCode::SEE_OTHER);
    harness
        .state
        .workers()
        .set_active(&Requester::new(root, true, true), taras, false)
        .await
        .expect("worker deactivated");

    let listed = harness
        .send(get("/admin/notifications/?kind=task_assigned&search=TARAS", Some(&session)))
        .await;
    assert_eq!(listed.status(), StatusCode::OK);
    let page = text(listed).await;
    assert!(page.contains("Olena Kovalenko"));
    assert!(!page.contains(&taras.to_string()));
    assert_eq!(page.matches("name=\"ids\"").count(), 1);

    let other_kind = harness
        .send(get("/admin/notifications/?kind=task_completed", Some(&session)))
        .await;
    assert!(text(other_kind).await.contains("No notifications match."));
}
