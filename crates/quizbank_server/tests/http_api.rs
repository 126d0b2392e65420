use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    response::Response,
    Router,
};
use quizbank_core::db::open_db;
use quizbank_core::QuizResponse;
use quizbank_server::{router, AppState};
use serde_json::{json, Value};
use std::path::PathBuf;
use tempfile::TempDir;
use tower::ServiceExt;

struct TestApp {
    router: Router,
    db_path: PathBuf,
    _dir: TempDir,
}

impl TestApp {
    fn new() -> Self {
        let dir = tempfile::tempdir().expect("temp dir should be created");
        let db_path = dir.path().join("quizbank.sqlite3");
        let router = router(AppState::new(db_path.clone()));
        Self {
            router,
            db_path,
            _dir: dir,
        }
    }

    async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> Response {
        let mut req = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(value) => {
                req = req.header(header::CONTENT_TYPE, "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };

        self.router
            .clone()
            .oneshot(req.body(body).expect("request build should succeed"))
            .await
            .expect("router should respond")
    }

    async fn create(&self, body: Value) -> QuizResponse {
        let resp = self.send(Method::POST, "/quizzes", Some(body)).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        serde_json::from_value(read_json(resp).await).expect("body should be a quiz")
    }
}

async fn read_json(resp: Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("body should be readable");
    serde_json::from_slice(&bytes).expect("body should be JSON")
}

fn sample_body() -> Value {
    json!({
        "question": "Which language has a borrow checker?",
        "options": ["Rust", "Python", "Ruby"],
        "correctAnswer": 0,
        "category": "Programming",
        "difficulty": "Easy"
    })
}

#[tokio::test]
async fn health_probe_answers_pong() {
    let app = TestApp::new();

    let resp = app.send(Method::GET, "/health", None).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"pong");
}

#[tokio::test]
async fn create_returns_201_with_location_and_camel_case_body() {
    let app = TestApp::new();

    let resp = app.send(Method::POST, "/quizzes", Some(sample_body())).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let location = resp
        .headers()
        .get(header::LOCATION)
        .expect("location header")
        .to_str()
        .unwrap()
        .to_string();
    let body = read_json(resp).await;

    let id = body["id"].as_str().expect("id is a string");
    assert_eq!(location, format!("/quizzes/{id}"));
    assert_eq!(body["correctAnswer"], 0);
    assert_eq!(body["difficulty"], "Easy");
    assert_eq!(body["options"], json!(["Rust", "Python", "Ruby"]));
    assert!(body["createdAt"].as_str().unwrap().ends_with('Z'));
    assert_eq!(body["createdAt"], body["updatedAt"]);
}

#[tokio::test]
async fn create_with_invalid_fields_returns_400_error_list() {
    let app = TestApp::new();
    let mut body = sample_body();
    body["question"] = json!("Hm?");
    body["difficulty"] = json!("easy");

    let resp = app.send(Method::POST, "/quizzes", Some(body)).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = read_json(resp).await;
    assert_eq!(
        body["errors"],
        json!([
            "Question must be between 5 and 500 characters",
            "Difficulty must be Easy, Medium, or Hard"
        ])
    );
}

#[tokio::test]
async fn create_with_answer_equal_to_option_count_returns_400() {
    let app = TestApp::new();
    let mut body = sample_body();
    body["correctAnswer"] = json!(3);

    let resp = app.send(Method::POST, "/quizzes", Some(body)).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_or_incomplete_json_returns_400() {
    let app = TestApp::new();

    let resp = app
        .send(Method::POST, "/quizzes", Some(json!({ "question": "Only a question?" })))
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = read_json(resp).await;
    assert_eq!(body["errors"].as_array().map(Vec::len), Some(1));

    let req = Request::builder()
        .method(Method::POST)
        .uri("/quizzes")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let resp = app.router.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn get_returns_created_quiz_or_404() {
    let app = TestApp::new();
    let created = app.create(sample_body()).await;

    let resp = app
        .send(Method::GET, &format!("/quizzes/{}", created.id), None)
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let loaded: QuizResponse = serde_json::from_value(read_json(resp).await).unwrap();
    assert_eq!(loaded, created);

    let resp = app.send(Method::GET, "/quizzes/missing", None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body = read_json(resp).await;
    assert_eq!(body["error"], "Quiz with ID missing not found");
}

#[tokio::test]
async fn put_applies_partial_update() {
    let app = TestApp::new();
    let created = app.create(sample_body()).await;

    let resp = app
        .send(
            Method::PUT,
            &format!("/quizzes/{}", created.id),
            Some(json!({ "difficulty": "Hard" })),
        )
        .await;

    assert_eq!(resp.status(), StatusCode::OK);
    let updated: QuizResponse = serde_json::from_value(read_json(resp).await).unwrap();
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.question, created.question);
    assert_eq!(updated.options, created.options);
    assert_eq!(updated.correct_answer, created.correct_answer);
    assert_eq!(updated.difficulty.as_str(), "Hard");
    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.updated_at > created.updated_at);
}

#[tokio::test]
async fn put_rejects_invalid_patch_and_unknown_id() {
    let app = TestApp::new();
    let created = app.create(sample_body()).await;

    let resp = app
        .send(
            Method::PUT,
            &format!("/quizzes/{}", created.id),
            Some(json!({ "options": ["Python", "Rust"], "correctAnswer": 2 })),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = app
        .send(
            Method::PUT,
            "/quizzes/missing",
            Some(json!({ "difficulty": "Hard" })),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn put_returns_404_when_no_record_was_modified() {
    let app = TestApp::new();
    let created = app.create(sample_body()).await;

    let conn = open_db(&app.db_path).expect("database should open");
    conn.execute_batch(
        "CREATE TRIGGER ignore_quiz_updates BEFORE UPDATE ON quizzes
         BEGIN
             SELECT RAISE(IGNORE);
         END;",
    )
    .expect("trigger should be created");
    drop(conn);

    let uri = format!("/quizzes/{}", created.id);
    let resp = app
        .send(Method::PUT, &uri, Some(json!({ "difficulty": "Hard" })))
        .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body = read_json(resp).await;
    assert_eq!(
        body["error"],
        format!("Quiz with ID {} not found", created.id)
    );

    let resp = app.send(Method::GET, &uri, None).await;
    let loaded: QuizResponse = serde_json::from_value(read_json(resp).await).unwrap();
    assert_eq!(loaded, created);
}

#[tokio::test]
async fn delete_returns_204_then_404() {
    let app = TestApp::new();
    let created = app.create(sample_body()).await;
    let uri = format!("/quizzes/{}", created.id);

    let resp = app.send(Method::DELETE, &uri, None).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = app.send(Method::DELETE, &uri, None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = app.send(Method::GET, &uri, None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unusable_database_returns_generic_500() {
    let dir = tempfile::tempdir().unwrap();
    // A directory cannot be opened as a SQLite database file.
    let app = router(AppState::new(dir.path()));

    let req = Request::builder()
        .method(Method::GET)
        .uri("/quizzes/anything")
        .body(Body::empty())
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = read_json(resp).await;
    assert_eq!(
        body["error"],
        "An error occurred while retrieving the quiz"
    );
}
