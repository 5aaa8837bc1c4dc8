use super::*;
use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use futures::future::{AbortHandle, Abortable};
use shared::domain::{Difficulty, MaterialId};
use std::sync::Arc;
use tokio::{net::TcpListener, sync::Mutex};

#[derive(Clone)]
struct ServerState {
    received: Arc<Mutex<Vec<serde_json::Value>>>,
    status: StatusCode,
    body: String,
    delay: Duration,
}

async fn handle_generate(
    State(state): State<ServerState>,
    Json(payload): Json<serde_json::Value>,
) -> (StatusCode, String) {
    state.received.lock().await.push(payload);
    if !state.delay.is_zero() {
        tokio::time::sleep(state.delay).await;
    }
    (state.status, state.body.clone())
}

struct TestServer {
    url: Url,
    received: Arc<Mutex<Vec<serde_json::Value>>>,
}

async fn spawn_generation_server(
    status: StatusCode,
    body: serde_json::Value,
    delay: Duration,
) -> TestServer {
    spawn_raw_generation_server(status, body.to_string(), delay).await
}

async fn spawn_raw_generation_server(status: StatusCode, body: String, delay: Duration) -> TestServer {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let received = Arc::new(Mutex::new(Vec::new()));
    let state = ServerState {
        received: received.clone(),
        status,
        body,
        delay,
    };
    let app = Router::new()
        .route("/generate-questions", post(handle_generate))
        .with_state(state);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    TestServer {
        url: Url::parse(&format!("http://{addr}/generate-questions")).expect("url"),
        received,
    }
}

fn client_for(server: &TestServer, timeout: Duration) -> HttpGenerationClient {
    HttpGenerationClient::new(server.url.clone(), timeout).expect("client")
}

fn sample_request() -> GenerateQuestionsRequest {
    GenerateQuestionsRequest {
        material_text: "Sample study material".to_string(),
        difficulty: Difficulty::Medium,
        question_count: 2,
    }
}

fn two_questions() -> serde_json::Value {
    serde_json::json!({
        "questions": [
            {"id": 101, "text": "Define a quadratic equation.", "difficulty": "medium", "created_at": "2024-10-15 09:00:00"},
            {"id": 102, "text": "Solve x^2 - 4 = 0.", "difficulty": "medium"}
        ],
        "count": 2,
        "model": "gpt-4o-mini"
    })
}

#[tokio::test]
async fn posts_camel_case_request_and_parses_questions() {
    let server = spawn_generation_server(StatusCode::OK, two_questions(), Duration::ZERO).await;
    let client = client_for(&server, Duration::from_secs(5));

    let response = client
        .generate_questions(&sample_request())
        .await
        .expect("generate");

    assert_eq!(response.questions.len(), 2);
    assert_eq!(response.questions[0].id.as_str(), "101");
    assert_eq!(
        response.questions[0].extra.get("created_at"),
        Some(&serde_json::json!("2024-10-15 09:00:00"))
    );
    assert_eq!(response.model.as_deref(), Some("gpt-4o-mini"));

    let received = server.received.lock().await;
    assert_eq!(
        received.as_slice(),
        &[serde_json::json!({
            "materialText": "Sample study material",
            "difficulty": "medium",
            "questionCount": 2
        })]
    );
}

#[tokio::test]
async fn rejection_surfaces_service_error_message() {
    let server = spawn_generation_server(
        StatusCode::INTERNAL_SERVER_ERROR,
        serde_json::json!({"error": "Generation failed: quota exceeded"}),
        Duration::ZERO,
    )
    .await;
    let client = client_for(&server, Duration::from_secs(5));

    let err = client
        .generate_questions(&sample_request())
        .await
        .expect_err("must fail");

    match &err {
        GenerationError::Rejected { status, message } => {
            assert_eq!(*status, 500);
            assert_eq!(message.as_deref(), Some("Generation failed: quota exceeded"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(err.user_message(), "Generation failed: quota exceeded");
}

#[tokio::test]
async fn rejection_without_error_body_uses_generic_message() {
    let server = spawn_raw_generation_server(
        StatusCode::BAD_GATEWAY,
        "upstream unavailable".to_string(),
        Duration::ZERO,
    )
    .await;
    let client = client_for(&server, Duration::from_secs(5));

    let err = client
        .generate_questions(&sample_request())
        .await
        .expect_err("must fail");

    assert!(matches!(
        err,
        GenerationError::Rejected {
            status: 502,
            message: None
        }
    ));
    assert_eq!(err.user_message(), error::GENERIC_GENERATION_FAILURE);
}

#[tokio::test]
async fn malformed_success_body_is_invalid_response() {
    let server = spawn_generation_server(
        StatusCode::OK,
        serde_json::json!({"items": []}),
        Duration::ZERO,
    )
    .await;
    let client = client_for(&server, Duration::from_secs(5));

    let err = client
        .generate_questions(&sample_request())
        .await
        .expect_err("must fail");
    assert!(matches!(err, GenerationError::InvalidResponse(_)), "{err:?}");
}

#[tokio::test]
async fn slow_service_times_out() {
    let server =
        spawn_generation_server(StatusCode::OK, two_questions(), Duration::from_secs(3)).await;
    let client = client_for(&server, Duration::from_millis(200));

    let err = client
        .generate_questions(&sample_request())
        .await
        .expect_err("must time out");
    assert!(matches!(err, GenerationError::Timeout), "{err:?}");
}

#[tokio::test]
async fn unreachable_service_is_transport_error() {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let client = HttpGenerationClient::new(
        Url::parse(&format!("http://{addr}/generate-questions")).expect("url"),
        Duration::from_secs(5),
    )
    .expect("client");

    let err = client
        .generate_questions(&sample_request())
        .await
        .expect_err("must fail");
    assert!(matches!(err, GenerationError::Transport(_)), "{err:?}");
}

#[tokio::test]
async fn dashboard_generation_round_trip_over_http() {
    let server = spawn_generation_server(StatusCode::OK, two_questions(), Duration::ZERO).await;
    let client = client_for(&server, Duration::from_secs(5));
    let mut dashboard = DashboardController::default();
    dashboard.select_material(MaterialId::from("1"));
    dashboard.update_settings(5, 20);

    let merged = dashboard.generate_questions(&client).await.expect("generate");

    assert_eq!(merged, 2);
    assert_eq!(dashboard.questions().len(), 5);
    assert!(dashboard.questions()[3..]
        .iter()
        .all(|q| q.material_id == MaterialId::from("1")));
    assert_eq!(
        dashboard.material(&MaterialId::from("1")).map(|m| m.questions_generated),
        Some(17)
    );

    let received = server.received.lock().await;
    assert_eq!(received[0]["difficulty"], "easy");
    assert_eq!(received[0]["questionCount"], 5);
}

#[tokio::test]
async fn aborted_call_completes_job_as_cancelled() {
    let server =
        spawn_generation_server(StatusCode::OK, two_questions(), Duration::from_secs(3)).await;
    let client = client_for(&server, Duration::from_secs(10));
    let mut dashboard = DashboardController::default();
    dashboard.select_material(MaterialId::from("2"));
    let questions_before = dashboard.questions().to_vec();

    let job = dashboard.begin_generation().expect("begin");
    let (abort_handle, registration) = AbortHandle::new_pair();
    let request = job.request().clone();
    let call = tokio::spawn(async move {
        Abortable::new(client.generate_questions(&request), registration).await
    });

    tokio::time::sleep(Duration::from_millis(100)).await;
    abort_handle.abort();
    let outcome = match call.await.expect("join") {
        Ok(result) => result,
        Err(_aborted) => Err(GenerationError::Cancelled),
    };

    let err = dashboard
        .complete_generation(job, outcome)
        .expect_err("cancelled");
    assert!(matches!(
        err,
        DashboardError::Generation(GenerationError::Cancelled)
    ));
    assert!(!dashboard.is_generating());
    assert_eq!(dashboard.questions(), questions_before.as_slice());
}
