use std::{
    collections::BTreeMap,
    path::PathBuf,
    sync::{Arc, Mutex},
};

use chrono::{TimeZone, Utc};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream},
};

use quiz_client::{
    api::{AuthApi, HttpAuthApi, HttpQuizApi, QuizApi},
    app_state::{Apis, AppState},
    auth::SessionHandle,
    config::Config,
    errors::AppError,
    gateway::HttpGateway,
    models::{
        domain::{Answer, SubmitPayload, UserRole},
        dto::request::Credentials,
    },
    routing::Router,
    storage::{KeyValueStorage, MemoryStorage},
};

type Captured = Arc<Mutex<Vec<String>>>;

/// Loopback HTTP server answering each connection with the next canned
/// `(status, body)` pair and recording the raw request.
async fn spawn_stub(responses: Vec<(u16, &'static str)>) -> (String, Captured) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let captured: Captured = Arc::new(Mutex::new(Vec::new()));
    let log = captured.clone();

    tokio::spawn(async move {
        for (status, body) in responses {
            let Ok((mut stream, _)) = listener.accept().await else {
                return;
            };
            let request = read_request(&mut stream).await;
            log.lock().unwrap().push(request);

            let reply = format!(
                "HTTP/1.1 {} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            let _ = stream.write_all(reply.as_bytes()).await;
            let _ = stream.shutdown().await;
        }
    });

    (format!("http://{}/api", addr), captured)
}

async fn read_request(stream: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];

    loop {
        let n = stream.read(&mut chunk).await.unwrap_or(0);
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);

        let text = String::from_utf8_lossy(&buf);
        if let Some(head_end) = text.find("\r\n\r\n") {
            let content_length = text[..head_end]
                .lines()
                .filter_map(|line| line.split_once(':'))
                .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
                .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= head_end + 4 + content_length {
                break;
            }
        }
    }

    String::from_utf8_lossy(&buf).into_owned()
}

fn config(api_base_url: String) -> Arc<Config> {
    Arc::new(Config {
        api_base_url,
        request_timeout_secs: 2,
        notification_ttl_secs: 5,
        countdown_period_ms: 0,
        storage_path: PathBuf::from("unused.json"),
        token_storage_key: "token".to_string(),
    })
}

struct Client {
    gateway: Arc<HttpGateway>,
    session: SessionHandle,
    storage: Arc<MemoryStorage>,
    router: Arc<Router>,
}

fn client(base_url: String, stored_token: Option<&str>) -> Client {
    let storage = Arc::new(match stored_token {
        Some(token) => MemoryStorage::with_entry("token", token),
        None => MemoryStorage::new(),
    });
    let session = SessionHandle::restore(storage.clone(), "token");
    let router = Arc::new(Router::new(session.clone()));
    let gateway = Arc::new(
        HttpGateway::new(config(base_url), session.clone(), router.clone()).unwrap(),
    );
    Client {
        gateway,
        session,
        storage,
        router,
    }
}

const LEARNER_JSON: &str =
    r#"{"id": 1, "email": "jane@example.com", "full_name": "Jane Smith", "role": "user"}"#;

#[tokio::test]
async fn test_protected_401_purges_session_and_returns_to_entry() {
    let verified: &'static str =
        Box::leak(format!(r#"{{"user": {}}}"#, LEARNER_JSON).into_boxed_str());
    let (base_url, captured) = spawn_stub(vec![
        (200, verified),
        (401, r#"{"error": "Token has expired"}"#),
    ])
    .await;
    let client = client(base_url, Some("stale-token"));
    let auth = HttpAuthApi::new(client.gateway.clone());

    let user = auth.verify_token().await.unwrap().user;
    client.session.set_user(user);
    client.router.navigate("/user/dashboard").unwrap();

    let quiz = HttpQuizApi::new(client.gateway.clone());
    let result = quiz.start_quiz(7).await;

    assert_eq!(result.unwrap_err(), AppError::Unauthorized("Token has expired".to_string()));
    assert!(!client.session.is_authenticated());
    assert!(!client.session.has_token());
    assert_eq!(client.storage.get("token").unwrap(), None);
    assert_eq!(client.router.current().unwrap().path, "/auth");

    let requests = captured.lock().unwrap();
    assert!(requests[1].starts_with("GET /api/quiz/7/start"));
    assert!(requests[1]
        .to_lowercase()
        .contains("authorization: bearer stale-token"));
}

#[tokio::test]
async fn test_public_401_is_a_credential_error() {
    let (base_url, _) = spawn_stub(vec![(401, r#"{"error": "Invalid credentials"}"#)]).await;
    let client = client(base_url, None);
    let auth = HttpAuthApi::new(client.gateway.clone());

    let result = auth.login(&Credentials::new("jane@example.com", "wrong")).await;

    assert_eq!(
        result.unwrap_err(),
        AppError::AuthError("Invalid credentials".to_string())
    );
    assert!(client.router.current().is_none());
}

#[tokio::test]
async fn test_error_message_is_taken_from_body() {
    let (base_url, _) = spawn_stub(vec![
        (404, r#"{"message": "Quiz not found"}"#),
        (500, "not json"),
    ])
    .await;
    let client = client(base_url, Some("t"));
    let quiz = HttpQuizApi::new(client.gateway.clone());

    assert_eq!(
        quiz.get_quiz_details(99).await.unwrap_err(),
        AppError::NotFound("Quiz not found".to_string())
    );
    assert_eq!(
        quiz.get_quiz_details(99).await.unwrap_err(),
        AppError::ServerError(String::new())
    );
    assert!(client.session.has_token());
}

#[tokio::test]
async fn test_jwt_rejection_message_is_read_from_msg() {
    let (base_url, _) = spawn_stub(vec![(
        401,
        r#"{"msg": "Missing Authorization Header"}"#,
    )])
    .await;
    let client = client(base_url, Some("t"));
    let quiz = HttpQuizApi::new(client.gateway.clone());

    assert_eq!(
        quiz.start_quiz(7).await.unwrap_err(),
        AppError::Unauthorized("Missing Authorization Header".to_string())
    );
    assert!(!client.session.has_token());
}

#[tokio::test]
async fn test_submit_sends_answers_and_request_id() {
    let (base_url, captured) = spawn_stub(vec![(
        200,
        r#"{"message": "Quiz submitted successfully", "results": {"score": {"id": 40, "quiz_id": 7, "total_scored": 1, "total_questions": 2, "percentage": 50.0}}}"#,
    )])
    .await;
    let client = client(base_url, Some("t"));
    let quiz = HttpQuizApi::new(client.gateway.clone());

    let mut answers = BTreeMap::new();
    answers.insert(71, Answer::from("B"));
    let payload = SubmitPayload {
        answers,
        start_time: Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap(),
    };
    let response = quiz.submit_quiz(7, &payload).await.unwrap();

    assert_eq!(response.results.score.total_scored, 1);
    let requests = captured.lock().unwrap();
    let request = requests[0].to_lowercase();
    assert!(request.starts_with("post /api/quiz/7/submit"));
    assert!(request.contains("x-request-id: "));
    assert!(request.contains(r#""answers":{"71":"b"}"#));
}

#[tokio::test]
async fn test_empty_success_body_is_accepted() {
    let (base_url, _) = spawn_stub(vec![(200, "")]).await;
    let client = client(base_url, Some("t"));
    let auth = HttpAuthApi::new(client.gateway.clone());

    assert!(auth.logout().await.is_ok());
}

#[tokio::test]
async fn test_unreachable_backend_is_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = client(format!("http://{}/api", addr), Some("t"));
    let quiz = HttpQuizApi::new(client.gateway.clone());

    assert!(matches!(
        quiz.start_quiz(7).await,
        Err(AppError::TransportError(_))
    ));
    assert!(client.session.has_token());
}

#[tokio::test]
async fn test_login_through_app_state_persists_token() {
    let body: &'static str = Box::leak(
        format!(
            r#"{{"message": "Login successful", "access_token": "issued-token", "user": {}}}"#,
            LEARNER_JSON
        )
        .into_boxed_str(),
    );
    let (base_url, captured) = spawn_stub(vec![(200, body)]).await;
    let client = client(base_url.clone(), None);
    let state = AppState::assemble(
        config(base_url),
        client.session.clone(),
        client.router.clone(),
        Apis::http(client.gateway.clone()),
    );

    let user = state
        .session_service
        .login(&Credentials::new("jane@example.com", "hunter22"))
        .await
        .unwrap();
    let outcome = state.navigate(user.role.landing_path()).await.unwrap();

    assert_eq!(user.role, UserRole::User);
    assert_eq!(outcome.location.path, "/user/dashboard");
    assert_eq!(
        client.storage.get("token").unwrap().as_deref(),
        Some("issued-token")
    );
    assert_eq!(state.notifications.current().message, "Login successful!");
    assert!(captured.lock().unwrap()[0].contains(r#""password":"hunter22""#));
}
