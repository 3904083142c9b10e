//! End-to-end tests of the move service with a canned completion backend.

use llm_tictactoe::{
    Completion, HttpMoveService, LlmClient, LlmError, MOVE_REPLY_TOKEN_LIMIT, MOVE_ROUTE,
    MovePrompt, MoveServerState, move_server,
};
use llm_tictactoe_core::{
    AutomatedOutcome, Coordinator, MoveOutcome, Player, Position, RecordingView, Square,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Returns a fixed completion and remembers the prompts it was given.
struct CannedCompletion {
    reply: Result<String, String>,
    prompts: Mutex<Vec<(MovePrompt, u32)>>,
}

impl CannedCompletion {
    fn ok(text: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(text.to_string()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(message.to_string()),
            prompts: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait::async_trait]
impl Completion for CannedCompletion {
    async fn complete(&self, prompt: &MovePrompt, max_tokens: u32) -> Result<String, LlmError> {
        self.prompts
            .lock()
            .unwrap()
            .push((prompt.clone(), max_tokens));
        self.reply.clone().map_err(LlmError::request)
    }
}

fn state(completion: Arc<CannedCompletion>) -> MoveServerState {
    MoveServerState::new(LlmClient::with_completion(completion, 150))
}

async fn spawn_service(completion: Arc<CannedCompletion>) -> HttpMoveService {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = move_server::router(state(completion));
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    HttpMoveService::new(
        format!("http://{}{}", addr, MOVE_ROUTE),
        Duration::from_secs(5),
    )
    .unwrap()
}

fn pos(row: usize, col: usize) -> Position {
    Position::new(row, col).unwrap()
}

#[tokio::test]
async fn test_llm_move_round_trip() {
    let completion = CannedCompletion::ok("I'll take the center: {\"row\": 1, \"col\": 1}");
    let service = spawn_service(completion.clone()).await;

    let mut coordinator = Coordinator::new(RecordingView::default());
    coordinator.handle_local_move(pos(0, 0));
    let outcome = coordinator
        .request_automated_move(&service, "Always take the center")
        .await;

    assert_eq!(outcome, AutomatedOutcome::Applied(MoveOutcome::Continued(Player::X)));
    assert_eq!(
        coordinator.game().board().get(pos(1, 1)),
        Square::Occupied(Player::O)
    );

    let prompts = completion.prompts.lock().unwrap();
    let (prompt, max_tokens) = &prompts[0];
    assert!(prompt.system.contains("as O"));
    assert!(prompt.user.contains("X . ."));
    assert!(prompt.user.contains("{\"row\": 2, \"col\": 2}"));
    assert!(!prompt.user.contains("{\"row\": 0, \"col\": 0}"));
    assert!(prompt.user.contains("Always take the center"));
    assert!(prompt.user.contains("status playing"));
    assert_eq!(*max_tokens, 150);
    assert!(*max_tokens <= MOVE_REPLY_TOKEN_LIMIT);
}

#[tokio::test]
async fn test_unavailable_square_becomes_service_error() {
    let completion = CannedCompletion::ok(r#"{"row": 0, "col": 0}"#);
    let service = spawn_service(completion).await;

    let mut coordinator = Coordinator::new(RecordingView::default());
    coordinator.handle_local_move(pos(0, 0));
    let before = coordinator.game().clone();
    let outcome = coordinator.request_automated_move(&service, "").await;

    match outcome {
        AutomatedOutcome::ServiceError(message) => {
            assert!(message.contains("unavailable square (0, 0)"));
        }
        other => panic!("expected service error, got {:?}", other),
    }
    assert_eq!(coordinator.game(), &before);
    assert!(coordinator.view().trigger_enabled());
}

#[tokio::test]
async fn test_reply_without_move_becomes_service_error() {
    let completion = CannedCompletion::ok("Let me think about that.");
    let service = spawn_service(completion).await;

    let mut coordinator = Coordinator::new(RecordingView::default());
    coordinator.handle_local_move(pos(2, 2));
    let outcome = coordinator.request_automated_move(&service, "").await;

    assert_eq!(
        outcome,
        AutomatedOutcome::ServiceError("LLM reply did not contain a move".to_string())
    );
}

#[tokio::test]
async fn test_llm_failure_is_bad_gateway() {
    let completion = CannedCompletion::failing("quota exceeded");
    let service = spawn_service(completion).await;

    let mut coordinator = Coordinator::new(RecordingView::default());
    coordinator.handle_local_move(pos(2, 2));
    let outcome = coordinator.request_automated_move(&service, "").await;

    assert_eq!(
        outcome,
        AutomatedOutcome::Failed(
            "Network or server error: Server error: 502 - LLM request failed: quota exceeded"
                .to_string()
        )
    );
    assert_eq!(coordinator.game().turn(), 1);
    assert!(coordinator.view().trigger_enabled());
}

#[tokio::test]
async fn test_health_endpoint() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = move_server::router(state(CannedCompletion::ok("")));
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let body = reqwest::get(format!("http://{}/health", addr))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert_eq!(body, "ok");
}

#[tokio::test]
async fn test_invalid_request_body_rejected() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = move_server::router(state(CannedCompletion::ok("")));
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let response = reqwest::Client::new()
        .post(format!("http://{}{}", addr, MOVE_ROUTE))
        .json(&serde_json::json!({"gameState": "nonsense"}))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_client_error());
}
