//! Live games against real LLM providers. Run with `--features api`.

use llm_tictactoe::{
    AppConfig, HttpMoveService, LlmClient, LlmConfig, LlmProvider, MOVE_ROUTE, MoveServerState,
    move_server,
};
use llm_tictactoe_core::{AutomatedOutcome, Coordinator, Player, Position, RecordingView};
use std::time::Duration;

/// Serves the real move service on an ephemeral port.
async fn live_service(config: LlmConfig) -> HttpMoveService {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let state = MoveServerState::new(LlmClient::new(config));
    tokio::spawn(async move {
        axum::serve(listener, move_server::router(state)).await.unwrap();
    });
    HttpMoveService::new(
        format!("http://{}{}", addr, MOVE_ROUTE),
        Duration::from_secs(60),
    )
    .unwrap()
}

async fn assert_llm_answers_with_a_move(config: LlmConfig) {
    let service = live_service(config).await;
    let mut coordinator = Coordinator::new(RecordingView::default());
    coordinator.handle_local_move(Position::new(1, 1).unwrap());

    let outcome = coordinator
        .request_automated_move(&service, "Take a corner.")
        .await;

    eprintln!("Outcome: {:?}", outcome);
    // The model may pick badly, but the exchange itself must complete.
    assert!(!matches!(
        outcome,
        AutomatedOutcome::Failed(_) | AutomatedOutcome::Rejected(_)
    ));
    if matches!(outcome, AutomatedOutcome::Applied(_)) {
        assert_eq!(coordinator.game().turn(), 2);
        assert_eq!(coordinator.game().current_player(), Player::X);
    }
}

#[tokio::test]
#[cfg_attr(not(feature = "api"), ignore)]
async fn test_anthropic_plays_a_move() {
    dotenvy::dotenv().ok();
    let api_key = std::env::var("ANTHROPIC_API_KEY").expect("ANTHROPIC_API_KEY not set");

    assert_llm_answers_with_a_move(LlmConfig::new(
        LlmProvider::Anthropic,
        api_key,
        "claude-3-5-haiku-20241022".to_string(),
        100,
    ))
    .await;
}

#[tokio::test]
#[cfg_attr(not(feature = "api"), ignore)]
async fn test_openai_plays_a_move() {
    dotenvy::dotenv().ok();

    let config = AppConfig::default()
        .create_llm_config()
        .expect("OPENAI_API_KEY not set");

    assert_llm_answers_with_a_move(config).await;
}
