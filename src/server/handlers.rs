//! Route handlers.

use axum::{
    extract::{rejection::JsonRejection, State},
    response::Html,
    Json,
};
use tracing::{error, info};

use super::error::ApiError;
use super::models::{
    now_iso8601, preview, HealthResponse, UserInput, UserInputResponse, SUCCESS_MESSAGE,
};
use super::AppState;
use crate::tools::Context;

/// `GET /`: the input page.
pub async fn root(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    let path = state.static_dir.join("index.html");
    match tokio::fs::read_to_string(&path).await {
        Ok(page) => Ok(Html(page)),
        Err(e) => {
            error!(path = %path.display(), error = %e, "index page unavailable");
            Err(ApiError::NotFound("index.html not found".into()))
        }
    }
}

/// `GET /health`.
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: now_iso8601(),
    })
}

/// `POST /api/input`: run the agent on one input, in a fresh conversation.
pub async fn receive_user_input(
    State(state): State<AppState>,
    payload: Result<Json<UserInput>, JsonRejection>,
) -> Result<Json<UserInputResponse>, ApiError> {
    let Json(user_input) = payload?;
    user_input.validate().map_err(ApiError::Validation)?;

    let request_id = state.ids.next_id();
    info!(request_id = %request_id, "Received input: {}...", preview(&user_input.input, 50));

    let context = Context::new(request_id.clone());
    let outcome = match state
        .agent
        .invoke(&request_id, &user_input.input, &context)
        .await
    {
        Ok(outcome) => outcome,
        Err(e) => {
            error!(request_id = %request_id, category = %e.category(), error = %e, "Error processing user input");
            return Err(ApiError::Internal(format!(
                "Failed to process user input: {e}"
            )));
        }
    };

    let ai_response = outcome.answer_text();
    info!(
        request_id = %request_id,
        "AI response received: {}...",
        ai_response.as_deref().map(|r| preview(r, 100)).unwrap_or("None")
    );

    Ok(Json(UserInputResponse {
        success: true,
        message: SUCCESS_MESSAGE.to_string(),
        request_id,
        timestamp: now_iso8601(),
        received_input: user_input,
        ai_response,
    }))
}
