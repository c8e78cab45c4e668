// libs/voice-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::AppError;

use crate::models::{InterpretRequest, StartSessionRequest, VoiceCommandRequest, VoiceError};
use crate::router::VoiceState;

fn map_voice_error(e: VoiceError) -> AppError {
    match e {
        VoiceError::SessionNotFound => AppError::NotFound("Voice session not found".to_string()),
        VoiceError::SessionClosed => AppError::Gone("Voice session already ended".to_string()),
        VoiceError::PatientNotFound => AppError::NotFound("Patient not found".to_string()),
    }
}

/// One-shot interpretation outside a session: match, resolve, book, reply.
#[axum::debug_handler]
pub async fn interpret_command(
    State(state): State<Arc<VoiceState>>,
    Json(request): Json<InterpretRequest>,
) -> Result<Json<Value>, AppError> {
    if state.store.get_patient(request.patient_id).await.is_none() {
        return Err(AppError::NotFound("Patient not found".to_string()));
    }

    let doctors = state.store.list_doctors().await;
    let outcome = state
        .booking
        .interpret_and_book(&request.text, request.patient_id, &doctors)
        .await;

    Ok(Json(json!({ "result": outcome })))
}

#[axum::debug_handler]
pub async fn start_session(
    State(state): State<Arc<VoiceState>>,
    Json(request): Json<StartSessionRequest>,
) -> Result<Json<Value>, AppError> {
    let session_id = state
        .sessions
        .start_session(request.patient_id)
        .await
        .map_err(map_voice_error)?;

    Ok(Json(json!({
        "success": true,
        "session_id": session_id
    })))
}

#[axum::debug_handler]
pub async fn submit_command(
    State(state): State<Arc<VoiceState>>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<VoiceCommandRequest>,
) -> Result<Json<Value>, AppError> {
    let outcome = state
        .sessions
        .submit_command(session_id, request.text)
        .await
        .map_err(map_voice_error)?;

    Ok(Json(json!({ "result": outcome })))
}

#[axum::debug_handler]
pub async fn stop_session(
    State(state): State<Arc<VoiceState>>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    state
        .sessions
        .stop_session(session_id)
        .await
        .map_err(map_voice_error)?;

    Ok(Json(json!({ "success": true })))
}
