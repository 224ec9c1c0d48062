use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use super::errors::{json_error, nudger_error_to_response};
use super::middleware::require_api_key;
use super::AppState;
use crate::model::ReminderLevel;
use crate::resend::EmailSender;
use crate::store::Store;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserQuery {
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendReminderRequest {
    pub user_id: Option<String>,
    pub level: Option<String>,
    pub template_id: Option<String>,
}

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn process_reminders<S, E>(
    State(state): State<AppState<S, E>>,
    headers: HeaderMap,
    Query(query): Query<UserQuery>,
) -> Response
where
    S: Store + 'static,
    E: EmailSender + 'static,
{
    if let Err(status) = require_api_key(&headers, state.keys.cron.as_deref()) {
        return json_error(status, "unauthorized", "Unauthorized");
    }

    let Some(user_id) = query.user_id.filter(|u| !u.is_empty()) else {
        return json_error(StatusCode::BAD_REQUEST, "missing_user_id", "User ID is required");
    };

    match state.service.process_reminders(&user_id, Utc::now()).await {
        Ok(summary) => Json(json!({
            "success": true,
            "processed": summary.processed,
            "sent": summary.sent,
            "errors": summary.errors,
        }))
        .into_response(),
        Err(e) => {
            tracing::error!(user_id = %user_id, error = %e, "reminder processing failed");
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "processing_failed",
                format!("Failed to process reminders: {e}"),
            )
        }
    }
}

pub async fn send_reminder<S, E>(
    State(state): State<AppState<S, E>>,
    Path(invoice_id): Path<String>,
    Json(body): Json<SendReminderRequest>,
) -> Response
where
    S: Store + 'static,
    E: EmailSender + 'static,
{
    let (Some(user_id), Some(level)) = (body.user_id, body.level) else {
        return json_error(
            StatusCode::BAD_REQUEST,
            "missing_fields",
            "Missing required fields: userId, level",
        );
    };

    let level: ReminderLevel = match level.parse() {
        Ok(l) => l,
        Err(e) => return json_error(StatusCode::BAD_REQUEST, "invalid_level", format!("{e}")),
    };

    match state
        .service
        .send_reminder(&invoice_id, &user_id, level, body.template_id.as_deref(), Utc::now())
        .await
    {
        Ok(entry) => Json(json!({ "success": true, "result": entry })).into_response(),
        Err(e) => nudger_error_to_response(e),
    }
}

pub async fn history<S, E>(
    State(state): State<AppState<S, E>>,
    Path(invoice_id): Path<String>,
    Query(query): Query<UserQuery>,
) -> Response
where
    S: Store + 'static,
    E: EmailSender + 'static,
{
    let Some(user_id) = query.user_id.filter(|u| !u.is_empty()) else {
        return json_error(StatusCode::BAD_REQUEST, "missing_user_id", "User ID is required");
    };

    match state.service.history(&invoice_id, &user_id).await {
        Ok(entries) => Json(entries).into_response(),
        Err(e) => nudger_error_to_response(e),
    }
}

pub async fn seed_templates<S, E>(State(state): State<AppState<S, E>>, headers: HeaderMap) -> Response
where
    S: Store + 'static,
    E: EmailSender + 'static,
{
    if let Err(status) = require_api_key(&headers, state.keys.admin.as_deref()) {
        return json_error(status, "unauthorized", "Unauthorized");
    }

    match state.service.seed_templates().await {
        Ok(count) => Json(json!({
            "success": true,
            "count": count,
            "message": format!("Successfully created {count} default templates"),
        }))
        .into_response(),
        Err(e) => nudger_error_to_response(e),
    }
}
