//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use hiroba_shared::time::timestamp_to_jst_rfc3339;

use crate::{
    domain::RoomId,
    infrastructure::dto::http::{MemberDetailDto, RoomDetailDto, RoomSummaryDto},
    ui::state::AppState,
};

/// Health check endpoint
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "connections": state.connections.count().await,
        "members": state.registry.count_members().await,
    }))
}

/// Get list of rooms that currently have members
pub async fn get_rooms(State(state): State<Arc<AppState>>) -> Json<Vec<RoomSummaryDto>> {
    let rooms = state.registry.list_rooms().await;

    let summaries = rooms
        .into_iter()
        .map(|room| RoomSummaryDto {
            id: room.id.as_str().to_string(),
            member_count: room.member_count(),
            members: room
                .members
                .into_iter()
                .map(|m| m.display_name.into_string())
                .collect(),
        })
        .collect();

    Json(summaries)
}

/// Get room detail by ID
pub async fn get_room_detail(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
) -> Result<Json<RoomDetailDto>, StatusCode> {
    let room_id = RoomId::new(room_id).map_err(|_| StatusCode::NOT_FOUND)?;
    let members = state.registry.members_of(&room_id).await;

    // An empty room does not exist
    if members.is_empty() {
        return Err(StatusCode::NOT_FOUND);
    }

    let room_detail = RoomDetailDto {
        id: room_id.into_string(),
        members: members
            .into_iter()
            .map(|m| MemberDetailDto {
                username: m.display_name.into_string(),
                joined_at: timestamp_to_jst_rfc3339(m.joined_at.value()),
            })
            .collect(),
    };

    Ok(Json(room_detail))
}
