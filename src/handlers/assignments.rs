// src/handlers/assignments.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::access::{AssignmentLevel, NewAssignment, UserAssignment},
};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAssignmentPayload {
    pub user_id: Uuid,
    /// País, região ou filial, conforme o nível da rota
    pub target_id: Uuid,
}

#[utoipa::path(
    get,
    path = "/api/user-assignments/users/{user_id}",
    tag = "Assignments",
    params(
        ("user_id" = Uuid, Path, description = "ID do usuário")
    ),
    responses(
        (status = 200, description = "Atribuições do usuário em todos os níveis", body = Vec<UserAssignment>),
        (status = 403, description = "Somente administradores")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_user_assignments(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let assignments = app_state
        .assignment_service
        .list_for_user(actor.id, user_id)
        .await?;
    Ok(Json(assignments))
}

#[utoipa::path(
    post,
    path = "/api/user-assignments/{level}",
    tag = "Assignments",
    request_body = CreateAssignmentPayload,
    params(
        ("level" = AssignmentLevel, Path, description = "country | region | branch")
    ),
    responses(
        (status = 201, description = "Atribuição criada", body = UserAssignment),
        (status = 403, description = "Somente administradores"),
        (status = 404, description = "Usuário ou alvo não encontrado"),
        (status = 409, description = "Usuário já atribuído a este alvo")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_assignment(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Path(level): Path<AssignmentLevel>,
    Json(payload): Json<CreateAssignmentPayload>,
) -> Result<impl IntoResponse, AppError> {
    let cmd = NewAssignment {
        user_id: payload.user_id,
        level,
        target_id: payload.target_id,
    };
    let assignment = app_state.assignment_service.assign(actor.id, cmd).await?;
    Ok((StatusCode::CREATED, Json(assignment)))
}

#[utoipa::path(
    delete,
    path = "/api/user-assignments/{level}/{assignment_id}",
    tag = "Assignments",
    params(
        ("level" = AssignmentLevel, Path, description = "country | region | branch"),
        ("assignment_id" = Uuid, Path, description = "ID da atribuição")
    ),
    responses(
        (status = 204, description = "Atribuição removida"),
        (status = 403, description = "Somente administradores"),
        (status = 404, description = "Atribuição não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_assignment(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Path((level, assignment_id)): Path<(AssignmentLevel, Uuid)>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .assignment_service
        .remove(actor.id, level, assignment_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
