// src/handlers/roles.rs

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
    models::access::{Role, UserRole},
};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GrantRolePayload {
    pub user_id: Uuid,
    pub role: Role,
}

#[utoipa::path(
    get,
    path = "/api/user-roles/users/{user_id}",
    tag = "Roles",
    params(
        ("user_id" = Uuid, Path, description = "ID do usuário")
    ),
    responses(
        (status = 200, description = "Papéis do usuário", body = Vec<UserRole>),
        (status = 403, description = "Somente administradores")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_user_roles(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let roles = app_state.assignment_service.list_roles(actor.id, user_id).await?;
    Ok(Json(roles))
}

#[utoipa::path(
    post,
    path = "/api/user-roles",
    tag = "Roles",
    request_body = GrantRolePayload,
    responses(
        (status = 201, description = "Papel concedido", body = UserRole),
        (status = 403, description = "Somente administradores"),
        (status = 404, description = "Usuário não encontrado"),
        (status = 409, description = "Usuário já tem este papel")
    ),
    security(("api_jwt" = []))
)]
pub async fn grant_role(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Json(payload): Json<GrantRolePayload>,
) -> Result<impl IntoResponse, AppError> {
    let granted = app_state
        .assignment_service
        .grant_role(actor.id, payload.user_id, payload.role)
        .await?;
    Ok((StatusCode::CREATED, Json(granted)))
}

#[utoipa::path(
    delete,
    path = "/api/user-roles/users/{user_id}/{role}",
    tag = "Roles",
    params(
        ("user_id" = Uuid, Path, description = "ID do usuário"),
        ("role" = Role, Path, description = "Papel a revogar")
    ),
    responses(
        (status = 204, description = "Papel revogado"),
        (status = 403, description = "Somente administradores, e nunca o próprio papel de admin"),
        (status = 404, description = "Usuário não tem este papel")
    ),
    security(("api_jwt" = []))
)]
pub async fn revoke_role(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Path((user_id, role)): Path<(Uuid, Role)>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .assignment_service
        .revoke_role(actor.id, user_id, role)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
