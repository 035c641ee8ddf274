// src/handlers/transfers.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::transfer::{
        ApprovalDecision, AssetTransfer, AssetTransferApproval, TransferDetail, TransferItemInput,
    },
};

// ---
// Payload: CreateTransfer
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransferPayload {
    pub source_location_id: Uuid,
    pub destination_location_id: Uuid,

    #[validate(length(min = 1, max = 500, message = "a transfer needs at least one asset"))]
    pub items: Vec<TransferItemInput>,
}

// ---
// Payload: UpdateApproval (a decisão é um valor fechado: approved | rejected)
// ---
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateApprovalPayload {
    pub status: ApprovalDecision,
}

#[utoipa::path(
    post,
    path = "/api/asset-transfers",
    tag = "Transfers",
    request_body = CreateTransferPayload,
    responses(
        (status = 201, description = "Transferência criada com a cadeia de aprovação", body = TransferDetail),
        (status = 400, description = "Ativos duplicados, lista vazia ou rota sem aprovadores"),
        (status = 403, description = "Somente gerentes criam transferências"),
        (status = 404, description = "Local ou ativo não encontrado"),
        (status = 409, description = "Ativo já está em outra transferência pendente")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_transfer(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CreateTransferPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let detail = app_state
        .transfer_service
        .create_transfer(
            payload.source_location_id,
            payload.destination_location_id,
            payload.items,
            user.id,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(detail)))
}

#[utoipa::path(
    get,
    path = "/api/asset-transfers",
    tag = "Transfers",
    responses(
        (status = 200, description = "Transferências (gerentes veem apenas as próprias)", body = Vec<AssetTransfer>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_transfers(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let transfers = app_state.transfer_service.list_transfers(user.id).await?;
    Ok(Json(transfers))
}

#[utoipa::path(
    get,
    path = "/api/asset-transfers/{transfer_id}",
    tag = "Transfers",
    params(
        ("transfer_id" = Uuid, Path, description = "ID da transferência")
    ),
    responses(
        (status = 200, description = "Transferência com itens e aprovações", body = TransferDetail),
        (status = 404, description = "Transferência não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_transfer(
    State(app_state): State<AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    Path(transfer_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let detail = app_state.transfer_service.get_transfer(transfer_id).await?;
    Ok(Json(detail))
}

#[utoipa::path(
    get,
    path = "/api/asset-transfers/approvals/pending",
    tag = "Transfers",
    responses(
        (status = 200, description = "Aprovações pendentes do usuário", body = Vec<AssetTransferApproval>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_pending_approvals(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let approvals = app_state.transfer_service.get_pending_approvals(user.id).await?;
    Ok(Json(approvals))
}

#[utoipa::path(
    patch,
    path = "/api/asset-transfers/approvals/{approval_id}",
    tag = "Transfers",
    request_body = UpdateApprovalPayload,
    params(
        ("approval_id" = Uuid, Path, description = "ID da aprovação")
    ),
    responses(
        (status = 200, description = "Decisão registrada", body = AssetTransferApproval),
        (status = 403, description = "Usuário não é o aprovador"),
        (status = 404, description = "Aprovação não encontrada"),
        (status = 409, description = "Transferência já finalizada")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_approval(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(approval_id): Path<Uuid>,
    Json(payload): Json<UpdateApprovalPayload>,
) -> Result<impl IntoResponse, AppError> {
    let approval = app_state
        .transfer_service
        .update_approval(approval_id, payload.status, user.id)
        .await?;
    Ok(Json(approval))
}
