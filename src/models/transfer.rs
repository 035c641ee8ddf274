// src/models/transfer.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// Código usado quando o nome do local de origem não tem hífen
pub const FALLBACK_BRANCH_CODE: &str = "BR";

// transfer_number é VARCHAR(64); o código da filial nunca passa disso
pub const MAX_BRANCH_CODE_LEN: usize = 16;

// --- Enums ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "transfer_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TransferStatus {
    Pending,
    Approved,
    Rejected,
}

impl TransferStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TransferStatus::Approved | TransferStatus::Rejected)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "approval_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "approval_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ApprovalRole {
    Controller,
    ReceivingController,
    ReceivingManager,
}

/// Decisão de um aprovador. `pending` não é uma decisão válida.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalDecision {
    Approved,
    Rejected,
}

impl From<ApprovalDecision> for ApprovalStatus {
    fn from(decision: ApprovalDecision) -> Self {
        match decision {
            ApprovalDecision::Approved => ApprovalStatus::Approved,
            ApprovalDecision::Rejected => ApprovalStatus::Rejected,
        }
    }
}

// --- Registros ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssetTransfer {
    pub id: Uuid,
    #[schema(example = "BKK-250301-0001")]
    pub transfer_number: String,
    pub source_location_id: Uuid,
    pub destination_location_id: Uuid,
    pub created_by: Uuid,
    pub status: TransferStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssetTransferItem {
    pub id: Uuid,
    pub transfer_id: Uuid,
    pub asset_id: Uuid,
    #[schema(example = "8850000123456")]
    pub barcode: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssetTransferApproval {
    pub id: Uuid,
    pub transfer_id: Uuid,
    pub approver_id: Uuid,
    pub role: ApprovalRole,
    pub status: ApprovalStatus,
    pub approved_at: Option<DateTime<Utc>>,
}

/// Transferência completa: cabeçalho + itens + cadeia de aprovação.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransferDetail {
    #[serde(flatten)]
    pub transfer: AssetTransfer,
    pub items: Vec<AssetTransferItem>,
    pub approvals: Vec<AssetTransferApproval>,
}

// --- Comandos ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransferItemInput {
    pub asset_id: Uuid,
    #[schema(example = "8850000123456")]
    pub barcode: Option<String>,
}

/// Tudo que é gravado na criação de uma transferência.
#[derive(Debug, Clone)]
pub struct NewTransfer {
    pub transfer_number: String,
    pub source_location_id: Uuid,
    pub destination_location_id: Uuid,
    pub created_by: Uuid,
    pub items: Vec<TransferItemInput>,
    pub approvals: Vec<ApprovalRequest>,
}

/// Um elo da cadeia de aprovação, calculado antes da gravação.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApprovalRequest {
    pub approver_id: Uuid,
    pub role: ApprovalRole,
}

// ---
// Regras puras
// ---

/// Status da transferência como função do conjunto de status das aprovações.
/// Qualquer rejeição vence; todas aprovadas = aprovada; senão continua pendente.
pub fn derive_transfer_status(approvals: &[ApprovalStatus]) -> TransferStatus {
    if approvals.iter().any(|s| *s == ApprovalStatus::Rejected) {
        TransferStatus::Rejected
    } else if approvals.iter().all(|s| *s == ApprovalStatus::Approved) {
        TransferStatus::Approved
    } else {
        TransferStatus::Pending
    }
}

/// "LOC-BKK-01" -> "BKK". Sem hífen (ou com segmento vazio) usa o código padrão.
/// Segmentos longos são cortados em `MAX_BRANCH_CODE_LEN` caracteres.
pub fn branch_code_from_location(location_name: &str) -> String {
    let segment = location_name
        .split('-')
        .nth(1)
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .unwrap_or(FALLBACK_BRANCH_CODE);
    let code: String = segment.chars().take(MAX_BRANCH_CODE_LEN).collect();
    code.trim_end().to_string()
}

/// Prefixo do número: "{branchCode}-{YYMMDD}-".
pub fn transfer_number_prefix(branch_code: &str, date: NaiveDate) -> String {
    format!("{}-{}-", branch_code, date.format("%y%m%d"))
}

pub fn format_transfer_number(prefix: &str, existing_with_prefix: i64) -> String {
    format!("{}{:04}", prefix, existing_with_prefix + 1)
}
