// src/db/stores.rs
//
// Contratos de leitura/escrita que o núcleo (escopo + transferências) consome.
// As implementações Postgres ficam nos repositórios; os testes usam `db::memory`.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        access::{AssignmentLevel, Role, RoleSet},
        hierarchy::{Branch, HierarchyIds, LocationLineage, Region},
        transfer::{
            ApprovalRequest, ApprovalStatus, AssetTransfer, AssetTransferApproval,
            AssetTransferItem, TransferDetail, TransferItemInput, TransferStatus,
        },
    },
};

/// Hierarquia country -> region -> branch -> location (somente leitura).
#[async_trait]
pub trait HierarchyStore: Send + Sync {
    async fn all_ids(&self) -> Result<HierarchyIds, AppError>;

    async fn region_ids_in_country(&self, country_id: Uuid) -> Result<Vec<Uuid>, AppError>;

    async fn branch_ids_in_region(&self, region_id: Uuid) -> Result<Vec<Uuid>, AppError>;

    async fn location_ids_in_branch(&self, branch_id: Uuid) -> Result<Vec<Uuid>, AppError>;

    async fn find_region(&self, region_id: Uuid) -> Result<Option<Region>, AppError>;

    async fn find_branch(&self, branch_id: Uuid) -> Result<Option<Branch>, AppError>;

    /// Caminho reverso location -> branch -> region -> country.
    async fn location_lineage(&self, location_id: Uuid)
        -> Result<Option<LocationLineage>, AppError>;
}

/// Papéis e atribuições de usuários (somente leitura para o núcleo).
#[async_trait]
pub trait AssignmentStore: Send + Sync {
    async fn roles_for(&self, user_id: Uuid) -> Result<RoleSet, AppError>;

    async fn assignment_targets(
        &self,
        user_id: Uuid,
        level: AssignmentLevel,
    ) -> Result<HashSet<Uuid>, AppError>;

    /// O primeiro usuário (por data de atribuição) atribuído ao alvo que tem o papel.
    async fn first_assignee_with_role(
        &self,
        level: AssignmentLevel,
        target_id: Uuid,
        role: Role,
    ) -> Result<Option<Uuid>, AppError>;
}

/// Persistência das transferências. Toda escrita passa por uma `TransferUnit`.
#[async_trait]
pub trait TransferStore: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn TransferUnit>, AppError>;

    async fn find_transfer(&self, transfer_id: Uuid) -> Result<Option<TransferDetail>, AppError>;

    /// `created_by = None` lista todas.
    async fn list_transfers(&self, created_by: Option<Uuid>)
        -> Result<Vec<AssetTransfer>, AppError>;

    async fn pending_approvals_for(
        &self,
        approver_id: Uuid,
    ) -> Result<Vec<AssetTransferApproval>, AppError>;
}

/// Uma transação. Se for descartada sem `commit`, nada do que foi escrito persiste.
#[async_trait]
pub trait TransferUnit: Send {
    /// Trava as linhas dos ativos (ordenadas por id) e devolve os que existem.
    async fn lock_assets(&mut self, asset_ids: &[Uuid]) -> Result<Vec<Uuid>, AppError>;

    /// Dos ativos informados, quais já são item de uma transferência pendente.
    async fn assets_in_open_transfers(&mut self, asset_ids: &[Uuid])
        -> Result<Vec<Uuid>, AppError>;

    async fn count_transfer_numbers(&mut self, prefix: &str) -> Result<i64, AppError>;

    /// Falha com `AppError::TransferNumberTaken` se o número já existir.
    async fn insert_transfer(
        &mut self,
        transfer_number: &str,
        source_location_id: Uuid,
        destination_location_id: Uuid,
        created_by: Uuid,
    ) -> Result<AssetTransfer, AppError>;

    async fn insert_item(
        &mut self,
        transfer_id: Uuid,
        position: i32,
        item: &TransferItemInput,
    ) -> Result<AssetTransferItem, AppError>;

    async fn insert_approval(
        &mut self,
        transfer_id: Uuid,
        position: i32,
        request: &ApprovalRequest,
    ) -> Result<AssetTransferApproval, AppError>;

    async fn find_approval(&mut self, approval_id: Uuid)
        -> Result<Option<AssetTransferApproval>, AppError>;

    /// SELECT ... FOR UPDATE na transferência: serializa as decisões concorrentes.
    async fn lock_transfer(
        &mut self,
        transfer_id: Uuid,
    ) -> Result<Option<AssetTransfer>, AppError>;

    async fn set_approval_status(
        &mut self,
        approval_id: Uuid,
        status: ApprovalStatus,
        decided_at: DateTime<Utc>,
    ) -> Result<AssetTransferApproval, AppError>;

    async fn approvals_for(&mut self, transfer_id: Uuid)
        -> Result<Vec<AssetTransferApproval>, AppError>;

    async fn items_for(&mut self, transfer_id: Uuid) -> Result<Vec<AssetTransferItem>, AppError>;

    async fn set_transfer_status(
        &mut self,
        transfer_id: Uuid,
        status: TransferStatus,
    ) -> Result<AssetTransfer, AppError>;

    /// Asset Store: move os ativos para o local de destino.
    async fn set_asset_location(
        &mut self,
        asset_ids: &[Uuid],
        location_id: Uuid,
    ) -> Result<u64, AppError>;

    async fn commit(self: Box<Self>) -> Result<(), AppError>;
}
