// src/db/transfer_repo.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::stores::{TransferStore, TransferUnit},
    models::transfer::{
        ApprovalRequest, ApprovalStatus, AssetTransfer, AssetTransferApproval, AssetTransferItem,
        TransferDetail, TransferItemInput, TransferStatus,
    },
};

const TRANSFER_COLUMNS: &str =
    "id, transfer_number, source_location_id, destination_location_id, created_by, status, created_at";
const ITEM_COLUMNS: &str = "id, transfer_id, asset_id, barcode";
const APPROVAL_COLUMNS: &str = "id, transfer_id, approver_id, role, status, approved_at";

#[derive(Clone)]
pub struct TransferRepository {
    pool: PgPool,
}

impl TransferRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TransferStore for TransferRepository {
    async fn begin(&self) -> Result<Box<dyn TransferUnit>, AppError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgTransferUnit { tx }))
    }

    async fn find_transfer(&self, transfer_id: Uuid) -> Result<Option<TransferDetail>, AppError> {
        let transfer = sqlx::query_as::<_, AssetTransfer>(&format!(
            "SELECT {} FROM asset_transfers WHERE id = $1",
            TRANSFER_COLUMNS
        ))
            .bind(transfer_id)
            .fetch_optional(&self.pool)
            .await?;

        let Some(transfer) = transfer else {
            return Ok(None);
        };

        let items = sqlx::query_as::<_, AssetTransferItem>(&format!(
            "SELECT {} FROM asset_transfer_items WHERE transfer_id = $1 ORDER BY position ASC",
            ITEM_COLUMNS
        ))
            .bind(transfer_id)
            .fetch_all(&self.pool)
            .await?;

        let approvals = sqlx::query_as::<_, AssetTransferApproval>(&format!(
            "SELECT {} FROM asset_transfer_approvals WHERE transfer_id = $1 ORDER BY position ASC",
            APPROVAL_COLUMNS
        ))
            .bind(transfer_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(Some(TransferDetail { transfer, items, approvals }))
    }

    async fn list_transfers(
        &self,
        created_by: Option<Uuid>,
    ) -> Result<Vec<AssetTransfer>, AppError> {
        let transfers = sqlx::query_as::<_, AssetTransfer>(&format!(
            "SELECT {} FROM asset_transfers \
             WHERE ($1::uuid IS NULL OR created_by = $1) \
             ORDER BY created_at DESC",
            TRANSFER_COLUMNS
        ))
            .bind(created_by)
            .fetch_all(&self.pool)
            .await?;
        Ok(transfers)
    }

    async fn pending_approvals_for(
        &self,
        approver_id: Uuid,
    ) -> Result<Vec<AssetTransferApproval>, AppError> {
        let approvals = sqlx::query_as::<_, AssetTransferApproval>(&format!(
            "SELECT {} FROM asset_transfer_approvals \
             WHERE approver_id = $1 AND status = 'pending' \
             ORDER BY transfer_id, position ASC",
            APPROVAL_COLUMNS
        ))
            .bind(approver_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(approvals)
    }
}

// ---
// Unidade transacional. Se for descartada sem commit, o Drop da
// `Transaction` do sqlx faz o rollback.
// ---
pub struct PgTransferUnit {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl TransferUnit for PgTransferUnit {
    async fn lock_assets(&mut self, asset_ids: &[Uuid]) -> Result<Vec<Uuid>, AppError> {
        // ORDER BY id: todas as transações travam na mesma ordem (sem deadlock)
        let ids = sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM assets WHERE id = ANY($1) ORDER BY id FOR UPDATE",
        )
            .bind(asset_ids)
            .fetch_all(&mut *self.tx)
            .await?;
        Ok(ids)
    }

    async fn assets_in_open_transfers(
        &mut self,
        asset_ids: &[Uuid],
    ) -> Result<Vec<Uuid>, AppError> {
        let ids = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT DISTINCT i.asset_id
            FROM asset_transfer_items i
            JOIN asset_transfers t ON t.id = i.transfer_id
            WHERE i.asset_id = ANY($1) AND t.status = 'pending'
            ORDER BY i.asset_id
            "#,
        )
            .bind(asset_ids)
            .fetch_all(&mut *self.tx)
            .await?;
        Ok(ids)
    }

    async fn count_transfer_numbers(&mut self, prefix: &str) -> Result<i64, AppError> {
        // starts_with em vez de LIKE: o código da filial pode conter '%' ou '_'
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM asset_transfers WHERE starts_with(transfer_number, $1)",
        )
            .bind(prefix)
            .fetch_one(&mut *self.tx)
            .await?;
        Ok(count)
    }

    async fn insert_transfer(
        &mut self,
        transfer_number: &str,
        source_location_id: Uuid,
        destination_location_id: Uuid,
        created_by: Uuid,
    ) -> Result<AssetTransfer, AppError> {
        sqlx::query_as::<_, AssetTransfer>(&format!(
            r#"
            INSERT INTO asset_transfers
                (transfer_number, source_location_id, destination_location_id, created_by, status)
            VALUES ($1, $2, $3, $4, 'pending')
            RETURNING {}
            "#,
            TRANSFER_COLUMNS
        ))
            .bind(transfer_number)
            .bind(source_location_id)
            .bind(destination_location_id)
            .bind(created_by)
            .fetch_one(&mut *self.tx)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.is_unique_violation()
                        && db_err.constraint() == Some("uq_transfer_number")
                    {
                        return AppError::TransferNumberTaken(transfer_number.to_string());
                    }
                }
                e.into()
            })
    }

    async fn insert_item(
        &mut self,
        transfer_id: Uuid,
        position: i32,
        item: &TransferItemInput,
    ) -> Result<AssetTransferItem, AppError> {
        let item = sqlx::query_as::<_, AssetTransferItem>(&format!(
            r#"
            INSERT INTO asset_transfer_items (transfer_id, asset_id, barcode, position)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            ITEM_COLUMNS
        ))
            .bind(transfer_id)
            .bind(item.asset_id)
            .bind(item.barcode.as_deref())
            .bind(position)
            .fetch_one(&mut *self.tx)
            .await?;
        Ok(item)
    }

    async fn insert_approval(
        &mut self,
        transfer_id: Uuid,
        position: i32,
        request: &ApprovalRequest,
    ) -> Result<AssetTransferApproval, AppError> {
        let approval = sqlx::query_as::<_, AssetTransferApproval>(&format!(
            r#"
            INSERT INTO asset_transfer_approvals (transfer_id, approver_id, role, status, position)
            VALUES ($1, $2, $3, 'pending', $4)
            RETURNING {}
            "#,
            APPROVAL_COLUMNS
        ))
            .bind(transfer_id)
            .bind(request.approver_id)
            .bind(request.role)
            .bind(position)
            .fetch_one(&mut *self.tx)
            .await?;
        Ok(approval)
    }

    async fn find_approval(
        &mut self,
        approval_id: Uuid,
    ) -> Result<Option<AssetTransferApproval>, AppError> {
        let approval = sqlx::query_as::<_, AssetTransferApproval>(&format!(
            "SELECT {} FROM asset_transfer_approvals WHERE id = $1",
            APPROVAL_COLUMNS
        ))
            .bind(approval_id)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(approval)
    }

    async fn lock_transfer(
        &mut self,
        transfer_id: Uuid,
    ) -> Result<Option<AssetTransfer>, AppError> {
        let transfer = sqlx::query_as::<_, AssetTransfer>(&format!(
            "SELECT {} FROM asset_transfers WHERE id = $1 FOR UPDATE",
            TRANSFER_COLUMNS
        ))
            .bind(transfer_id)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(transfer)
    }

    async fn set_approval_status(
        &mut self,
        approval_id: Uuid,
        status: ApprovalStatus,
        decided_at: DateTime<Utc>,
    ) -> Result<AssetTransferApproval, AppError> {
        let approval = sqlx::query_as::<_, AssetTransferApproval>(&format!(
            "UPDATE asset_transfer_approvals SET status = $2, approved_at = $3 \
             WHERE id = $1 RETURNING {}",
            APPROVAL_COLUMNS
        ))
            .bind(approval_id)
            .bind(status)
            .bind(decided_at)
            .fetch_one(&mut *self.tx)
            .await?;
        Ok(approval)
    }

    async fn approvals_for(
        &mut self,
        transfer_id: Uuid,
    ) -> Result<Vec<AssetTransferApproval>, AppError> {
        let approvals = sqlx::query_as::<_, AssetTransferApproval>(&format!(
            "SELECT {} FROM asset_transfer_approvals WHERE transfer_id = $1 ORDER BY position ASC",
            APPROVAL_COLUMNS
        ))
            .bind(transfer_id)
            .fetch_all(&mut *self.tx)
            .await?;
        Ok(approvals)
    }

    async fn items_for(&mut self, transfer_id: Uuid) -> Result<Vec<AssetTransferItem>, AppError> {
        let items = sqlx::query_as::<_, AssetTransferItem>(&format!(
            "SELECT {} FROM asset_transfer_items WHERE transfer_id = $1 ORDER BY position ASC",
            ITEM_COLUMNS
        ))
            .bind(transfer_id)
            .fetch_all(&mut *self.tx)
            .await?;
        Ok(items)
    }

    async fn set_transfer_status(
        &mut self,
        transfer_id: Uuid,
        status: TransferStatus,
    ) -> Result<AssetTransfer, AppError> {
        let transfer = sqlx::query_as::<_, AssetTransfer>(&format!(
            "UPDATE asset_transfers SET status = $2 WHERE id = $1 RETURNING {}",
            TRANSFER_COLUMNS
        ))
            .bind(transfer_id)
            .bind(status)
            .fetch_one(&mut *self.tx)
            .await?;
        Ok(transfer)
    }

    async fn set_asset_location(
        &mut self,
        asset_ids: &[Uuid],
        location_id: Uuid,
    ) -> Result<u64, AppError> {
        let result = sqlx::query(
            "UPDATE assets SET location = $2, updated_at = NOW() WHERE id = ANY($1)",
        )
            .bind(asset_ids)
            .bind(location_id)
            .execute(&mut *self.tx)
            .await?;
        Ok(result.rows_affected())
    }

    async fn commit(self: Box<Self>) -> Result<(), AppError> {
        self.tx.commit().await?;
        Ok(())
    }
}
