// src/db/memory.rs
//
// Implementação em memória dos stores, só para testes.
// Uma unidade trabalha numa cópia do estado e só publica no commit.

use std::{collections::HashSet, sync::Arc};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::stores::{AssignmentStore, HierarchyStore, TransferStore, TransferUnit},
    models::{
        access::{AssignmentLevel, Role, RoleSet, UserAssignment},
        asset::Asset,
        hierarchy::{Branch, Country, HierarchyIds, Location, LocationLineage, Region},
        transfer::{
            ApprovalRequest, ApprovalStatus, AssetTransfer, AssetTransferApproval,
            AssetTransferItem, TransferDetail, TransferItemInput, TransferStatus,
        },
    },
};

#[derive(Debug, Clone, Default)]
pub struct MemoryState {
    pub countries: Vec<Country>,
    pub regions: Vec<Region>,
    pub branches: Vec<Branch>,
    pub locations: Vec<Location>,
    pub assets: Vec<Asset>,
    pub roles: Vec<(Uuid, Role)>,
    pub assignments: Vec<UserAssignment>,
    pub transfers: Vec<AssetTransfer>,
    pub items: Vec<AssetTransferItem>,
    pub approvals: Vec<AssetTransferApproval>,
    /// Simula uma falha do banco ao gravar aprovações.
    pub fail_approval_inserts: bool,
}

// --- Montagem de cenários ---
impl MemoryState {
    pub fn add_country(&mut self, code: &str) -> Uuid {
        let now = Utc::now();
        let id = Uuid::new_v4();
        self.countries.push(Country {
            id,
            name: code.to_string(),
            code: code.to_string(),
            accounting_manager_id: None,
            created_at: now,
            updated_at: now,
        });
        id
    }

    pub fn add_region(&mut self, country_id: Uuid, name: &str) -> Uuid {
        let now = Utc::now();
        let id = Uuid::new_v4();
        self.regions.push(Region {
            id,
            name: name.to_string(),
            country_id,
            controller_id: None,
            created_at: now,
            updated_at: now,
        });
        id
    }

    pub fn add_branch(&mut self, region_id: Uuid, name: &str) -> Uuid {
        let now = Utc::now();
        let id = Uuid::new_v4();
        let country_id = self
            .regions
            .iter()
            .find(|r| r.id == region_id)
            .map(|r| r.country_id);
        self.branches.push(Branch {
            id,
            name: name.to_string(),
            region_id,
            country_id,
            manager_id: None,
            created_at: now,
            updated_at: now,
        });
        id
    }

    pub fn add_location(&mut self, branch_id: Option<Uuid>, name: &str) -> Uuid {
        let now = Utc::now();
        let id = Uuid::new_v4();
        self.locations.push(Location {
            id,
            name: name.to_string(),
            description: None,
            erp_location_id: None,
            branch_id,
            created_at: now,
            updated_at: now,
        });
        id
    }

    pub fn add_asset(&mut self, location: Uuid, barcode: &str) -> Uuid {
        let now = Utc::now();
        let id = Uuid::new_v4();
        self.assets.push(Asset {
            id,
            erp_asset_id: format!("ERP-{}", barcode),
            name: format!("Asset {}", barcode),
            barcode: Some(barcode.to_string()),
            model: None,
            build: None,
            category: None,
            location: Some(location),
            status: "active".to_string(),
            last_seen: None,
            created_at: now,
            updated_at: now,
            synced_at: None,
        });
        id
    }

    pub fn grant(&mut self, user_id: Uuid, role: Role) {
        self.roles.push((user_id, role));
    }

    pub fn assign(&mut self, user_id: Uuid, level: AssignmentLevel, target_id: Uuid) {
        self.assignments.push(UserAssignment {
            id: Uuid::new_v4(),
            user_id,
            level,
            target_id,
            created_at: Utc::now(),
        });
    }

    pub fn asset_location(&self, asset_id: Uuid) -> Option<Uuid> {
        self.assets.iter().find(|a| a.id == asset_id).and_then(|a| a.location)
    }
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new(state: MemoryState) -> Self {
        Self { state: Arc::new(Mutex::new(state)) }
    }

    pub async fn snapshot(&self) -> MemoryState {
        self.state.lock().await.clone()
    }

    pub async fn update<F: FnOnce(&mut MemoryState)>(&self, f: F) {
        f(&mut *self.state.lock().await);
    }
}

#[async_trait]
impl HierarchyStore for MemoryStore {
    async fn all_ids(&self) -> Result<HierarchyIds, AppError> {
        let s = self.state.lock().await;
        Ok(HierarchyIds {
            country_ids: s.countries.iter().map(|c| c.id).collect(),
            region_ids: s.regions.iter().map(|r| r.id).collect(),
            branch_ids: s.branches.iter().map(|b| b.id).collect(),
            location_ids: s.locations.iter().map(|l| l.id).collect(),
        })
    }

    async fn region_ids_in_country(&self, country_id: Uuid) -> Result<Vec<Uuid>, AppError> {
        let s = self.state.lock().await;
        Ok(s.regions.iter().filter(|r| r.country_id == country_id).map(|r| r.id).collect())
    }

    async fn branch_ids_in_region(&self, region_id: Uuid) -> Result<Vec<Uuid>, AppError> {
        let s = self.state.lock().await;
        Ok(s.branches.iter().filter(|b| b.region_id == region_id).map(|b| b.id).collect())
    }

    async fn location_ids_in_branch(&self, branch_id: Uuid) -> Result<Vec<Uuid>, AppError> {
        let s = self.state.lock().await;
        Ok(s.locations
            .iter()
            .filter(|l| l.branch_id == Some(branch_id))
            .map(|l| l.id)
            .collect())
    }

    async fn find_region(&self, region_id: Uuid) -> Result<Option<Region>, AppError> {
        let s = self.state.lock().await;
        Ok(s.regions.iter().find(|r| r.id == region_id).cloned())
    }

    async fn find_branch(&self, branch_id: Uuid) -> Result<Option<Branch>, AppError> {
        let s = self.state.lock().await;
        Ok(s.branches.iter().find(|b| b.id == branch_id).cloned())
    }

    async fn location_lineage(
        &self,
        location_id: Uuid,
    ) -> Result<Option<LocationLineage>, AppError> {
        let s = self.state.lock().await;
        let Some(location) = s.locations.iter().find(|l| l.id == location_id) else {
            return Ok(None);
        };
        let branch = location
            .branch_id
            .and_then(|id| s.branches.iter().find(|b| b.id == id));
        let region = branch.and_then(|b| s.regions.iter().find(|r| r.id == b.region_id));

        Ok(Some(LocationLineage {
            location_id,
            location_name: location.name.clone(),
            branch_id: branch.map(|b| b.id),
            region_id: region.map(|r| r.id),
            country_id: region.map(|r| r.country_id),
        }))
    }
}

#[async_trait]
impl AssignmentStore for MemoryStore {
    async fn roles_for(&self, user_id: Uuid) -> Result<RoleSet, AppError> {
        let s = self.state.lock().await;
        Ok(s.roles.iter().filter(|(u, _)| *u == user_id).map(|(_, r)| *r).collect())
    }

    async fn assignment_targets(
        &self,
        user_id: Uuid,
        level: AssignmentLevel,
    ) -> Result<HashSet<Uuid>, AppError> {
        let s = self.state.lock().await;
        Ok(s.assignments
            .iter()
            .filter(|a| a.user_id == user_id && a.level == level)
            .map(|a| a.target_id)
            .collect())
    }

    async fn first_assignee_with_role(
        &self,
        level: AssignmentLevel,
        target_id: Uuid,
        role: Role,
    ) -> Result<Option<Uuid>, AppError> {
        let s = self.state.lock().await;
        Ok(s.assignments
            .iter()
            .filter(|a| a.level == level && a.target_id == target_id)
            .map(|a| a.user_id)
            .find(|user| s.roles.contains(&(*user, role))))
    }
}

#[async_trait]
impl TransferStore for MemoryStore {
    async fn begin(&self) -> Result<Box<dyn TransferUnit>, AppError> {
        let guard = self.state.clone().lock_owned().await;
        let working = guard.clone();
        Ok(Box::new(MemoryUnit { guard, working }))
    }

    async fn find_transfer(&self, transfer_id: Uuid) -> Result<Option<TransferDetail>, AppError> {
        let s = self.state.lock().await;
        let Some(transfer) = s.transfers.iter().find(|t| t.id == transfer_id).cloned() else {
            return Ok(None);
        };
        Ok(Some(TransferDetail {
            transfer,
            items: s.items.iter().filter(|i| i.transfer_id == transfer_id).cloned().collect(),
            approvals: s
                .approvals
                .iter()
                .filter(|a| a.transfer_id == transfer_id)
                .cloned()
                .collect(),
        }))
    }

    async fn list_transfers(
        &self,
        created_by: Option<Uuid>,
    ) -> Result<Vec<AssetTransfer>, AppError> {
        let s = self.state.lock().await;
        let mut transfers: Vec<AssetTransfer> = s
            .transfers
            .iter()
            .filter(|t| created_by.is_none_or(|user| t.created_by == user))
            .cloned()
            .collect();
        transfers.reverse();
        Ok(transfers)
    }

    async fn pending_approvals_for(
        &self,
        approver_id: Uuid,
    ) -> Result<Vec<AssetTransferApproval>, AppError> {
        let s = self.state.lock().await;
        Ok(s.approvals
            .iter()
            .filter(|a| a.approver_id == approver_id && a.status == ApprovalStatus::Pending)
            .cloned()
            .collect())
    }
}

pub struct MemoryUnit {
    guard: OwnedMutexGuard<MemoryState>,
    working: MemoryState,
}

#[async_trait]
impl TransferUnit for MemoryUnit {
    async fn lock_assets(&mut self, asset_ids: &[Uuid]) -> Result<Vec<Uuid>, AppError> {
        let mut ids: Vec<Uuid> = self
            .working
            .assets
            .iter()
            .filter(|a| asset_ids.contains(&a.id))
            .map(|a| a.id)
            .collect();
        ids.sort();
        Ok(ids)
    }

    async fn assets_in_open_transfers(
        &mut self,
        asset_ids: &[Uuid],
    ) -> Result<Vec<Uuid>, AppError> {
        let open: HashSet<Uuid> = self
            .working
            .transfers
            .iter()
            .filter(|t| t.status == TransferStatus::Pending)
            .map(|t| t.id)
            .collect();
        let mut ids: Vec<Uuid> = self
            .working
            .items
            .iter()
            .filter(|i| open.contains(&i.transfer_id) && asset_ids.contains(&i.asset_id))
            .map(|i| i.asset_id)
            .collect();
        ids.sort();
        ids.dedup();
        Ok(ids)
    }

    async fn count_transfer_numbers(&mut self, prefix: &str) -> Result<i64, AppError> {
        Ok(self
            .working
            .transfers
            .iter()
            .filter(|t| t.transfer_number.starts_with(prefix))
            .count() as i64)
    }

    async fn insert_transfer(
        &mut self,
        transfer_number: &str,
        source_location_id: Uuid,
        destination_location_id: Uuid,
        created_by: Uuid,
    ) -> Result<AssetTransfer, AppError> {
        if self.working.transfers.iter().any(|t| t.transfer_number == transfer_number) {
            return Err(AppError::TransferNumberTaken(transfer_number.to_string()));
        }
        let transfer = AssetTransfer {
            id: Uuid::new_v4(),
            transfer_number: transfer_number.to_string(),
            source_location_id,
            destination_location_id,
            created_by,
            status: TransferStatus::Pending,
            created_at: Utc::now(),
        };
        self.working.transfers.push(transfer.clone());
        Ok(transfer)
    }

    async fn insert_item(
        &mut self,
        transfer_id: Uuid,
        _position: i32,
        item: &TransferItemInput,
    ) -> Result<AssetTransferItem, AppError> {
        let row = AssetTransferItem {
            id: Uuid::new_v4(),
            transfer_id,
            asset_id: item.asset_id,
            barcode: item.barcode.clone(),
        };
        self.working.items.push(row.clone());
        Ok(row)
    }

    async fn insert_approval(
        &mut self,
        transfer_id: Uuid,
        _position: i32,
        request: &ApprovalRequest,
    ) -> Result<AssetTransferApproval, AppError> {
        if self.working.fail_approval_inserts {
            return Err(AppError::DatabaseError(sqlx::Error::Protocol(
                "simulated approval insert failure".into(),
            )));
        }
        let row = AssetTransferApproval {
            id: Uuid::new_v4(),
            transfer_id,
            approver_id: request.approver_id,
            role: request.role,
            status: ApprovalStatus::Pending,
            approved_at: None,
        };
        self.working.approvals.push(row.clone());
        Ok(row)
    }

    async fn find_approval(
        &mut self,
        approval_id: Uuid,
    ) -> Result<Option<AssetTransferApproval>, AppError> {
        Ok(self.working.approvals.iter().find(|a| a.id == approval_id).cloned())
    }

    async fn lock_transfer(
        &mut self,
        transfer_id: Uuid,
    ) -> Result<Option<AssetTransfer>, AppError> {
        Ok(self.working.transfers.iter().find(|t| t.id == transfer_id).cloned())
    }

    async fn set_approval_status(
        &mut self,
        approval_id: Uuid,
        status: ApprovalStatus,
        decided_at: DateTime<Utc>,
    ) -> Result<AssetTransferApproval, AppError> {
        let approval = self
            .working
            .approvals
            .iter_mut()
            .find(|a| a.id == approval_id)
            .ok_or_else(|| AppError::NotFound("Approval".into()))?;
        approval.status = status;
        approval.approved_at = Some(decided_at);
        Ok(approval.clone())
    }

    async fn approvals_for(
        &mut self,
        transfer_id: Uuid,
    ) -> Result<Vec<AssetTransferApproval>, AppError> {
        Ok(self
            .working
            .approvals
            .iter()
            .filter(|a| a.transfer_id == transfer_id)
            .cloned()
            .collect())
    }

    async fn items_for(&mut self, transfer_id: Uuid) -> Result<Vec<AssetTransferItem>, AppError> {
        Ok(self
            .working
            .items
            .iter()
            .filter(|i| i.transfer_id == transfer_id)
            .cloned()
            .collect())
    }

    async fn set_transfer_status(
        &mut self,
        transfer_id: Uuid,
        status: TransferStatus,
    ) -> Result<AssetTransfer, AppError> {
        let transfer = self
            .working
            .transfers
            .iter_mut()
            .find(|t| t.id == transfer_id)
            .ok_or_else(|| AppError::NotFound("Transfer".into()))?;
        transfer.status = status;
        Ok(transfer.clone())
    }

    async fn set_asset_location(
        &mut self,
        asset_ids: &[Uuid],
        location_id: Uuid,
    ) -> Result<u64, AppError> {
        let mut moved = 0;
        for asset in self.working.assets.iter_mut().filter(|a| asset_ids.contains(&a.id)) {
            asset.location = Some(location_id);
            asset.updated_at = Utc::now();
            moved += 1;
        }
        Ok(moved)
    }

    async fn commit(self: Box<Self>) -> Result<(), AppError> {
        let MemoryUnit { mut guard, working } = *self;
        *guard = working;
        Ok(())
    }
}
