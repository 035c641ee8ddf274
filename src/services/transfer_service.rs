// src/services/transfer_service.rs

use std::{collections::HashSet, sync::Arc};

use chrono::Utc;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::stores::{AssignmentStore, HierarchyStore, TransferStore},
    models::{
        access::{AssignmentLevel, Role},
        hierarchy::LocationLineage,
        transfer::{
            branch_code_from_location, derive_transfer_status, format_transfer_number,
            transfer_number_prefix, ApprovalDecision, ApprovalRequest, ApprovalRole,
            AssetTransfer, AssetTransferApproval, NewTransfer, TransferDetail, TransferItemInput,
            TransferStatus,
        },
    },
};

// Tentativas de gravação quando o número da transferência colide
const MAX_NUMBER_ATTEMPTS: u32 = 5;

#[derive(Clone)]
pub struct TransferService {
    transfers: Arc<dyn TransferStore>,
    hierarchy: Arc<dyn HierarchyStore>,
    assignments: Arc<dyn AssignmentStore>,
}

impl TransferService {
    pub fn new(
        transfers: Arc<dyn TransferStore>,
        hierarchy: Arc<dyn HierarchyStore>,
        assignments: Arc<dyn AssignmentStore>,
    ) -> Self {
        Self { transfers, hierarchy, assignments }
    }

    // =========================================================================
    //  CRIAÇÃO
    // =========================================================================

    pub async fn create_transfer(
        &self,
        source_location_id: Uuid,
        destination_location_id: Uuid,
        items: Vec<TransferItemInput>,
        created_by: Uuid,
    ) -> Result<TransferDetail, AppError> {
        // 1. Só gerentes criam transferências
        let roles = self.assignments.roles_for(created_by).await?;
        if !roles.contains(Role::Manager) {
            return Err(AppError::Forbidden("only managers can create asset transfers".into()));
        }

        // 2. Validação da entrada
        if items.is_empty() {
            return Err(AppError::InvalidInput("a transfer needs at least one asset".into()));
        }
        let mut seen = HashSet::with_capacity(items.len());
        if !items.iter().all(|item| seen.insert(item.asset_id)) {
            return Err(AppError::InvalidInput("duplicate assets in transfer".into()));
        }
        if source_location_id == destination_location_id {
            return Err(AppError::InvalidInput(
                "source and destination locations must differ".into(),
            ));
        }

        // 3. Posição dos dois locais na hierarquia
        let source = self
            .hierarchy
            .location_lineage(source_location_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Source location".into()))?;
        let destination = self
            .hierarchy
            .location_lineage(destination_location_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Destination location".into()))?;

        // 4. Cadeia de aprovação (fixada aqui, nunca alterada depois)
        let approvals = self.derive_approval_chain(&source, &destination).await?;
        if approvals.is_empty() {
            return Err(AppError::InvalidInput(
                "no controller or manager is assigned along this route".into(),
            ));
        }

        let prefix = transfer_number_prefix(
            &branch_code_from_location(&source.location_name),
            Utc::now().date_naive(),
        );

        let mut new_transfer = NewTransfer {
            transfer_number: String::new(),
            source_location_id,
            destination_location_id,
            created_by,
            items,
            approvals,
        };

        // 5. Grava tudo numa transação; colisão de número => nova transação
        let mut floor = 0;
        for attempt in 1..=MAX_NUMBER_ATTEMPTS {
            match self.persist_transfer(&mut new_transfer, &prefix, floor).await {
                Err(AppError::TransferNumberTaken(number)) => {
                    tracing::warn!(
                        %number,
                        attempt,
                        "número de transferência já usado, tentando de novo"
                    );
                    floor = sequence_of(&number, &prefix).unwrap_or(floor + 1);
                }
                Ok(detail) => {
                    tracing::info!(
                        transfer_id = %detail.transfer.id,
                        transfer_number = %detail.transfer.transfer_number,
                        items = detail.items.len(),
                        approvals = detail.approvals.len(),
                        "transferência criada"
                    );
                    return Ok(detail);
                }
                Err(e) => return Err(e),
            }
        }

        Err(AppError::Conflict(format!(
            "could not allocate a transfer number with prefix {}",
            prefix
        )))
    }

    async fn persist_transfer(
        &self,
        new_transfer: &mut NewTransfer,
        prefix: &str,
        floor: i64,
    ) -> Result<TransferDetail, AppError> {
        let mut unit = self.transfers.begin().await?;

        let asset_ids: Vec<Uuid> = new_transfer.items.iter().map(|i| i.asset_id).collect();

        // Trava os ativos antes de checar: duas criações com o mesmo ativo se serializam
        let existing: HashSet<Uuid> = unit.lock_assets(&asset_ids).await?.into_iter().collect();
        if let Some(missing) = asset_ids.iter().find(|id| !existing.contains(id)) {
            return Err(AppError::NotFound(format!("Asset {}", missing)));
        }

        if let Some(busy) = unit.assets_in_open_transfers(&asset_ids).await?.first() {
            return Err(AppError::AssetInOpenTransfer(*busy));
        }

        let existing_numbers = unit.count_transfer_numbers(prefix).await?.max(floor);
        new_transfer.transfer_number = format_transfer_number(prefix, existing_numbers);

        let transfer = unit
            .insert_transfer(
                &new_transfer.transfer_number,
                new_transfer.source_location_id,
                new_transfer.destination_location_id,
                new_transfer.created_by,
            )
            .await?;

        let mut items = Vec::with_capacity(new_transfer.items.len());
        for (position, item) in new_transfer.items.iter().enumerate() {
            items.push(unit.insert_item(transfer.id, position as i32, item).await?);
        }

        let mut approvals = Vec::with_capacity(new_transfer.approvals.len());
        for (position, request) in new_transfer.approvals.iter().enumerate() {
            approvals.push(unit.insert_approval(transfer.id, position as i32, request).await?);
        }

        unit.commit().await?;

        Ok(TransferDetail { transfer, items, approvals })
    }

    /// controller da região de origem; receiving_controller da região de destino
    /// (só entre filiais diferentes); receiving_manager da filial de destino.
    /// Elos sem responsável são omitidos.
    async fn derive_approval_chain(
        &self,
        source: &LocationLineage,
        destination: &LocationLineage,
    ) -> Result<Vec<ApprovalRequest>, AppError> {
        tracing::debug!(
            source_branch = ?source.branch_id,
            source_country = ?source.country_id,
            destination_branch = ?destination.branch_id,
            destination_country = ?destination.country_id,
            "calculando cadeia de aprovação"
        );

        let mut chain = Vec::with_capacity(3);

        if let Some(approver_id) = self
            .assignee(AssignmentLevel::Region, source.region_id, Role::Controller)
            .await?
        {
            chain.push(ApprovalRequest { approver_id, role: ApprovalRole::Controller });
        }

        if source.branch_id != destination.branch_id {
            if let Some(approver_id) = self
                .assignee(AssignmentLevel::Region, destination.region_id, Role::Controller)
                .await?
            {
                chain.push(ApprovalRequest {
                    approver_id,
                    role: ApprovalRole::ReceivingController,
                });
            }
        }

        if let Some(approver_id) = self
            .assignee(AssignmentLevel::Branch, destination.branch_id, Role::Manager)
            .await?
        {
            chain.push(ApprovalRequest { approver_id, role: ApprovalRole::ReceivingManager });
        }

        Ok(chain)
    }

    async fn assignee(
        &self,
        level: AssignmentLevel,
        target_id: Option<Uuid>,
        role: Role,
    ) -> Result<Option<Uuid>, AppError> {
        match target_id {
            Some(target_id) => {
                self.assignments
                    .first_assignee_with_role(level, target_id, role)
                    .await
            }
            None => Ok(None),
        }
    }

    // =========================================================================
    //  DECISÃO DE APROVAÇÃO
    // =========================================================================

    pub async fn update_approval(
        &self,
        approval_id: Uuid,
        decision: ApprovalDecision,
        current_user_id: Uuid,
    ) -> Result<AssetTransferApproval, AppError> {
        let mut unit = self.transfers.begin().await?;

        let approval = unit
            .find_approval(approval_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Approval".into()))?;

        if approval.approver_id != current_user_id {
            return Err(AppError::Forbidden("not authorized to approve this transfer".into()));
        }

        // Trava a transferência antes de ler o conjunto de aprovações
        let transfer = unit
            .lock_transfer(approval.transfer_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Transfer".into()))?;

        if transfer.status.is_terminal() {
            return Err(AppError::TransferFinalized(transfer.status));
        }

        let updated = unit
            .set_approval_status(approval_id, decision.into(), Utc::now())
            .await?;

        // Recalcula o status a partir de TODAS as aprovações atuais
        let statuses: Vec<_> = unit
            .approvals_for(transfer.id)
            .await?
            .into_iter()
            .map(|a| a.status)
            .collect();
        let new_status = derive_transfer_status(&statuses);

        if new_status != transfer.status {
            unit.set_transfer_status(transfer.id, new_status).await?;
        }

        if new_status == TransferStatus::Approved {
            let asset_ids: Vec<Uuid> = unit
                .items_for(transfer.id)
                .await?
                .into_iter()
                .map(|item| item.asset_id)
                .collect();
            let moved = unit
                .set_asset_location(&asset_ids, transfer.destination_location_id)
                .await?;
            tracing::info!(
                transfer_id = %transfer.id,
                destination = %transfer.destination_location_id,
                moved,
                "transferência aprovada, ativos movidos"
            );
        }

        unit.commit().await?;

        tracing::info!(
            %approval_id,
            transfer_id = %transfer.id,
            decision = ?decision,
            transfer_status = ?new_status,
            "aprovação registrada"
        );

        Ok(updated)
    }

    // =========================================================================
    //  CONSULTAS
    // =========================================================================

    pub async fn get_transfer(&self, transfer_id: Uuid) -> Result<TransferDetail, AppError> {
        self.transfers
            .find_transfer(transfer_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Asset transfer".into()))
    }

    /// Gerentes veem só as próprias; os demais papéis veem todas.
    pub async fn list_transfers(&self, user_id: Uuid) -> Result<Vec<AssetTransfer>, AppError> {
        let roles = self.assignments.roles_for(user_id).await?;
        let created_by = roles.is_manager_only().then_some(user_id);
        self.transfers.list_transfers(created_by).await
    }

    pub async fn get_pending_approvals(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<AssetTransferApproval>, AppError> {
        self.transfers.pending_approvals_for(user_id).await
    }
}

// "BKK-250301-0007" com prefixo "BKK-250301-" -> 7
fn sequence_of(number: &str, prefix: &str) -> Option<i64> {
    number.strip_prefix(prefix)?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::memory::{MemoryState, MemoryStore},
        models::transfer::ApprovalStatus,
    };

    // Origem em B1/R1/C1; destinos em B1 (mesma filial), B2 (mesma região) e B3/R2.
    struct Scenario {
        store: Arc<MemoryStore>,
        service: TransferService,
        manager: Uuid,
        controller_r1: Uuid,
        controller_r2: Uuid,
        manager_b1: Uuid,
        manager_b3: Uuid,
        src: Uuid,
        same_branch: Uuid,
        other_region: Uuid,
        assets: Vec<Uuid>,
    }

    fn scenario() -> Scenario {
        let mut s = MemoryState::default();
        let c1 = s.add_country("TH");
        let r1 = s.add_region(c1, "Central");
        let r2 = s.add_region(c1, "North");
        let b1 = s.add_branch(r1, "Bangkok");
        let b3 = s.add_branch(r2, "Chiang Mai");
        let src = s.add_location(Some(b1), "LOC-BKK-01");
        let same_branch = s.add_location(Some(b1), "LOC-BKK-02");
        let other_region = s.add_location(Some(b3), "LOC-CNX-01");

        let manager = Uuid::new_v4();
        let controller_r1 = Uuid::new_v4();
        let controller_r2 = Uuid::new_v4();
        let manager_b1 = Uuid::new_v4();
        let manager_b3 = Uuid::new_v4();

        s.grant(manager, Role::Manager);
        s.assign(manager, AssignmentLevel::Branch, b1);
        s.grant(controller_r1, Role::Controller);
        s.assign(controller_r1, AssignmentLevel::Region, r1);
        s.grant(controller_r2, Role::Controller);
        s.assign(controller_r2, AssignmentLevel::Region, r2);
        s.grant(manager_b1, Role::Manager);
        s.assign(manager_b1, AssignmentLevel::Branch, b1);
        s.grant(manager_b3, Role::Manager);
        s.assign(manager_b3, AssignmentLevel::Branch, b3);

        let assets = vec![
            s.add_asset(src, "A-1"),
            s.add_asset(src, "A-2"),
            s.add_asset(src, "A-3"),
        ];

        let store = Arc::new(MemoryStore::new(s));
        let service = TransferService::new(store.clone(), store.clone(), store.clone());
        Scenario {
            store,
            service,
            manager,
            controller_r1,
            controller_r2,
            manager_b1,
            manager_b3,
            src,
            same_branch,
            other_region,
            assets,
        }
    }

    fn items(ids: &[Uuid]) -> Vec<TransferItemInput> {
        ids.iter()
            .map(|id| TransferItemInput { asset_id: *id, barcode: Some(format!("BC-{}", id)) })
            .collect()
    }

    fn approval_for(detail: &TransferDetail, role: ApprovalRole) -> AssetTransferApproval {
        detail.approvals.iter().find(|a| a.role == role).cloned().unwrap()
    }

    #[tokio::test]
    async fn cross_region_transfer_needs_three_approvals() {
        let sc = scenario();

        let detail = sc
            .service
            .create_transfer(sc.src, sc.other_region, items(&sc.assets[..2]), sc.manager)
            .await
            .unwrap();

        assert_eq!(detail.transfer.status, TransferStatus::Pending);
        assert_eq!(detail.items.len(), 2);
        let chain: Vec<(ApprovalRole, Uuid)> =
            detail.approvals.iter().map(|a| (a.role, a.approver_id)).collect();
        assert_eq!(
            chain,
            vec![
                (ApprovalRole::Controller, sc.controller_r1),
                (ApprovalRole::ReceivingController, sc.controller_r2),
                (ApprovalRole::ReceivingManager, sc.manager_b3),
            ]
        );
        assert!(detail.approvals.iter().all(|a| a.status == ApprovalStatus::Pending));
    }

    #[tokio::test]
    async fn same_branch_transfer_skips_receiving_controller() {
        let sc = scenario();

        let detail = sc
            .service
            .create_transfer(sc.src, sc.same_branch, items(&sc.assets[..1]), sc.manager)
            .await
            .unwrap();

        let roles: Vec<ApprovalRole> = detail.approvals.iter().map(|a| a.role).collect();
        assert_eq!(roles, vec![ApprovalRole::Controller, ApprovalRole::ReceivingManager]);
        // O gerente atribuído primeiro à filial é o aprovador
        assert_eq!(approval_for(&detail, ApprovalRole::ReceivingManager).approver_id, sc.manager);
    }

    #[tokio::test]
    async fn transfer_number_uses_branch_code_and_daily_sequence() {
        let sc = scenario();
        let today = Utc::now().date_naive().format("%y%m%d").to_string();

        let first = sc
            .service
            .create_transfer(sc.src, sc.same_branch, items(&sc.assets[..1]), sc.manager)
            .await
            .unwrap();
        let second = sc
            .service
            .create_transfer(sc.src, sc.same_branch, items(&sc.assets[1..2]), sc.manager)
            .await
            .unwrap();

        assert_eq!(first.transfer.transfer_number, format!("BKK-{}-0001", today));
        assert_eq!(second.transfer.transfer_number, format!("BKK-{}-0002", today));
    }

    #[tokio::test]
    async fn number_collision_is_retried_with_next_sequence() {
        let sc = scenario();
        let today = Utc::now().date_naive().format("%y%m%d").to_string();
        let taken = format!("BKK-{}-0001", today);

        // Número "0002" já existe sem "0001": a contagem sozinha geraria colisão
        sc.store
            .update(|s| {
                s.transfers.push(AssetTransfer {
                    id: Uuid::new_v4(),
                    transfer_number: format!("BKK-{}-0002", today),
                    source_location_id: sc.src,
                    destination_location_id: sc.same_branch,
                    created_by: sc.manager,
                    status: TransferStatus::Rejected,
                    created_at: Utc::now(),
                });
            })
            .await;

        let detail = sc
            .service
            .create_transfer(sc.src, sc.same_branch, items(&sc.assets[..1]), sc.manager)
            .await
            .unwrap();

        assert_ne!(detail.transfer.transfer_number, taken);
        assert_eq!(detail.transfer.transfer_number, format!("BKK-{}-0003", today));
    }

    #[tokio::test]
    async fn only_managers_create_transfers() {
        let sc = scenario();

        let err = sc
            .service
            .create_transfer(sc.src, sc.other_region, items(&sc.assets[..1]), sc.controller_r1)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Forbidden(_)));
        assert!(sc.store.snapshot().await.transfers.is_empty());
    }

    #[tokio::test]
    async fn duplicate_assets_are_rejected_and_nothing_persists() {
        let sc = scenario();
        let dup = sc.assets[0];

        let err = sc
            .service
            .create_transfer(sc.src, sc.other_region, items(&[dup, dup]), sc.manager)
            .await
            .unwrap_err();

        match err {
            AppError::InvalidInput(msg) => assert_eq!(msg, "duplicate assets in transfer"),
            other => panic!("unexpected error: {:?}", other),
        }
        let state = sc.store.snapshot().await;
        assert!(state.transfers.is_empty());
        assert!(state.items.iter().all(|i| i.asset_id != dup));
    }

    #[tokio::test]
    async fn asset_in_pending_transfer_conflicts() {
        let sc = scenario();
        sc.service
            .create_transfer(sc.src, sc.other_region, items(&sc.assets[..2]), sc.manager)
            .await
            .unwrap();

        let err = sc
            .service
            .create_transfer(sc.src, sc.same_branch, items(&sc.assets[1..3]), sc.manager)
            .await
            .unwrap_err();

        match err {
            AppError::AssetInOpenTransfer(asset) => assert_eq!(asset, sc.assets[1]),
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(sc.store.snapshot().await.transfers.len(), 1);
    }

    #[tokio::test]
    async fn rejected_transfer_releases_its_assets() {
        let sc = scenario();
        let first = sc
            .service
            .create_transfer(sc.src, sc.same_branch, items(&sc.assets[..1]), sc.manager)
            .await
            .unwrap();
        let controller = approval_for(&first, ApprovalRole::Controller);
        sc.service
            .update_approval(controller.id, ApprovalDecision::Rejected, sc.controller_r1)
            .await
            .unwrap();

        let again = sc
            .service
            .create_transfer(sc.src, sc.same_branch, items(&sc.assets[..1]), sc.manager)
            .await;

        assert!(again.is_ok());
    }

    #[tokio::test]
    async fn unknown_asset_or_location_is_not_found() {
        let sc = scenario();

        let err = sc
            .service
            .create_transfer(sc.src, Uuid::new_v4(), items(&sc.assets[..1]), sc.manager)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let err = sc
            .service
            .create_transfer(sc.src, sc.other_region, items(&[Uuid::new_v4()]), sc.manager)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn empty_or_circular_transfers_are_invalid() {
        let sc = scenario();

        let err = sc
            .service
            .create_transfer(sc.src, sc.other_region, Vec::new(), sc.manager)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));

        let err = sc
            .service
            .create_transfer(sc.src, sc.src, items(&sc.assets[..1]), sc.manager)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn unroutable_transfer_is_refused() {
        let mut s = MemoryState::default();
        let c = s.add_country("TH");
        let r = s.add_region(c, "Central");
        let b = s.add_branch(r, "Bangkok");
        let src = s.add_location(Some(b), "LOC-BKK-01");
        let dst = s.add_location(Some(b), "LOC-BKK-02");
        let asset = s.add_asset(src, "A-1");
        let manager = Uuid::new_v4();
        // Gerente sem atribuição: ninguém aprovaria
        s.grant(manager, Role::Manager);
        let store = Arc::new(MemoryStore::new(s));
        let service = TransferService::new(store.clone(), store.clone(), store.clone());

        let err = service
            .create_transfer(src, dst, items(&[asset]), manager)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::InvalidInput(_)));
        assert!(store.snapshot().await.transfers.is_empty());
    }

    #[tokio::test]
    async fn failure_while_writing_approvals_rolls_everything_back() {
        let sc = scenario();
        sc.store.update(|s| s.fail_approval_inserts = true).await;

        let err = sc
            .service
            .create_transfer(sc.src, sc.other_region, items(&sc.assets[..2]), sc.manager)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::DatabaseError(_)));
        let state = sc.store.snapshot().await;
        assert!(state.transfers.is_empty());
        assert!(state.items.is_empty());
        assert!(state.approvals.is_empty());
    }

    async fn decide_all(
        sc: &Scenario,
        detail: &TransferDetail,
        order: &[(ApprovalRole, Uuid, ApprovalDecision)],
    ) {
        for (role, user, decision) in order {
            let approval = approval_for(detail, *role);
            sc.service.update_approval(approval.id, *decision, *user).await.unwrap();
        }
    }

    #[tokio::test]
    async fn approve_then_reject_ends_rejected_without_moving_assets() {
        for reverse in [false, true] {
            let sc = scenario();
            let detail = sc
                .service
                .create_transfer(sc.src, sc.same_branch, items(&sc.assets[..2]), sc.manager)
                .await
                .unwrap();

            let mut order = vec![
                (ApprovalRole::Controller, sc.controller_r1, ApprovalDecision::Approved),
                (ApprovalRole::ReceivingManager, sc.manager, ApprovalDecision::Rejected),
            ];
            if reverse {
                order.reverse();
            }

            // Com a rejeição primeiro, a segunda decisão encontra a transferência fechada
            let first = order[0];
            let approval = approval_for(&detail, first.0);
            sc.service.update_approval(approval.id, first.2, first.1).await.unwrap();
            let second = order[1];
            let approval = approval_for(&detail, second.0);
            let outcome = sc.service.update_approval(approval.id, second.2, second.1).await;
            if reverse {
                assert!(matches!(
                    outcome,
                    Err(AppError::TransferFinalized(TransferStatus::Rejected))
                ));
            } else {
                assert!(outcome.is_ok());
            }

            let state = sc.store.snapshot().await;
            let transfer = sc.service.get_transfer(detail.transfer.id).await.unwrap();
            assert_eq!(transfer.transfer.status, TransferStatus::Rejected);
            for asset in &sc.assets[..2] {
                assert_eq!(state.asset_location(*asset), Some(sc.src));
            }
        }
    }

    #[tokio::test]
    async fn all_approvals_move_assets_in_any_order() {
        for reverse in [false, true] {
            let sc = scenario();
            let detail = sc
                .service
                .create_transfer(sc.src, sc.same_branch, items(&sc.assets[..2]), sc.manager)
                .await
                .unwrap();

            let mut order = vec![
                (ApprovalRole::Controller, sc.controller_r1, ApprovalDecision::Approved),
                (ApprovalRole::ReceivingManager, sc.manager, ApprovalDecision::Approved),
            ];
            if reverse {
                order.reverse();
            }

            // Depois da primeira aprovação, nada se move ainda
            let (role, user, decision) = order[0];
            sc.service
                .update_approval(approval_for(&detail, role).id, decision, user)
                .await
                .unwrap();
            let midway = sc.store.snapshot().await;
            assert_eq!(midway.asset_location(sc.assets[0]), Some(sc.src));

            decide_all(&sc, &detail, &order[1..]).await;

            let state = sc.store.snapshot().await;
            let transfer = sc.service.get_transfer(detail.transfer.id).await.unwrap();
            assert_eq!(transfer.transfer.status, TransferStatus::Approved);
            for asset in &sc.assets[..2] {
                assert_eq!(state.asset_location(*asset), Some(sc.same_branch));
            }
            // Ativo fora da transferência não muda
            assert_eq!(state.asset_location(sc.assets[2]), Some(sc.src));
        }
    }

    #[tokio::test]
    async fn non_approver_cannot_decide() {
        let sc = scenario();
        let detail = sc
            .service
            .create_transfer(sc.src, sc.other_region, items(&sc.assets[..1]), sc.manager)
            .await
            .unwrap();
        let approval = approval_for(&detail, ApprovalRole::Controller);

        let err = sc
            .service
            .update_approval(approval.id, ApprovalDecision::Approved, sc.controller_r2)
            .await
            .unwrap_err();

        match err {
            AppError::Forbidden(msg) => assert_eq!(msg, "not authorized to approve this transfer"),
            other => panic!("unexpected error: {:?}", other),
        }
        let state = sc.store.snapshot().await;
        let stored = state.approvals.iter().find(|a| a.id == approval.id).unwrap();
        assert_eq!(stored.status, ApprovalStatus::Pending);
        assert!(stored.approved_at.is_none());
    }

    #[tokio::test]
    async fn unknown_approval_is_not_found() {
        let sc = scenario();

        let err = sc
            .service
            .update_approval(Uuid::new_v4(), ApprovalDecision::Approved, sc.manager)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn approved_transfer_is_locked() {
        let sc = scenario();
        let detail = sc
            .service
            .create_transfer(sc.src, sc.same_branch, items(&sc.assets[..1]), sc.manager)
            .await
            .unwrap();
        decide_all(
            &sc,
            &detail,
            &[
                (ApprovalRole::Controller, sc.controller_r1, ApprovalDecision::Approved),
                (ApprovalRole::ReceivingManager, sc.manager, ApprovalDecision::Approved),
            ],
        )
        .await;

        let controller = approval_for(&detail, ApprovalRole::Controller);
        let err = sc
            .service
            .update_approval(controller.id, ApprovalDecision::Rejected, sc.controller_r1)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::TransferFinalized(TransferStatus::Approved)));
        let transfer = sc.service.get_transfer(detail.transfer.id).await.unwrap();
        assert_eq!(transfer.transfer.status, TransferStatus::Approved);
    }

    #[tokio::test]
    async fn queries_filter_by_creator_and_pending_state() {
        let sc = scenario();
        let detail = sc
            .service
            .create_transfer(sc.src, sc.other_region, items(&sc.assets[..1]), sc.manager)
            .await
            .unwrap();

        // Outro gerente não vê a transferência; o controller vê todas
        assert!(sc.service.list_transfers(sc.manager_b1).await.unwrap().is_empty());
        assert_eq!(sc.service.list_transfers(sc.manager).await.unwrap().len(), 1);
        assert_eq!(sc.service.list_transfers(sc.controller_r2).await.unwrap().len(), 1);

        let pending = sc.service.get_pending_approvals(sc.controller_r1).await.unwrap();
        assert_eq!(pending.len(), 1);
        sc.service
            .update_approval(pending[0].id, ApprovalDecision::Approved, sc.controller_r1)
            .await
            .unwrap();
        assert!(sc.service.get_pending_approvals(sc.controller_r1).await.unwrap().is_empty());

        let err = sc.service.get_transfer(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(sc.service.get_transfer(detail.transfer.id).await.unwrap().items.len(), 1);
    }
}
