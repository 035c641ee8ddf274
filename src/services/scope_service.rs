// src/services/scope_service.rs

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::stores::{AssignmentStore, HierarchyStore},
    models::access::{AccessScope, AssignmentLevel, Role},
};

/// Resolve o escopo de acesso (linhas visíveis) de um usuário.
/// Só leitura: nunca altera os stores.
#[derive(Clone)]
pub struct ScopeResolver {
    hierarchy: Arc<dyn HierarchyStore>,
    assignments: Arc<dyn AssignmentStore>,
}

impl ScopeResolver {
    pub fn new(hierarchy: Arc<dyn HierarchyStore>, assignments: Arc<dyn AssignmentStore>) -> Self {
        Self { hierarchy, assignments }
    }

    pub async fn resolve_scope(&self, user_id: Uuid) -> Result<AccessScope, AppError> {
        let roles = self.assignments.roles_for(user_id).await?;
        if roles.is_empty() {
            tracing::debug!(%user_id, "usuário sem papéis, escopo vazio");
            return Ok(AccessScope::default());
        }

        // 1. Admin enxerga tudo e encerra aqui
        if roles.is_admin() {
            let all = self.hierarchy.all_ids().await?;
            return Ok(AccessScope::unrestricted(all));
        }

        let mut scope = AccessScope::default();

        // 2. Accounting manager: países atribuídos + tudo abaixo
        if roles.contains(Role::AccountingManager) {
            let countries = self
                .assignments
                .assignment_targets(user_id, AssignmentLevel::Country)
                .await?;
            for country_id in countries {
                scope.country_ids.insert(country_id);
                for region_id in self.hierarchy.region_ids_in_country(country_id).await? {
                    scope.region_ids.insert(region_id);
                    self.add_region_closure(&mut scope, region_id).await?;
                }
            }
        }

        // 3. Controller: regiões atribuídas + país pai + tudo abaixo (sem regiões irmãs)
        if roles.contains(Role::Controller) {
            let regions = self
                .assignments
                .assignment_targets(user_id, AssignmentLevel::Region)
                .await?;
            for region_id in regions {
                scope.region_ids.insert(region_id);
                if let Some(region) = self.hierarchy.find_region(region_id).await? {
                    scope.country_ids.insert(region.country_id);
                }
                self.add_region_closure(&mut scope, region_id).await?;
            }
        }

        // 4. Manager / user: filiais atribuídas + região e país pais + locais
        if roles.contains(Role::Manager) || roles.contains(Role::User) {
            let branches = self
                .assignments
                .assignment_targets(user_id, AssignmentLevel::Branch)
                .await?;
            for branch_id in branches {
                scope.branch_ids.insert(branch_id);
                if let Some(branch) = self.hierarchy.find_branch(branch_id).await? {
                    scope.region_ids.insert(branch.region_id);
                    if let Some(country_id) = branch.country_id {
                        scope.country_ids.insert(country_id);
                    }
                }
                self.add_branch_locations(&mut scope, branch_id).await?;
            }
        }

        // Guest (ou nenhum papel): escopo vazio, bloqueio total
        tracing::debug!(
            %user_id,
            countries = scope.country_ids.len(),
            regions = scope.region_ids.len(),
            branches = scope.branch_ids.len(),
            locations = scope.location_ids.len(),
            "escopo resolvido"
        );

        Ok(scope)
    }

    // Filiais da região e os locais de cada uma
    async fn add_region_closure(
        &self,
        scope: &mut AccessScope,
        region_id: Uuid,
    ) -> Result<(), AppError> {
        for branch_id in self.hierarchy.branch_ids_in_region(region_id).await? {
            scope.branch_ids.insert(branch_id);
            self.add_branch_locations(scope, branch_id).await?;
        }
        Ok(())
    }

    async fn add_branch_locations(
        &self,
        scope: &mut AccessScope,
        branch_id: Uuid,
    ) -> Result<(), AppError> {
        let locations = self.hierarchy.location_ids_in_branch(branch_id).await?;
        scope.location_ids.extend(locations);
        Ok(())
    }
}
