// src/services/catalog_service.rs

use crate::{
    common::error::AppError,
    db::{hierarchy_repo::HierarchyTable, AssetRepository, HierarchyRepository},
    models::{
        access::{AccessScope, ScopeLevel},
        asset::{Asset, AssetQuery},
        hierarchy::{Branch, Country, Location, Region},
    },
};

// Leituras do catálogo (hierarquia + ativos) sempre recortadas pelo escopo.
#[derive(Clone)]
pub struct CatalogService {
    hierarchy_repo: HierarchyRepository,
    asset_repo: AssetRepository,
}

impl CatalogService {
    pub fn new(hierarchy_repo: HierarchyRepository, asset_repo: AssetRepository) -> Self {
        Self { hierarchy_repo, asset_repo }
    }

    pub async fn list_countries(&self, scope: &AccessScope) -> Result<Vec<Country>, AppError> {
        if scope.is_empty() {
            return Ok(Vec::new());
        }
        let allowed = scope.filter(ScopeLevel::Country);
        self.hierarchy_repo.list_countries(allowed.as_deref()).await
    }

    pub async fn list_regions(&self, scope: &AccessScope) -> Result<Vec<Region>, AppError> {
        if scope.is_empty() {
            return Ok(Vec::new());
        }
        let allowed = scope.filter(ScopeLevel::Region);
        self.hierarchy_repo.list_regions(allowed.as_deref()).await
    }

    pub async fn list_branches(&self, scope: &AccessScope) -> Result<Vec<Branch>, AppError> {
        if scope.is_empty() {
            return Ok(Vec::new());
        }
        let allowed = scope.filter(ScopeLevel::Branch);
        self.hierarchy_repo.list_branches(allowed.as_deref()).await
    }

    pub async fn list_locations(&self, scope: &AccessScope) -> Result<Vec<Location>, AppError> {
        if scope.is_empty() {
            return Ok(Vec::new());
        }
        let allowed = scope.filter(ScopeLevel::Location);
        self.hierarchy_repo.list_locations(allowed.as_deref()).await
    }

    pub async fn count(&self, scope: &AccessScope, level: ScopeLevel) -> Result<i64, AppError> {
        if scope.is_empty() {
            return Ok(0);
        }
        let allowed = scope.filter(level);
        self.hierarchy_repo
            .count(table_for(level), allowed.as_deref())
            .await
    }

    // --- Ativos: filtrados pelos locais do escopo ---

    pub async fn list_assets(
        &self,
        scope: &AccessScope,
        query: &AssetQuery,
    ) -> Result<Vec<Asset>, AppError> {
        if !asset_query_in_scope(scope, query) {
            return Ok(Vec::new());
        }
        let allowed = scope.filter(ScopeLevel::Location);
        self.asset_repo.list_assets(allowed.as_deref(), query).await
    }

    pub async fn count_assets(
        &self,
        scope: &AccessScope,
        query: &AssetQuery,
    ) -> Result<i64, AppError> {
        if !asset_query_in_scope(scope, query) {
            return Ok(0);
        }
        let allowed = scope.filter(ScopeLevel::Location);
        self.asset_repo.count_assets(allowed.as_deref(), query).await
    }
}

// Escopo vazio ou filtro por um local fora do escopo: nada a consultar
fn asset_query_in_scope(scope: &AccessScope, query: &AssetQuery) -> bool {
    if scope.is_empty() {
        return false;
    }
    query
        .location
        .is_none_or(|location| scope.allows(ScopeLevel::Location, location))
}

fn table_for(level: ScopeLevel) -> HierarchyTable {
    match level {
        ScopeLevel::Country => HierarchyTable::Countries,
        ScopeLevel::Region => HierarchyTable::Regions,
        ScopeLevel::Branch => HierarchyTable::Branches,
        ScopeLevel::Location => HierarchyTable::Locations,
    }
}
