// src/db/hierarchy_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::stores::HierarchyStore,
    models::hierarchy::{Branch, Country, HierarchyIds, Location, LocationLineage, Region},
};

#[derive(Clone)]
pub struct HierarchyRepository {
    pool: PgPool,
}

impl HierarchyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn ids_of(&self, sql: &str) -> Result<Vec<Uuid>, AppError> {
        let ids = sqlx::query_scalar::<_, Uuid>(sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(ids)
    }

    async fn child_ids(&self, sql: &str, parent_id: Uuid) -> Result<Vec<Uuid>, AppError> {
        let ids = sqlx::query_scalar::<_, Uuid>(sql)
            .bind(parent_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(ids)
    }

    // ---
    // Listagens filtradas pelo escopo.
    // `allowed = None` significa sem filtro (admin).
    // ---

    pub async fn list_countries(&self, allowed: Option<&[Uuid]>) -> Result<Vec<Country>, AppError> {
        let countries = sqlx::query_as::<_, Country>(
            r#"
            SELECT id, name, code, accounting_manager_id, created_at, updated_at
            FROM countries
            WHERE ($1::uuid[] IS NULL OR id = ANY($1))
            ORDER BY name ASC
            "#,
        )
            .bind(allowed)
            .fetch_all(&self.pool)
            .await?;
        Ok(countries)
    }

    pub async fn list_regions(&self, allowed: Option<&[Uuid]>) -> Result<Vec<Region>, AppError> {
        let regions = sqlx::query_as::<_, Region>(
            r#"
            SELECT id, name, country_id, controller_id, created_at, updated_at
            FROM regions
            WHERE ($1::uuid[] IS NULL OR id = ANY($1))
            ORDER BY name ASC
            "#,
        )
            .bind(allowed)
            .fetch_all(&self.pool)
            .await?;
        Ok(regions)
    }

    pub async fn list_branches(&self, allowed: Option<&[Uuid]>) -> Result<Vec<Branch>, AppError> {
        let branches = sqlx::query_as::<_, Branch>(
            r#"
            SELECT id, name, region_id, country_id, manager_id, created_at, updated_at
            FROM branches
            WHERE ($1::uuid[] IS NULL OR id = ANY($1))
            ORDER BY name ASC
            "#,
        )
            .bind(allowed)
            .fetch_all(&self.pool)
            .await?;
        Ok(branches)
    }

    pub async fn list_locations(
        &self,
        allowed: Option<&[Uuid]>,
    ) -> Result<Vec<Location>, AppError> {
        let locations = sqlx::query_as::<_, Location>(
            r#"
            SELECT id, name, description, erp_location_id, branch_id, created_at, updated_at
            FROM locations
            WHERE ($1::uuid[] IS NULL OR id = ANY($1))
            ORDER BY name ASC
            "#,
        )
            .bind(allowed)
            .fetch_all(&self.pool)
            .await?;
        Ok(locations)
    }

    /// Contagem de uma tabela da hierarquia, com o mesmo filtro das listagens.
    pub async fn count(
        &self,
        table: HierarchyTable,
        allowed: Option<&[Uuid]>,
    ) -> Result<i64, AppError> {
        let sql = format!(
            "SELECT COUNT(*) FROM {} WHERE ($1::uuid[] IS NULL OR id = ANY($1))",
            table.as_str()
        );
        let count = sqlx::query_scalar::<_, i64>(&sql)
            .bind(allowed)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

/// Tabelas contáveis. O nome vem daqui, nunca da requisição.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HierarchyTable {
    Countries,
    Regions,
    Branches,
    Locations,
}

impl HierarchyTable {
    fn as_str(&self) -> &'static str {
        match self {
            HierarchyTable::Countries => "countries",
            HierarchyTable::Regions => "regions",
            HierarchyTable::Branches => "branches",
            HierarchyTable::Locations => "locations",
        }
    }
}

#[async_trait]
impl HierarchyStore for HierarchyRepository {
    async fn all_ids(&self) -> Result<HierarchyIds, AppError> {
        Ok(HierarchyIds {
            country_ids: self.ids_of("SELECT id FROM countries").await?,
            region_ids: self.ids_of("SELECT id FROM regions").await?,
            branch_ids: self.ids_of("SELECT id FROM branches").await?,
            location_ids: self.ids_of("SELECT id FROM locations").await?,
        })
    }

    async fn region_ids_in_country(&self, country_id: Uuid) -> Result<Vec<Uuid>, AppError> {
        self.child_ids("SELECT id FROM regions WHERE country_id = $1", country_id).await
    }

    async fn branch_ids_in_region(&self, region_id: Uuid) -> Result<Vec<Uuid>, AppError> {
        self.child_ids("SELECT id FROM branches WHERE region_id = $1", region_id).await
    }

    async fn location_ids_in_branch(&self, branch_id: Uuid) -> Result<Vec<Uuid>, AppError> {
        self.child_ids("SELECT id FROM locations WHERE branch_id = $1", branch_id).await
    }

    async fn find_region(&self, region_id: Uuid) -> Result<Option<Region>, AppError> {
        let region = sqlx::query_as::<_, Region>(
            "SELECT id, name, country_id, controller_id, created_at, updated_at FROM regions WHERE id = $1",
        )
            .bind(region_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(region)
    }

    async fn find_branch(&self, branch_id: Uuid) -> Result<Option<Branch>, AppError> {
        let branch = sqlx::query_as::<_, Branch>(
            "SELECT id, name, region_id, country_id, manager_id, created_at, updated_at FROM branches WHERE id = $1",
        )
            .bind(branch_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(branch)
    }

    async fn location_lineage(
        &self,
        location_id: Uuid,
    ) -> Result<Option<LocationLineage>, AppError> {
        // LEFT JOIN: um local sem filial ainda devolve a linha, com os elos nulos.
        let lineage = sqlx::query_as::<_, LocationLineage>(
            r#"
            SELECT
                l.id   AS location_id,
                l.name AS location_name,
                b.id   AS branch_id,
                r.id   AS region_id,
                r.country_id AS country_id
            FROM locations l
            LEFT JOIN branches b ON b.id = l.branch_id
            LEFT JOIN regions r ON r.id = b.region_id
            WHERE l.id = $1
            "#,
        )
            .bind(location_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(lineage)
    }
}
