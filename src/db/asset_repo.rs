// src/db/asset_repo.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::asset::{Asset, AssetQuery},
};

#[derive(Clone)]
pub struct AssetRepository {
    pool: PgPool,
}

// Mesmo WHERE para listagem e contagem:
// $1 = locais permitidos (NULL = admin), $2 = busca, $3 = status, $4 = categoria, $5 = local
const ASSET_FILTER: &str = r#"
    WHERE ($1::uuid[] IS NULL OR location = ANY($1))
      AND ($2::text IS NULL OR name ILIKE $2 OR barcode ILIKE $2 OR model ILIKE $2)
      AND ($3::text IS NULL OR status = $3)
      AND ($4::text IS NULL OR category = $4)
      AND ($5::uuid IS NULL OR location = $5)
"#;

impl AssetRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_assets(
        &self,
        allowed_locations: Option<&[Uuid]>,
        query: &AssetQuery,
    ) -> Result<Vec<Asset>, AppError> {
        let sql = format!(
            r#"
            SELECT id, erp_asset_id, name, barcode, model, build, category, location,
                   status, last_seen, created_at, updated_at, synced_at
            FROM assets
            {}
            ORDER BY name ASC, id ASC
            OFFSET $6 LIMIT $7
            "#,
            ASSET_FILTER
        );

        let assets = sqlx::query_as::<_, Asset>(&sql)
            .bind(allowed_locations)
            .bind(query.search_pattern())
            .bind(query.status.as_deref())
            .bind(query.category.as_deref())
            .bind(query.location)
            .bind(query.offset())
            .bind(query.page_size())
            .fetch_all(&self.pool)
            .await?;
        Ok(assets)
    }

    pub async fn count_assets(
        &self,
        allowed_locations: Option<&[Uuid]>,
        query: &AssetQuery,
    ) -> Result<i64, AppError> {
        let sql = format!("SELECT COUNT(*) FROM assets {}", ASSET_FILTER);

        let count = sqlx::query_scalar::<_, i64>(&sql)
            .bind(allowed_locations)
            .bind(query.search_pattern())
            .bind(query.status.as_deref())
            .bind(query.category.as_deref())
            .bind(query.location)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
