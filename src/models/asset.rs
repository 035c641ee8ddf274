// src/models/asset.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

pub const DEFAULT_PAGE_SIZE: i64 = 100;
pub const MAX_PAGE_SIZE: i64 = 500;

// Ativo físico. A coluna `location` é alterada pelo CRUD, pela sincronização
// com o ERP e, na aprovação final, pelo fluxo de transferência.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub id: Uuid,
    #[schema(example = "ERP-000123")]
    pub erp_asset_id: String,
    #[schema(example = "Notebook Dell Latitude")]
    pub name: String,
    #[schema(example = "8850000123456")]
    pub barcode: Option<String>,
    pub model: Option<String>,
    pub build: Option<String>,
    pub category: Option<String>,
    pub location: Option<Uuid>,
    #[schema(example = "active")]
    pub status: String,
    pub last_seen: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub synced_at: Option<DateTime<Utc>>,
}

/// Filtros da listagem de ativos (query string).
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct AssetQuery {
    /// Busca em nome, código de barras e modelo
    pub search: Option<String>,
    pub status: Option<String>,
    pub category: Option<String>,
    pub location: Option<Uuid>,
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

impl AssetQuery {
    pub fn offset(&self) -> i64 {
        self.skip.unwrap_or(0).max(0)
    }

    pub fn page_size(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
    }

    /// Padrão ILIKE para a busca, já com os curingas escapados.
    pub fn search_pattern(&self) -> Option<String> {
        let term = self.search.as_deref()?.trim();
        if term.is_empty() {
            return None;
        }
        let escaped = term
            .replace('\\', "\\\\")
            .replace('%', "\\%")
            .replace('_', "\\_");
        Some(format!("%{}%", escaped))
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CountResponse {
    pub count: i64,
}
