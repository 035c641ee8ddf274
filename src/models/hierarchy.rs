// src/models/hierarchy.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// ---
// 1. Country (O topo da hierarquia)
// ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Country {
    pub id: Uuid,
    #[schema(example = "Thailand")]
    pub name: String,
    #[schema(example = "TH")]
    pub code: String,
    pub accounting_manager_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---
// 2. Region
// ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Region {
    pub id: Uuid,
    #[schema(example = "Central")]
    pub name: String,
    pub country_id: Uuid,
    pub controller_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---
// 3. Branch (Filial)
// ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Branch {
    pub id: Uuid,
    #[schema(example = "Bangkok HQ")]
    pub name: String,
    pub region_id: Uuid,
    // Desnormalizado: pode estar vazio em filiais antigas
    pub country_id: Option<Uuid>,
    pub manager_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---
// 4. Location (O "Local" físico dos ativos)
// ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub id: Uuid,
    #[schema(example = "LOC-BKK-01")]
    pub name: String,
    pub description: Option<String>,
    pub erp_location_id: Option<String>,
    pub branch_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Todos os IDs de cada nível da hierarquia (usado para o escopo de admin).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HierarchyIds {
    pub country_ids: Vec<Uuid>,
    pub region_ids: Vec<Uuid>,
    pub branch_ids: Vec<Uuid>,
    pub location_ids: Vec<Uuid>,
}

/// Caminho reverso de um local até o país: location -> branch -> region -> country.
/// Cada elo é opcional porque um local pode não ter filial.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct LocationLineage {
    pub location_id: Uuid,
    pub location_name: String,
    pub branch_id: Option<Uuid>,
    pub region_id: Option<Uuid>,
    pub country_id: Option<Uuid>,
}
