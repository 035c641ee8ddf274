// src/models/access.rs

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::hierarchy::HierarchyIds;

// --- Papéis ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "app_role", rename_all = "snake_case")] // Banco
#[serde(rename_all = "snake_case")] // JSON
pub enum Role {
    Admin,
    AccountingManager,
    Controller,
    Manager,
    User,
    Guest,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::AccountingManager => "accounting_manager",
            Role::Controller => "controller",
            Role::Manager => "manager",
            Role::User => "user",
            Role::Guest => "guest",
        }
    }
}

/// Papel concedido a um usuário (linha de `user_roles`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserRole {
    pub user_id: Uuid,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// Conjunto de papéis de um usuário. Em princípio um usuário pode ter mais de um.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleSet(HashSet<Role>);

impl RoleSet {
    pub fn contains(&self, role: Role) -> bool {
        self.0.contains(&role)
    }

    pub fn is_admin(&self) -> bool {
        self.contains(Role::Admin)
    }

    /// Gerente "puro": não tem nenhum papel que enxerga além das próprias transferências.
    pub fn is_manager_only(&self) -> bool {
        self.contains(Role::Manager)
            && !self.contains(Role::Admin)
            && !self.contains(Role::AccountingManager)
            && !self.contains(Role::Controller)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Role> for RoleSet {
    fn from_iter<I: IntoIterator<Item = Role>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

// --- Atribuições ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentLevel {
    Country,
    Region,
    Branch,
}

impl AssignmentLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssignmentLevel::Country => "country",
            AssignmentLevel::Region => "region",
            AssignmentLevel::Branch => "branch",
        }
    }
}

/// Linha de atribuição (usuário -> país/região/filial).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserAssignment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub level: AssignmentLevel,
    pub target_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Comando explícito para criar uma atribuição.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewAssignment {
    pub user_id: Uuid,
    pub level: AssignmentLevel,
    pub target_id: Uuid,
}

// ---
// Escopo de acesso: os nós da hierarquia em que o usuário pode atuar.
// ---
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccessScope {
    #[schema(value_type = Vec<Uuid>)]
    pub country_ids: HashSet<Uuid>,
    #[schema(value_type = Vec<Uuid>)]
    pub region_ids: HashSet<Uuid>,
    #[schema(value_type = Vec<Uuid>)]
    pub branch_ids: HashSet<Uuid>,
    #[schema(value_type = Vec<Uuid>)]
    pub location_ids: HashSet<Uuid>,
    pub is_admin: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeLevel {
    Country,
    Region,
    Branch,
    Location,
}

impl AccessScope {
    pub fn unrestricted(all: HierarchyIds) -> Self {
        Self {
            country_ids: all.country_ids.into_iter().collect(),
            region_ids: all.region_ids.into_iter().collect(),
            branch_ids: all.branch_ids.into_iter().collect(),
            location_ids: all.location_ids.into_iter().collect(),
            is_admin: true,
        }
    }

    pub fn is_empty(&self) -> bool {
        !self.is_admin
            && self.country_ids.is_empty()
            && self.region_ids.is_empty()
            && self.branch_ids.is_empty()
            && self.location_ids.is_empty()
    }

    pub fn ids(&self, level: ScopeLevel) -> &HashSet<Uuid> {
        match level {
            ScopeLevel::Country => &self.country_ids,
            ScopeLevel::Region => &self.region_ids,
            ScopeLevel::Branch => &self.branch_ids,
            ScopeLevel::Location => &self.location_ids,
        }
    }

    /// IDs para filtrar uma listagem. `None` = sem filtro (admin).
    pub fn filter(&self, level: ScopeLevel) -> Option<Vec<Uuid>> {
        if self.is_admin {
            return None;
        }
        let mut ids: Vec<Uuid> = self.ids(level).iter().copied().collect();
        ids.sort();
        Some(ids)
    }

    pub fn allows(&self, level: ScopeLevel, id: Uuid) -> bool {
        self.is_admin || self.ids(level).contains(&id)
    }
}
