// src/db/assignment_repo.rs

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::stores::AssignmentStore,
    models::access::{AssignmentLevel, NewAssignment, Role, RoleSet, UserAssignment, UserRole},
};

// Tabela e coluna-alvo de cada nível de atribuição
fn assignment_table(level: AssignmentLevel) -> (&'static str, &'static str) {
    match level {
        AssignmentLevel::Country => ("user_country_assignments", "country_id"),
        AssignmentLevel::Region => ("user_region_assignments", "region_id"),
        AssignmentLevel::Branch => ("user_branch_assignments", "branch_id"),
    }
}

#[derive(Debug, FromRow)]
struct AssignmentRow {
    id: Uuid,
    user_id: Uuid,
    target_id: Uuid,
    created_at: DateTime<Utc>,
}

impl AssignmentRow {
    fn into_assignment(self, level: AssignmentLevel) -> UserAssignment {
        UserAssignment {
            id: self.id,
            user_id: self.user_id,
            level,
            target_id: self.target_id,
            created_at: self.created_at,
        }
    }
}

#[derive(Clone)]
pub struct AssignmentRepository {
    pool: PgPool,
}

impl AssignmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_assignment(&self, cmd: NewAssignment) -> Result<UserAssignment, AppError> {
        let (table, column) = assignment_table(cmd.level);
        let sql = format!(
            "INSERT INTO {table} (user_id, {column}) VALUES ($1, $2) \
             RETURNING id, user_id, {column} AS target_id, created_at"
        );

        sqlx::query_as::<_, AssignmentRow>(&sql)
            .bind(cmd.user_id)
            .bind(cmd.target_id)
            .fetch_one(&self.pool)
            .await
            .map(|row| row.into_assignment(cmd.level))
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.is_unique_violation() {
                        return AppError::Conflict(format!(
                            "user already assigned to this {}",
                            cmd.level.as_str()
                        ));
                    }
                    if db_err.is_foreign_key_violation() {
                        return AppError::NotFound(format!(
                            "{} or user",
                            cmd.level.as_str()
                        ));
                    }
                }
                e.into()
            })
    }

    pub async fn delete_assignment(
        &self,
        level: AssignmentLevel,
        assignment_id: Uuid,
    ) -> Result<(), AppError> {
        let (table, _) = assignment_table(level);
        let result = sqlx::query(&format!("DELETE FROM {table} WHERE id = $1"))
            .bind(assignment_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Assignment".into()));
        }
        Ok(())
    }

    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<UserAssignment>, AppError> {
        let mut assignments = Vec::new();

        for level in [AssignmentLevel::Country, AssignmentLevel::Region, AssignmentLevel::Branch] {
            let (table, column) = assignment_table(level);
            let sql = format!(
                "SELECT id, user_id, {column} AS target_id, created_at FROM {table} \
                 WHERE user_id = $1 ORDER BY created_at ASC"
            );
            let rows = sqlx::query_as::<_, AssignmentRow>(&sql)
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?;
            assignments.extend(rows.into_iter().map(|row| row.into_assignment(level)));
        }

        Ok(assignments)
    }

    // --- Papéis ---

    pub async fn grant_role(&self, user_id: Uuid, role: Role) -> Result<UserRole, AppError> {
        sqlx::query_as::<_, UserRole>(
            "INSERT INTO user_roles (user_id, role) VALUES ($1, $2) \
             RETURNING user_id, role, created_at",
        )
        .bind(user_id)
        .bind(role)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::Conflict(format!(
                        "user already has role {}",
                        role.as_str()
                    ));
                }
                if db_err.is_foreign_key_violation() {
                    return AppError::NotFound("User".into());
                }
            }
            e.into()
        })
    }

    pub async fn revoke_role(&self, user_id: Uuid, role: Role) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM user_roles WHERE user_id = $1 AND role = $2")
            .bind(user_id)
            .bind(role)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Role assignment".into()));
        }
        Ok(())
    }

    pub async fn list_roles(&self, user_id: Uuid) -> Result<Vec<UserRole>, AppError> {
        let roles = sqlx::query_as::<_, UserRole>(
            "SELECT user_id, role, created_at FROM user_roles \
             WHERE user_id = $1 ORDER BY created_at ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(roles)
    }
}

#[async_trait]
impl AssignmentStore for AssignmentRepository {
    async fn roles_for(&self, user_id: Uuid) -> Result<RoleSet, AppError> {
        let roles = sqlx::query_scalar::<_, Role>("SELECT role FROM user_roles WHERE user_id = $1")
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(roles.into_iter().collect())
    }

    async fn assignment_targets(
        &self,
        user_id: Uuid,
        level: AssignmentLevel,
    ) -> Result<HashSet<Uuid>, AppError> {
        let (table, column) = assignment_table(level);
        let sql = format!("SELECT {column} FROM {table} WHERE user_id = $1");
        let ids = sqlx::query_scalar::<_, Uuid>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(ids.into_iter().collect())
    }

    async fn first_assignee_with_role(
        &self,
        level: AssignmentLevel,
        target_id: Uuid,
        role: Role,
    ) -> Result<Option<Uuid>, AppError> {
        let (table, column) = assignment_table(level);
        let sql = format!(
            "SELECT a.user_id FROM {table} a \
             JOIN user_roles ur ON ur.user_id = a.user_id AND ur.role = $2 \
             JOIN users u ON u.id = a.user_id AND u.is_active \
             WHERE a.{column} = $1 \
             ORDER BY a.created_at ASC, a.id ASC \
             LIMIT 1"
        );
        let user_id = sqlx::query_scalar::<_, Uuid>(&sql)
            .bind(target_id)
            .bind(role)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user_id)
    }
}
