// src/services/assignment_service.rs

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{stores::AssignmentStore, AssignmentRepository},
    models::access::{AssignmentLevel, NewAssignment, Role, RoleSet, UserAssignment, UserRole},
};

// Gestão de papéis e das atribuições usuário -> país/região/filial. Só admin.
#[derive(Clone)]
pub struct AssignmentService {
    assignment_repo: AssignmentRepository,
    roles: Arc<dyn AssignmentStore>,
}

impl AssignmentService {
    pub fn new(assignment_repo: AssignmentRepository, roles: Arc<dyn AssignmentStore>) -> Self {
        Self { assignment_repo, roles }
    }

    async fn require_admin(&self, actor_id: Uuid) -> Result<(), AppError> {
        let roles = self.roles.roles_for(actor_id).await?;
        ensure_admin(&roles)
    }

    pub async fn assign(
        &self,
        actor_id: Uuid,
        cmd: NewAssignment,
    ) -> Result<UserAssignment, AppError> {
        self.require_admin(actor_id).await?;

        let assignment = self.assignment_repo.create_assignment(cmd).await?;
        tracing::info!(
            assignment_id = %assignment.id,
            user_id = %cmd.user_id,
            level = cmd.level.as_str(),
            target_id = %cmd.target_id,
            "atribuição criada"
        );
        Ok(assignment)
    }

    pub async fn remove(
        &self,
        actor_id: Uuid,
        level: AssignmentLevel,
        assignment_id: Uuid,
    ) -> Result<(), AppError> {
        self.require_admin(actor_id).await?;

        self.assignment_repo.delete_assignment(level, assignment_id).await?;
        tracing::info!(%assignment_id, level = level.as_str(), "atribuição removida");
        Ok(())
    }

    pub async fn list_for_user(
        &self,
        actor_id: Uuid,
        user_id: Uuid,
    ) -> Result<Vec<UserAssignment>, AppError> {
        self.require_admin(actor_id).await?;
        self.assignment_repo.list_for_user(user_id).await
    }

    pub async fn grant_role(
        &self,
        actor_id: Uuid,
        user_id: Uuid,
        role: Role,
    ) -> Result<UserRole, AppError> {
        self.require_admin(actor_id).await?;

        let granted = self.assignment_repo.grant_role(user_id, role).await?;
        tracing::info!(%actor_id, %user_id, role = role.as_str(), "papel concedido");
        Ok(granted)
    }

    pub async fn revoke_role(
        &self,
        actor_id: Uuid,
        user_id: Uuid,
        role: Role,
    ) -> Result<(), AppError> {
        self.require_admin(actor_id).await?;
        ensure_not_self_demotion(actor_id, user_id, role)?;

        self.assignment_repo.revoke_role(user_id, role).await?;
        tracing::info!(%actor_id, %user_id, role = role.as_str(), "papel revogado");
        Ok(())
    }

    pub async fn list_roles(
        &self,
        actor_id: Uuid,
        user_id: Uuid,
    ) -> Result<Vec<UserRole>, AppError> {
        self.require_admin(actor_id).await?;
        self.assignment_repo.list_roles(user_id).await
    }
}

fn ensure_admin(roles: &RoleSet) -> Result<(), AppError> {
    if roles.is_admin() {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "only administrators can manage user roles and assignments".into(),
        ))
    }
}

// Um admin não tira o próprio papel de admin
fn ensure_not_self_demotion(actor_id: Uuid, user_id: Uuid, role: Role) -> Result<(), AppError> {
    if actor_id == user_id && role == Role::Admin {
        Err(AppError::Forbidden("administrators cannot revoke their own admin role".into()))
    } else {
        Ok(())
    }
}
