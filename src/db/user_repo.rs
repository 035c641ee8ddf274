use sqlx::PgPool;
use uuid::Uuid;
use crate::{common::error::AppError, models::auth::User};

// O repositório de usuários. Cadastro e senha ficam com o serviço de identidade;
// aqui só confirmamos que o dono do token existe e está ativo.
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Busca um usuário ativo pelo seu ID
    pub async fn find_active_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, display_name, is_active, created_at, updated_at
            FROM users
            WHERE id = $1 AND is_active
            "#,
        )
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }
}
