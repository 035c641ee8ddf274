// src/services/auth.rs

use jsonwebtoken::{decode, DecodingKey, Validation};

use crate::{
    common::error::AppError,
    db::UserRepository,
    models::auth::{Claims, User},
};

// Só valida tokens. A emissão fica com o serviço de identidade.
#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    jwt_secret: String,
}

impl AuthService {
    pub fn new(user_repo: UserRepository, jwt_secret: String) -> Self {
        Self { user_repo, jwt_secret }
    }

    pub async fn validate_token(&self, token: &str) -> Result<User, AppError> {
        let claims = decode_claims(token, &self.jwt_secret)?;

        // Token válido de usuário desativado/removido também é rejeitado
        self.user_repo
            .find_active_by_id(claims.sub)
            .await?
            .ok_or(AppError::InvalidToken)
    }
}

fn decode_claims(token: &str, secret: &str) -> Result<Claims, AppError> {
    // HS256 + checagem de `exp` (padrão do Validation)
    let validation = Validation::default();
    let key = DecodingKey::from_secret(secret.as_ref());
    let token_data = decode::<Claims>(token, &key, &validation)
        .map_err(|e| {
            tracing::debug!("token rejeitado: {}", e);
            AppError::InvalidToken
        })?;
    Ok(token_data.claims)
}
