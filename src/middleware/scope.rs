// src/middleware/scope.rs

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::access::AccessScope,
};

// Escopo do usuário autenticado. Resolvido uma vez por requisição:
// o resultado fica nos extensions para os próximos extratores.
#[derive(Debug, Clone)]
pub struct RequestScope(pub AccessScope);

impl<S> FromRequestParts<S> for RequestScope
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(scope) = parts.extensions.get::<AccessScope>() {
            return Ok(RequestScope(scope.clone()));
        }

        let AuthenticatedUser(user) = AuthenticatedUser::from_request_parts(parts, state).await?;
        let app_state = AppState::from_ref(state);
        let scope = app_state.scope_resolver.resolve_scope(user.id).await?;

        parts.extensions.insert(scope.clone());
        Ok(RequestScope(scope))
    }
}
