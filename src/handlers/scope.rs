use axum::Json;

use crate::{middleware::scope::RequestScope, models::access::AccessScope};

#[utoipa::path(
    get,
    path = "/api/me/scope",
    tag = "Users",
    responses(
        (status = 200, description = "Países, regiões, filiais e locais visíveis", body = AccessScope)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_my_scope(RequestScope(scope): RequestScope) -> Json<AccessScope> {
    Json(scope)
}
