// src/handlers/catalog.rs

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::scope::RequestScope,
    models::{
        access::{AccessScope, ScopeLevel},
        asset::{Asset, AssetQuery, CountResponse},
        hierarchy::{Branch, Country, Location, Region},
    },
};

// ---
// Hierarquia
// ---

#[utoipa::path(
    get,
    path = "/api/countries",
    tag = "Catalog",
    responses((status = 200, description = "Países no escopo", body = Vec<Country>)),
    security(("api_jwt" = []))
)]
pub async fn list_countries(
    State(app_state): State<AppState>,
    RequestScope(scope): RequestScope,
) -> Result<impl IntoResponse, AppError> {
    let countries = app_state.catalog_service.list_countries(&scope).await?;
    Ok(Json(countries))
}

#[utoipa::path(
    get,
    path = "/api/regions",
    tag = "Catalog",
    responses((status = 200, description = "Regiões no escopo", body = Vec<Region>)),
    security(("api_jwt" = []))
)]
pub async fn list_regions(
    State(app_state): State<AppState>,
    RequestScope(scope): RequestScope,
) -> Result<impl IntoResponse, AppError> {
    let regions = app_state.catalog_service.list_regions(&scope).await?;
    Ok(Json(regions))
}

#[utoipa::path(
    get,
    path = "/api/branches",
    tag = "Catalog",
    responses((status = 200, description = "Filiais no escopo", body = Vec<Branch>)),
    security(("api_jwt" = []))
)]
pub async fn list_branches(
    State(app_state): State<AppState>,
    RequestScope(scope): RequestScope,
) -> Result<impl IntoResponse, AppError> {
    let branches = app_state.catalog_service.list_branches(&scope).await?;
    Ok(Json(branches))
}

#[utoipa::path(
    get,
    path = "/api/locations",
    tag = "Catalog",
    responses((status = 200, description = "Locais no escopo", body = Vec<Location>)),
    security(("api_jwt" = []))
)]
pub async fn list_locations(
    State(app_state): State<AppState>,
    RequestScope(scope): RequestScope,
) -> Result<impl IntoResponse, AppError> {
    let locations = app_state.catalog_service.list_locations(&scope).await?;
    Ok(Json(locations))
}

async fn count_level(
    app_state: &AppState,
    scope: &AccessScope,
    level: ScopeLevel,
) -> Result<Json<CountResponse>, AppError> {
    let count = app_state.catalog_service.count(scope, level).await?;
    Ok(Json(CountResponse { count }))
}

#[utoipa::path(
    get,
    path = "/api/countries/count",
    tag = "Catalog",
    responses((status = 200, description = "Total de países no escopo", body = CountResponse)),
    security(("api_jwt" = []))
)]
pub async fn count_countries(
    State(app_state): State<AppState>,
    RequestScope(scope): RequestScope,
) -> Result<impl IntoResponse, AppError> {
    count_level(&app_state, &scope, ScopeLevel::Country).await
}

#[utoipa::path(
    get,
    path = "/api/regions/count",
    tag = "Catalog",
    responses((status = 200, description = "Total de regiões no escopo", body = CountResponse)),
    security(("api_jwt" = []))
)]
pub async fn count_regions(
    State(app_state): State<AppState>,
    RequestScope(scope): RequestScope,
) -> Result<impl IntoResponse, AppError> {
    count_level(&app_state, &scope, ScopeLevel::Region).await
}

#[utoipa::path(
    get,
    path = "/api/branches/count",
    tag = "Catalog",
    responses((status = 200, description = "Total de filiais no escopo", body = CountResponse)),
    security(("api_jwt" = []))
)]
pub async fn count_branches(
    State(app_state): State<AppState>,
    RequestScope(scope): RequestScope,
) -> Result<impl IntoResponse, AppError> {
    count_level(&app_state, &scope, ScopeLevel::Branch).await
}

#[utoipa::path(
    get,
    path = "/api/locations/count",
    tag = "Catalog",
    responses((status = 200, description = "Total de locais no escopo", body = CountResponse)),
    security(("api_jwt" = []))
)]
pub async fn count_locations(
    State(app_state): State<AppState>,
    RequestScope(scope): RequestScope,
) -> Result<impl IntoResponse, AppError> {
    count_level(&app_state, &scope, ScopeLevel::Location).await
}

// ---
// Ativos
// ---

#[utoipa::path(
    get,
    path = "/api/assets",
    tag = "Catalog",
    params(AssetQuery),
    responses((status = 200, description = "Ativos nos locais do escopo", body = Vec<Asset>)),
    security(("api_jwt" = []))
)]
pub async fn list_assets(
    State(app_state): State<AppState>,
    RequestScope(scope): RequestScope,
    Query(query): Query<AssetQuery>,
) -> Result<impl IntoResponse, AppError> {
    let assets = app_state.catalog_service.list_assets(&scope, &query).await?;
    Ok(Json(assets))
}

#[utoipa::path(
    get,
    path = "/api/assets/count",
    tag = "Catalog",
    params(AssetQuery),
    responses((status = 200, description = "Total de ativos com os mesmos filtros", body = CountResponse)),
    security(("api_jwt" = []))
)]
pub async fn count_assets(
    State(app_state): State<AppState>,
    RequestScope(scope): RequestScope,
    Query(query): Query<AssetQuery>,
) -> Result<impl IntoResponse, AppError> {
    let count = app_state.catalog_service.count_assets(&scope, &query).await?;
    Ok(Json(CountResponse { count }))
}
