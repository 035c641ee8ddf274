//src/main.rs

use axum::{
    middleware as axum_middleware,
    routing::{delete, get, patch, post},
    Router,
};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::{AppState, Settings};
use crate::docs::ApiDoc;
use crate::middleware::auth::auth_guard;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logger: RUST_LOG controla o nível (padrão "info")
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    // Se a configuração falhar, a aplicação não deve iniciar.
    let settings = Settings::from_env()?;
    let app_state = AppState::new(&settings).await?;

    sqlx::migrate!().run(&app_state.db_pool).await?;
    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    // Usuário e escopo
    let user_routes = Router::new()
        .route("/me", get(handlers::auth::get_me))
        .route("/me/scope", get(handlers::scope::get_my_scope));

    // Hierarquia e ativos, recortados pelo escopo
    let catalog_routes = Router::new()
        .route("/countries", get(handlers::catalog::list_countries))
        .route("/countries/count", get(handlers::catalog::count_countries))
        .route("/regions", get(handlers::catalog::list_regions))
        .route("/regions/count", get(handlers::catalog::count_regions))
        .route("/branches", get(handlers::catalog::list_branches))
        .route("/branches/count", get(handlers::catalog::count_branches))
        .route("/locations", get(handlers::catalog::list_locations))
        .route("/locations/count", get(handlers::catalog::count_locations))
        .route("/assets", get(handlers::catalog::list_assets))
        .route("/assets/count", get(handlers::catalog::count_assets));

    let transfer_routes = Router::new()
        .route("/"
               ,post(handlers::transfers::create_transfer)
               .get(handlers::transfers::list_transfers)
        )
        .route("/approvals/pending", get(handlers::transfers::list_pending_approvals))
        .route("/approvals/{approval_id}", patch(handlers::transfers::update_approval))
        .route("/{transfer_id}", get(handlers::transfers::get_transfer));

    let assignment_routes = Router::new()
        .route("/users/{user_id}", get(handlers::assignments::list_user_assignments))
        .route("/{level}", post(handlers::assignments::create_assignment))
        .route("/{level}/{assignment_id}", delete(handlers::assignments::delete_assignment));

    // Papéis (admin)
    let role_routes = Router::new()
        .route("/", post(handlers::roles::grant_role))
        .route("/users/{user_id}", get(handlers::roles::list_user_roles))
        .route("/users/{user_id}/{role}", delete(handlers::roles::revoke_role));

    // Tudo que exige Bearer
    let protected = Router::new()
        .merge(user_routes)
        .merge(catalog_routes)
        .nest("/asset-transfers", transfer_routes)
        .nest("/user-assignments", assignment_routes)
        .nest("/user-roles", role_routes)
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Combina tudo no router principal
    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api", protected)
        .with_state(app_state)
        // Swagger UI + documento em /api/openapi.json
        .merge(SwaggerUi::new("/swagger-ui").url("/api/openapi.json", ApiDoc::openapi()));

    // Inicia o servidor
    let listener = TcpListener::bind(&settings.bind_addr).await?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
