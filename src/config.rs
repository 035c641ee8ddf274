// src/config.rs

use std::{env, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    db::{
        AssetRepository, AssignmentRepository, HierarchyRepository, TransferRepository,
        UserRepository,
    },
    services::{
        assignment_service::AssignmentService, auth::AuthService, catalog_service::CatalogService,
        scope_service::ScopeResolver, transfer_service::TransferService,
    },
};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 3;

// Configurações lidas do ambiente (.env opcional)
#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub db_max_connections: u32,
    pub db_acquire_timeout: Duration,
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").context("DATABASE_URL deve ser definida")?;
        let jwt_secret = lookup("JWT_SECRET").context("JWT_SECRET deve ser definido")?;
        let bind_addr = lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());

        let db_max_connections = match lookup("DB_MAX_CONNECTIONS") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("DB_MAX_CONNECTIONS inválido: {}", raw))?,
            None => DEFAULT_MAX_CONNECTIONS,
        };
        let acquire_secs = match lookup("DB_ACQUIRE_TIMEOUT_SECS") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("DB_ACQUIRE_TIMEOUT_SECS inválido: {}", raw))?,
            None => DEFAULT_ACQUIRE_TIMEOUT_SECS,
        };

        Ok(Self {
            database_url,
            jwt_secret,
            bind_addr,
            db_max_connections,
            db_acquire_timeout: Duration::from_secs(acquire_secs),
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub auth_service: AuthService,
    pub scope_resolver: ScopeResolver,
    pub transfer_service: TransferService,
    pub assignment_service: AssignmentService,
    pub catalog_service: CatalogService,
}

impl AppState {
    pub async fn new(settings: &Settings) -> anyhow::Result<Self> {
        let db_pool = PgPoolOptions::new()
            .max_connections(settings.db_max_connections)
            .acquire_timeout(settings.db_acquire_timeout)
            .connect(&settings.database_url)
            .await
            .context("Falha ao conectar ao banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        let user_repo = UserRepository::new(db_pool.clone());
        let hierarchy_repo = HierarchyRepository::new(db_pool.clone());
        let assignment_repo = AssignmentRepository::new(db_pool.clone());
        let asset_repo = AssetRepository::new(db_pool.clone());
        let transfer_repo = TransferRepository::new(db_pool.clone());

        let hierarchy_store = Arc::new(hierarchy_repo.clone());
        let assignment_store = Arc::new(assignment_repo.clone());

        let auth_service = AuthService::new(user_repo, settings.jwt_secret.clone());
        let scope_resolver = ScopeResolver::new(hierarchy_store.clone(), assignment_store.clone());
        let transfer_service = TransferService::new(
            Arc::new(transfer_repo),
            hierarchy_store,
            assignment_store.clone(),
        );
        let assignment_service = AssignmentService::new(assignment_repo, assignment_store);
        let catalog_service = CatalogService::new(hierarchy_repo, asset_repo);

        Ok(Self {
            db_pool,
            auth_service,
            scope_resolver,
            transfer_service,
            assignment_service,
            catalog_service,
        })
    }
}
