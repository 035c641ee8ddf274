// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Users ---
        handlers::auth::get_me,
        handlers::scope::get_my_scope,

        // --- Catalog ---
        handlers::catalog::list_countries,
        handlers::catalog::count_countries,
        handlers::catalog::list_regions,
        handlers::catalog::count_regions,
        handlers::catalog::list_branches,
        handlers::catalog::count_branches,
        handlers::catalog::list_locations,
        handlers::catalog::count_locations,
        handlers::catalog::list_assets,
        handlers::catalog::count_assets,

        // --- Transfers ---
        handlers::transfers::create_transfer,
        handlers::transfers::list_transfers,
        handlers::transfers::get_transfer,
        handlers::transfers::list_pending_approvals,
        handlers::transfers::update_approval,

        // --- Assignments ---
        handlers::assignments::list_user_assignments,
        handlers::assignments::create_assignment,
        handlers::assignments::delete_assignment,

        // --- Roles ---
        handlers::roles::list_user_roles,
        handlers::roles::grant_role,
        handlers::roles::revoke_role,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::User,

            // --- Access ---
            models::access::Role,
            models::access::AssignmentLevel,
            models::access::UserAssignment,
            models::access::UserRole,
            models::access::AccessScope,

            // --- Hierarchy ---
            models::hierarchy::Country,
            models::hierarchy::Region,
            models::hierarchy::Branch,
            models::hierarchy::Location,

            // --- Assets ---
            models::asset::Asset,
            models::asset::CountResponse,

            // --- Transfers ---
            models::transfer::TransferStatus,
            models::transfer::ApprovalStatus,
            models::transfer::ApprovalRole,
            models::transfer::ApprovalDecision,
            models::transfer::AssetTransfer,
            models::transfer::AssetTransferItem,
            models::transfer::AssetTransferApproval,
            models::transfer::TransferDetail,
            models::transfer::TransferItemInput,

            // --- Payloads ---
            handlers::transfers::CreateTransferPayload,
            handlers::transfers::UpdateApprovalPayload,
            handlers::assignments::CreateAssignmentPayload,
            handlers::roles::GrantRolePayload,
        )
    ),
    tags(
        (name = "Users", description = "Usuário autenticado e seu escopo"),
        (name = "Catalog", description = "Hierarquia e ativos visíveis no escopo"),
        (name = "Transfers", description = "Transferências de ativos e aprovações"),
        (name = "Assignments", description = "Atribuições de usuários (admin)"),
        (name = "Roles", description = "Papéis de usuários (admin)")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
