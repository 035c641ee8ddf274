use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use crate::models::transfer::TransferStatus;

// Nosso tipo de erro. As quatro famílias de regra de negócio (autorização,
// validação, conflito, não encontrado) viram 4xx; o resto vira 500 genérico.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    // Entrada malformada ou duplicada detectada pela regra de negócio
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("asset {0} is already in another transfer")]
    AssetInOpenTransfer(Uuid),

    #[error("transfer is already {0:?}; approvals can no longer change")]
    TransferFinalized(TransferStatus),

    // Colisão no UNIQUE de transfer_number; o serviço tenta de novo
    #[error("transfer number {0} is already taken")]
    TransferNumberTaken(String),

    #[error("Token inválido")]
    InvalidToken,

    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) | AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_)
            | AppError::AssetInOpenTransfer(_)
            | AppError::TransferFinalized(_)
            | AppError::TransferNumberTaken(_) => StatusCode::CONFLICT,
            AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::DatabaseError(_) | AppError::InternalServerError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = match self {
            // Retorna todos os detalhes da validação, campo a campo.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .map(|e| {
                            e.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| e.code.to_string())
                        })
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                json!({
                    "error": "One or more fields are invalid.",
                    "details": details,
                })
            }
            AppError::InvalidToken => {
                json!({ "error": "Invalid or missing authentication token." })
            }
            // O `tracing` loga a mensagem detalhada; o cliente recebe algo genérico.
            ref e if status == StatusCode::INTERNAL_SERVER_ERROR => {
                tracing::error!("Erro Interno do Servidor: {:?}", e);
                json!({ "error": "An unexpected error occurred." })
            }
            e => json!({ "error": e.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}
