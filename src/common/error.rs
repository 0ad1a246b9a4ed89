// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use thiserror::Error;

use crate::common::i18n::I18nStore;
use crate::middleware::i18n::Locale;

// Erro de domínio usado por todas as camadas (repo -> service -> handler).
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Usuário não encontrado")]
    UserNotFound,

    #[error("Produto não encontrado")]
    ProductNotFound,

    #[error("Cliente não encontrado")]
    CustomerNotFound,

    #[error("Venda não encontrada")]
    SaleNotFound,

    #[error("Estoque insuficiente para '{product}' (disponível: {available}, solicitado: {requested})")]
    InsufficientStock {
        product: String,
        available: i32,
        requested: i32,
    },

    #[error("Quantidade inválida")]
    InvalidQuantity,

    #[error("Carrinho vazio")]
    EmptyCart,

    #[error("Venda já cancelada")]
    SaleAlreadyCancelled,

    #[error("Produto vinculado a vendas")]
    ProductInUse,

    #[error("Cliente possui vendas")]
    CustomerHasSales,

    #[error("Nenhuma linha válida na importação")]
    EmptyImport,

    #[error("Fonte não encontrada: {0}")]
    FontNotFound(String),

    #[error("Erro ao gerar documento: {0}")]
    DocumentError(String),

    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    /// Código estável usado como chave no I18nStore e devolvido ao frontend.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "validation_failed",
            AppError::EmailAlreadyExists => "email_already_exists",
            AppError::InvalidCredentials => "invalid_credentials",
            AppError::InvalidToken => "invalid_token",
            AppError::UserNotFound => "user_not_found",
            AppError::ProductNotFound => "product_not_found",
            AppError::CustomerNotFound => "customer_not_found",
            AppError::SaleNotFound => "sale_not_found",
            AppError::InsufficientStock { .. } => "insufficient_stock",
            AppError::InvalidQuantity => "invalid_quantity",
            AppError::EmptyCart => "empty_cart",
            AppError::SaleAlreadyCancelled => "sale_already_cancelled",
            AppError::ProductInUse => "product_in_use",
            AppError::CustomerHasSales => "customer_has_sales",
            AppError::EmptyImport => "empty_import",
            AppError::FontNotFound(_) => "font_not_found",
            _ => "internal_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_)
            | AppError::InvalidQuantity
            | AppError::EmptyCart
            | AppError::EmptyImport => StatusCode::BAD_REQUEST,
            AppError::InvalidCredentials | AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::UserNotFound
            | AppError::ProductNotFound
            | AppError::CustomerNotFound
            | AppError::SaleNotFound => StatusCode::NOT_FOUND,
            AppError::EmailAlreadyExists
            | AppError::SaleAlreadyCancelled
            | AppError::ProductInUse
            | AppError::CustomerHasSales => StatusCode::CONFLICT,
            AppError::InsufficientStock { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Converte o erro de domínio em resposta HTTP traduzida.
    pub fn to_api_error(&self, locale: &Locale, store: &I18nStore) -> ApiError {
        let status = self.status();
        let error = store.translate(&locale.0, self.code());

        let details = match self {
            AppError::ValidationError(errors) => {
                let mut fields: HashMap<String, Vec<String>> = HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages = field_errors
                        .iter()
                        .map(|e| {
                            e.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| e.code.to_string())
                        })
                        .collect();
                    fields.insert(field.to_string(), messages);
                }
                Some(json!(fields))
            }
            AppError::InsufficientStock { product, available, requested } => Some(json!({
                "product": product,
                "available": available,
                "requested": requested,
            })),
            _ => None,
        };

        if status.is_server_error() {
            tracing::error!("Erro Interno do Servidor: {}", self);
        }

        ApiError { status, error, details }
    }
}

// Resposta de erro que efetivamente vai para o cliente.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.error, "details": details }),
            None => json!({ "error": self.error }),
        };
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt() -> Locale {
        Locale("pt".to_string())
    }

    #[test]
    fn insufficient_stock_carries_details() {
        let store = I18nStore::new();
        let err = AppError::InsufficientStock {
            product: "Anel Solitário".into(),
            available: 1,
            requested: 3,
        };
        let api = err.to_api_error(&pt(), &store);

        assert_eq!(api.status, StatusCode::UNPROCESSABLE_ENTITY);
        let details = api.details.expect("details");
        assert_eq!(details["available"], 1);
        assert_eq!(details["requested"], 3);
    }

    #[test]
    fn validation_errors_list_each_field() {
        let mut errors = validator::ValidationErrors::new();
        let mut e = validator::ValidationError::new("length");
        e.message = Some("O nome é obrigatório.".into());
        errors.add("name", e);

        let api = AppError::ValidationError(errors).to_api_error(&pt(), &I18nStore::new());

        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        assert_eq!(api.details.unwrap()["name"][0], "O nome é obrigatório.");
    }

    #[test]
    fn database_errors_are_hidden_behind_generic_message() {
        let api = AppError::DatabaseError(sqlx::Error::RowNotFound)
            .to_api_error(&Locale("en".into()), &I18nStore::new());

        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api.error, "An unexpected error occurred.");
        assert!(api.details.is_none());
    }
}
