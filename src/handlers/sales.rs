// src/handlers/sales.rs

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{
    common::{
        db_utils::begin_user_tx,
        error::{ApiError, AppError},
    },
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::sale::{CartLine, SaleDetail, SaleFilter, SaleSummary},
    services::receipt_service::ReceiptService,
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSalePayload {
    #[validate(required(message = "O cliente é obrigatório."))]
    pub customer_id: Option<Uuid>,

    #[serde(default)]
    pub items: Vec<CartLine>,
}

fn validate_reason(val: &str) -> Result<(), ValidationError> {
    if val.trim().is_empty() {
        let mut err = ValidationError::new("required");
        err.message = Some("Informe o motivo do cancelamento.".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CancelSalePayload {
    #[validate(custom(function = "validate_reason"))]
    #[schema(example = "Cliente desistiu da compra")]
    pub reason: String,
}

#[utoipa::path(
    post,
    path = "/api/sales",
    tag = "Sales",
    request_body = CreateSalePayload,
    responses(
        (status = 201, description = "Venda registrada", body = SaleDetail),
        (status = 400, description = "Carrinho vazio ou quantidade inválida"),
        (status = 404, description = "Cliente ou produto não encontrado"),
        (status = 422, description = "Estoque insuficiente")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_sale(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Json(payload): Json<CreateSalePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let customer_id = payload
        .customer_id
        .ok_or_else(|| AppError::CustomerNotFound.to_api_error(&locale, &app_state.i18n_store))?;

    let mut tx = begin_user_tx(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let sale = app_state
        .sale_service
        .create_sale(&mut *tx, user.0.id, customer_id, &payload.items)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    tx.commit()
        .await
        .map_err(|e| AppError::from(e).to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(sale)))
}

#[utoipa::path(
    get,
    path = "/api/sales",
    tag = "Sales",
    params(SaleFilter),
    responses(
        (status = 200, description = "Vendas (mais recentes primeiro)", body = Vec<SaleSummary>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_sales(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Query(filter): Query<SaleFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let mut tx = begin_user_tx(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let sales = app_state
        .sale_service
        .list_sales(&mut *tx, user.0.id, filter.status)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    tx.commit()
        .await
        .map_err(|e| AppError::from(e).to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(sales)))
}

#[utoipa::path(
    get,
    path = "/api/sales/{id}",
    tag = "Sales",
    params(("id" = Uuid, Path, description = "ID da Venda")),
    responses(
        (status = 200, description = "Venda com itens", body = SaleDetail),
        (status = 404, description = "Venda não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_sale(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(sale_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let mut tx = begin_user_tx(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let sale = app_state
        .sale_service
        .get_sale(&mut *tx, user.0.id, sale_id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    tx.commit()
        .await
        .map_err(|e| AppError::from(e).to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(sale)))
}

#[utoipa::path(
    post,
    path = "/api/sales/{id}/cancel",
    tag = "Sales",
    request_body = CancelSalePayload,
    params(("id" = Uuid, Path, description = "ID da Venda")),
    responses(
        (status = 200, description = "Venda cancelada, estoque devolvido", body = SaleDetail),
        (status = 404, description = "Venda não encontrada"),
        (status = 409, description = "Venda já cancelada")
    ),
    security(("api_jwt" = []))
)]
pub async fn cancel_sale(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(sale_id): Path<Uuid>,
    Json(payload): Json<CancelSalePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let mut tx = begin_user_tx(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let sale = app_state
        .sale_service
        .cancel_sale(&mut *tx, user.0.id, sale_id, payload.reason.trim())
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    tx.commit()
        .await
        .map_err(|e| AppError::from(e).to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(sale)))
}

#[utoipa::path(
    get,
    path = "/api/sales/{id}/receipt",
    tag = "Sales",
    params(("id" = Uuid, Path, description = "ID da Venda")),
    responses(
        (status = 200, description = "Recibo em PDF (application/pdf)"),
        (status = 404, description = "Venda não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn sale_receipt(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(sale_id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let mut tx = begin_user_tx(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let pdf_bytes = app_state
        .receipt_service
        .generate_receipt(&mut *tx, user.0.id, sale_id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    tx.commit()
        .await
        .map_err(|e| AppError::from(e).to_api_error(&locale, &app_state.i18n_store))?;

    // Headers para o navegador baixar ou mostrar o PDF
    let disposition = format!("inline; filename=\"{}\"", ReceiptService::file_name(sale_id));
    let headers = [
        (header::CONTENT_TYPE, "application/pdf".to_string()),
        (header::CONTENT_DISPOSITION, disposition),
    ];

    Ok((headers, pdf_bytes).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn customer_is_required() {
        let p: CreateSalePayload = serde_json::from_str(r#"{"items":[]}"#).unwrap();
        let errors = p.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("customer_id"));
    }

    #[test]
    fn cart_lines_are_camel_case() {
        let id = Uuid::new_v4();
        let body = format!(
            r#"{{"customerId":"{id}","items":[{{"productId":"{id}","quantity":2}}]}}"#
        );
        let p: CreateSalePayload = serde_json::from_str(&body).unwrap();

        assert!(p.validate().is_ok());
        assert_eq!(p.items, vec![CartLine { product_id: id, quantity: 2 }]);
    }

    #[test]
    fn cancel_reason_cannot_be_blank() {
        assert!(CancelSalePayload { reason: "  ".into() }.validate().is_err());
        assert!(CancelSalePayload { reason: "Troca".into() }.validate().is_ok());
    }
}
