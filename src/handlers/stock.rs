// src/handlers/stock.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        db_utils::begin_user_tx,
        error::{ApiError, AppError},
        format::non_blank,
    },
    config::AppState,
    handlers::products::validate_not_negative,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::stock::{MovementResult, MovementType, StockMovement},
    services::stock_service::MovementRequest,
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MovementPayload {
    #[serde(rename = "type")]
    pub movement_type: MovementType,

    /// Sempre positiva; o sentido vem de `type`
    #[schema(example = 5)]
    pub quantity: i32,

    #[schema(example = "Reposição do fornecedor")]
    pub reason: Option<String>,

    /// Custo unitário da entrada (recalcula o custo médio)
    #[validate(custom(function = "validate_not_negative"))]
    pub unit_cost: Option<Decimal>,
}

#[utoipa::path(
    post,
    path = "/api/products/{id}/movements",
    tag = "Stock",
    request_body = MovementPayload,
    params(("id" = Uuid, Path, description = "ID do Produto")),
    responses(
        (status = 201, description = "Movimentação registrada", body = MovementResult),
        (status = 400, description = "Quantidade inválida"),
        (status = 404, description = "Produto não encontrado"),
        (status = 422, description = "Estoque insuficiente")
    ),
    security(("api_jwt" = []))
)]
pub async fn register_movement(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(product_id): Path<Uuid>,
    Json(payload): Json<MovementPayload>,
) -> Result<impl IntoResponse, ApiError> {
    if payload.quantity <= 0 {
        return Err(AppError::InvalidQuantity.to_api_error(&locale, &app_state.i18n_store));
    }
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let reason = non_blank(payload.reason);
    let request = MovementRequest {
        movement_type: payload.movement_type,
        quantity: payload.quantity,
        reason: reason.as_deref(),
        unit_cost: payload.unit_cost.map(|c| c.round_dp(2)),
    };

    let mut tx = begin_user_tx(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let result = app_state
        .stock_service
        .register_movement(&mut *tx, user.0.id, product_id, &request)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    tx.commit()
        .await
        .map_err(|e| AppError::from(e).to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(result)))
}

#[utoipa::path(
    get,
    path = "/api/products/{id}/movements",
    tag = "Stock",
    params(("id" = Uuid, Path, description = "ID do Produto")),
    responses(
        (status = 200, description = "Histórico (mais recentes primeiro)", body = Vec<StockMovement>),
        (status = 404, description = "Produto não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_movements(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(product_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let mut tx = begin_user_tx(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let movements = app_state
        .stock_service
        .list_movements(&mut *tx, user.0.id, product_id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    tx.commit()
        .await
        .map_err(|e| AppError::from(e).to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(movements)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_uses_type_field() {
        let p: MovementPayload =
            serde_json::from_str(r#"{"type":"entry","quantity":3,"unitCost":12.5}"#).unwrap();
        assert_eq!(p.movement_type, MovementType::Entry);
        assert_eq!(p.unit_cost, Some(Decimal::new(125, 1)));
        assert!(p.validate().is_ok());
    }

    #[test]
    fn negative_unit_cost_is_rejected() {
        let p: MovementPayload =
            serde_json::from_str(r#"{"type":"entry","quantity":3,"unitCost":-1}"#).unwrap();
        assert!(p.validate().unwrap_err().field_errors().contains_key("unit_cost"));
    }

    #[test]
    fn unit_cost_above_the_column_limit_is_rejected() {
        let p: MovementPayload = serde_json::from_str(
            r#"{"type":"entry","quantity":1,"unitCost":99999999999999}"#,
        )
        .unwrap();
        assert!(p.validate().unwrap_err().field_errors().contains_key("unit_cost"));
    }

    #[test]
    fn unknown_movement_type_is_rejected() {
        let parsed = serde_json::from_str::<MovementPayload>(r#"{"type":"ajuste","quantity":1}"#);
        assert!(parsed.is_err());
    }
}
