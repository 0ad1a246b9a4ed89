// src/handlers/products.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{
    common::{
        db_utils::begin_user_tx,
        error::{ApiError, AppError},
        format::non_blank,
    },
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::product::{
        fits_money_column, ProductFilter, ProductInput, ProductView, MAX_MONEY,
        PRODUCT_CATEGORIES,
    },
};

// ---
// Validações customizadas
// ---
fn validate_money_limit(val: &Decimal) -> Result<(), ValidationError> {
    if !fits_money_column(*val) {
        let mut err = ValidationError::new("range");
        err.add_param("max".into(), &MAX_MONEY.to_string());
        err.message = Some("O valor excede o máximo permitido (R$ 9.999.999.999,99).".into());
        return Err(err);
    }
    Ok(())
}

pub(crate) fn validate_not_negative(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() {
        let mut err = ValidationError::new("range");
        err.add_param("min".into(), &0.0);
        err.message = Some("O valor não pode ser negativo.".into());
        return Err(err);
    }
    validate_money_limit(val)
}

fn validate_positive_price(val: &Decimal) -> Result<(), ValidationError> {
    if *val <= Decimal::ZERO {
        let mut err = ValidationError::new("range");
        err.message = Some("O preço de venda deve ser maior que zero.".into());
        return Err(err);
    }
    validate_money_limit(val)
}

fn validate_not_blank(val: &str) -> Result<(), ValidationError> {
    if val.trim().is_empty() {
        let mut err = ValidationError::new("required");
        err.message = Some("O nome é obrigatório.".into());
        return Err(err);
    }
    Ok(())
}

// ---
// Payload: Product (criação e edição)
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductPayload {
    #[validate(custom(function = "validate_not_blank"))]
    #[schema(example = "Brinco de Ouro")]
    pub name: String,

    pub description: Option<String>,

    #[schema(example = "Brincos")]
    pub category: Option<String>,

    #[validate(custom(function = "validate_not_negative"))]
    #[serde(default)]
    #[schema(example = "50.00")]
    pub buy_price: Decimal,

    #[validate(custom(function = "validate_positive_price"))]
    #[schema(example = "120.00")]
    pub sell_price: Decimal,

    /// Só na criação; na edição o estoque muda apenas por movimentação.
    #[validate(range(min = 0, message = "O estoque não pode ser negativo."))]
    #[serde(default)]
    pub stock_quantity: i32,

    pub image_url: Option<String>,
}

impl ProductPayload {
    pub fn into_input(self) -> (ProductInput, i32) {
        let input = ProductInput {
            name: self.name.trim().to_string(),
            description: non_blank(self.description),
            category: non_blank(self.category),
            buy_price: self.buy_price.round_dp(2),
            sell_price: self.sell_price.round_dp(2),
            image_url: non_blank(self.image_url),
        };
        (input, self.stock_quantity)
    }
}

#[utoipa::path(
    get,
    path = "/api/products",
    tag = "Products",
    params(ProductFilter),
    responses(
        (status = 200, description = "Produtos ordenados por nome", body = Vec<ProductView>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_products(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Query(filter): Query<ProductFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let mut tx = begin_user_tx(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let products = app_state
        .product_service
        .list_products(&mut *tx, user.0.id, &filter)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    tx.commit()
        .await
        .map_err(|e| AppError::from(e).to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(products)))
}

#[utoipa::path(
    get,
    path = "/api/products/categories",
    tag = "Products",
    responses(
        (status = 200, description = "Categorias do cadastro", body = Vec<String>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_categories() -> Json<Vec<&'static str>> {
    Json(PRODUCT_CATEGORIES.to_vec())
}

#[utoipa::path(
    get,
    path = "/api/products/{id}",
    tag = "Products",
    params(("id" = Uuid, Path, description = "ID do Produto")),
    responses(
        (status = 200, description = "Produto", body = ProductView),
        (status = 404, description = "Produto não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_product(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(product_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let mut tx = begin_user_tx(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let product = app_state
        .product_service
        .get_product(&mut *tx, user.0.id, product_id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    tx.commit()
        .await
        .map_err(|e| AppError::from(e).to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(product)))
}

#[utoipa::path(
    post,
    path = "/api/products",
    tag = "Products",
    request_body = ProductPayload,
    responses(
        (status = 201, description = "Produto criado", body = ProductView),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_product(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Json(payload): Json<ProductPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;
    let (input, initial_stock) = payload.into_input();

    let mut tx = begin_user_tx(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let product = app_state
        .product_service
        .create_product(&mut *tx, user.0.id, &input, initial_stock)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    tx.commit()
        .await
        .map_err(|e| AppError::from(e).to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(product)))
}

#[utoipa::path(
    put,
    path = "/api/products/{id}",
    tag = "Products",
    request_body = ProductPayload,
    params(("id" = Uuid, Path, description = "ID do Produto")),
    responses(
        (status = 200, description = "Produto atualizado (estoque inalterado)", body = ProductView),
        (status = 404, description = "Produto não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_product(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(product_id): Path<Uuid>,
    Json(payload): Json<ProductPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;
    let (input, _) = payload.into_input();

    let mut tx = begin_user_tx(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let product = app_state
        .product_service
        .update_product(&mut *tx, user.0.id, product_id, &input)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    tx.commit()
        .await
        .map_err(|e| AppError::from(e).to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(product)))
}

#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    tag = "Products",
    params(("id" = Uuid, Path, description = "ID do Produto")),
    responses(
        (status = 204, description = "Produto removido"),
        (status = 404, description = "Produto não encontrado"),
        (status = 409, description = "Produto vinculado a vendas")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_product(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(product_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let mut tx = begin_user_tx(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .product_service
        .delete_product(&mut *tx, user.0.id, product_id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    tx.commit()
        .await
        .map_err(|e| AppError::from(e).to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn payload(name: &str, buy: Decimal, sell: Decimal, stock: i32) -> ProductPayload {
        ProductPayload {
            name: name.into(),
            description: Some("  ".into()),
            category: Some(" Anéis ".into()),
            buy_price: buy,
            sell_price: sell,
            stock_quantity: stock,
            image_url: None,
        }
    }

    #[test]
    fn valid_payload_is_normalized() {
        let p = payload("  Anel Solitário ", dec!(0), dec!(89.90), 0);
        assert!(p.validate().is_ok());

        let (input, stock) = p.into_input();
        assert_eq!(input.name, "Anel Solitário");
        assert_eq!(input.description, None);
        assert_eq!(input.category.as_deref(), Some("Anéis"));
        assert_eq!(stock, 0);
    }

    #[test]
    fn blank_name_is_rejected() {
        let errors = payload("   ", dec!(10), dec!(20), 1).validate().unwrap_err();
        assert!(errors.field_errors().contains_key("name"));
    }

    #[test]
    fn sell_price_must_be_positive() {
        let errors = payload("Anel", dec!(10), dec!(0), 1).validate().unwrap_err();
        assert!(errors.field_errors().contains_key("sell_price"));
    }

    #[test]
    fn negative_cost_and_stock_are_rejected() {
        let errors = payload("Anel", dec!(-1), dec!(20), -1).validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("buy_price"));
        assert!(fields.contains_key("stock_quantity"));
    }

    #[test]
    fn prices_up_to_the_column_limit_are_accepted() {
        let p = payload("Colar", dec!(9999999999.99), dec!(9999999999.99), 1);
        assert!(p.validate().is_ok());
    }

    #[test]
    fn prices_above_the_column_limit_are_rejected() {
        let errors = payload("Colar", dec!(10000000000.00), dec!(10000000000.00), 1)
            .validate()
            .unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("buy_price"));
        assert!(fields.contains_key("sell_price"));

        // 9.999.999.999,999 arredonda para 10 bilhões
        let rounded_up = payload("Colar", dec!(0), dec!(9999999999.999), 1);
        assert!(rounded_up.validate().unwrap_err().field_errors().contains_key("sell_price"));
    }

    #[test]
    fn huge_json_price_is_a_validation_error() {
        let p: ProductPayload =
            serde_json::from_str(r#"{"name":"Anel","sellPrice":10000000000000}"#).unwrap();
        assert!(p.validate().unwrap_err().field_errors().contains_key("sell_price"));
    }

    #[test]
    fn buy_price_defaults_to_zero() {
        let p: ProductPayload =
            serde_json::from_str(r#"{"name":"Pulseira","sellPrice":35.5}"#).unwrap();
        assert_eq!(p.buy_price, Decimal::ZERO);
        assert_eq!(p.stock_quantity, 0);
        assert!(p.validate().is_ok());
    }
}
