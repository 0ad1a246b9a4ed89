// src/handlers/customers.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidateEmail, ValidationError};

use crate::{
    common::{
        db_utils::begin_user_tx,
        error::{ApiError, AppError},
        format::{non_blank, parse_date_flexible},
    },
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::{
        customer::{Customer, CustomerFilter, CustomerInput},
        sale::SaleSummary,
    },
};

fn validate_name(val: &str) -> Result<(), ValidationError> {
    if val.trim().is_empty() {
        let mut err = ValidationError::new("required");
        err.message = Some("O nome é obrigatório.".into());
        return Err(err);
    }
    Ok(())
}

// E-mail é opcional: em branco passa, preenchido precisa ser válido
fn validate_optional_email(val: &str) -> Result<(), ValidationError> {
    let trimmed = val.trim();
    if !trimmed.is_empty() && !trimmed.validate_email() {
        let mut err = ValidationError::new("email");
        err.message = Some("O e-mail fornecido é inválido.".into());
        return Err(err);
    }
    Ok(())
}

fn validate_birth_date(val: &str) -> Result<(), ValidationError> {
    if !val.trim().is_empty() && parse_date_flexible(val).is_none() {
        let mut err = ValidationError::new("date");
        err.message = Some("Data de nascimento inválida.".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerPayload {
    #[validate(custom(function = "validate_name"))]
    #[schema(example = "Maria Silva")]
    pub name: String,
    #[schema(example = "(11) 99999-9999")]
    pub phone: Option<String>,
    #[validate(custom(function = "validate_optional_email"))]
    pub email: Option<String>,
    /// `AAAA-MM-DD` ou `DD/MM/AAAA`
    #[validate(custom(function = "validate_birth_date"))]
    #[schema(example = "1990-05-25")]
    pub birth_date: Option<String>,
    pub street: Option<String>,
    pub number: Option<String>,
    pub neighborhood: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub complement: Option<String>,
    pub notes: Option<String>,
}

impl CustomerPayload {
    pub fn into_input(self) -> CustomerInput {
        CustomerInput {
            name: self.name.trim().to_string(),
            phone: non_blank(self.phone),
            email: non_blank(self.email),
            birth_date: self.birth_date.as_deref().and_then(parse_date_flexible),
            street: non_blank(self.street),
            number: non_blank(self.number),
            neighborhood: non_blank(self.neighborhood),
            city: non_blank(self.city),
            state: non_blank(self.state),
            complement: non_blank(self.complement),
            notes: non_blank(self.notes),
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/customers",
    tag = "Customers",
    params(CustomerFilter),
    responses(
        (status = 200, description = "Clientes ordenados por nome", body = Vec<Customer>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_customers(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Query(filter): Query<CustomerFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let mut tx = begin_user_tx(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let customers = app_state
        .customer_service
        .list_customers(&mut *tx, user.0.id, &filter)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    tx.commit()
        .await
        .map_err(|e| AppError::from(e).to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(customers)))
}

#[utoipa::path(
    get,
    path = "/api/customers/{id}",
    tag = "Customers",
    params(("id" = Uuid, Path, description = "ID do Cliente")),
    responses(
        (status = 200, description = "Cliente", body = Customer),
        (status = 404, description = "Cliente não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_customer(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(customer_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let mut tx = begin_user_tx(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let customer = app_state
        .customer_service
        .get_customer(&mut *tx, user.0.id, customer_id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    tx.commit()
        .await
        .map_err(|e| AppError::from(e).to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(customer)))
}

#[utoipa::path(
    post,
    path = "/api/customers",
    tag = "Customers",
    request_body = CustomerPayload,
    responses(
        (status = 201, description = "Cliente criado", body = Customer),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_customer(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Json(payload): Json<CustomerPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;
    let input = payload.into_input();

    let mut tx = begin_user_tx(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let customer = app_state
        .customer_service
        .create_customer(&mut *tx, user.0.id, &input)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    tx.commit()
        .await
        .map_err(|e| AppError::from(e).to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(customer)))
}

#[utoipa::path(
    put,
    path = "/api/customers/{id}",
    tag = "Customers",
    request_body = CustomerPayload,
    params(("id" = Uuid, Path, description = "ID do Cliente")),
    responses(
        (status = 200, description = "Cliente atualizado", body = Customer),
        (status = 404, description = "Cliente não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_customer(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(customer_id): Path<Uuid>,
    Json(payload): Json<CustomerPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;
    let input = payload.into_input();

    let mut tx = begin_user_tx(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let customer = app_state
        .customer_service
        .update_customer(&mut *tx, user.0.id, customer_id, &input)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    tx.commit()
        .await
        .map_err(|e| AppError::from(e).to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(customer)))
}

#[utoipa::path(
    delete,
    path = "/api/customers/{id}",
    tag = "Customers",
    params(("id" = Uuid, Path, description = "ID do Cliente")),
    responses(
        (status = 204, description = "Cliente removido"),
        (status = 404, description = "Cliente não encontrado"),
        (status = 409, description = "Cliente possui vendas")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_customer(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(customer_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let mut tx = begin_user_tx(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .customer_service
        .delete_customer(&mut *tx, user.0.id, customer_id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    tx.commit()
        .await
        .map_err(|e| AppError::from(e).to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/customers/{id}/sales",
    tag = "Customers",
    params(("id" = Uuid, Path, description = "ID do Cliente")),
    responses(
        (status = 200, description = "Compras do cliente (mais recentes primeiro)", body = Vec<SaleSummary>),
        (status = 404, description = "Cliente não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn customer_sales(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(customer_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let mut tx = begin_user_tx(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let sales = app_state
        .customer_service
        .sales_history(&mut *tx, user.0.id, customer_id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    tx.commit()
        .await
        .map_err(|e| AppError::from(e).to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(sales)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn named(name: &str) -> CustomerPayload {
        CustomerPayload { name: name.into(), ..Default::default() }
    }

    #[test]
    fn name_is_required() {
        assert!(named("Maria").validate().is_ok());
        let errors = named("  ").validate().unwrap_err();
        assert!(errors.field_errors().contains_key("name"));
    }

    #[test]
    fn email_is_checked_only_when_filled() {
        let blank = CustomerPayload { email: Some(" ".into()), ..named("Maria") };
        let valid = CustomerPayload { email: Some("maria@email.com".into()), ..named("Maria") };
        let invalid = CustomerPayload { email: Some("maria@".into()), ..named("Maria") };

        assert!(blank.validate().is_ok());
        assert!(valid.validate().is_ok());
        assert!(invalid.validate().unwrap_err().field_errors().contains_key("email"));
    }

    #[test]
    fn birth_date_accepts_both_formats() {
        let iso = CustomerPayload { birth_date: Some("1990-05-25".into()), ..named("Maria") };
        let br = CustomerPayload { birth_date: Some("25/05/1990".into()), ..named("Maria") };
        let bad = CustomerPayload { birth_date: Some("25-05".into()), ..named("Maria") };

        assert!(bad.validate().is_err());
        assert!(br.validate().is_ok());
        assert_eq!(iso.into_input().birth_date, NaiveDate::from_ymd_opt(1990, 5, 25));
    }

    #[test]
    fn blank_fields_become_null() {
        let input = CustomerPayload {
            phone: Some("".into()),
            city: Some(" São Paulo ".into()),
            ..named(" Maria ")
        }
        .into_input();

        assert_eq!(input.name, "Maria");
        assert_eq!(input.phone, None);
        assert_eq!(input.city.as_deref(), Some("São Paulo"));
    }
}
