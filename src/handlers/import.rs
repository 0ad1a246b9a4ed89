// src/handlers/import.rs
//
// Importação de planilhas (linhas já lidas pelo cliente) e downloads CSV.

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::{
    common::{
        db_utils::begin_user_tx,
        error::{ApiError, AppError},
    },
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::import::{ImportKind, ImportPayload, ImportResult},
    services::export_service::{template, CsvFile},
};

fn csv_response(file: CsvFile) -> Response {
    let disposition = format!("attachment; filename=\"{}\"", file.file_name);
    let headers = [
        (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
        (header::CONTENT_DISPOSITION, disposition),
    ];
    (headers, file.content).into_response()
}

#[utoipa::path(
    post,
    path = "/api/import/products",
    tag = "Import",
    request_body = ImportPayload,
    responses(
        (status = 201, description = "Produtos importados", body = ImportResult),
        (status = 400, description = "Nenhuma linha válida")
    ),
    security(("api_jwt" = []))
)]
pub async fn import_products(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Json(payload): Json<ImportPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let mut tx = begin_user_tx(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let result = app_state
        .import_service
        .import_products(&mut *tx, user.0.id, &payload.rows)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    tx.commit()
        .await
        .map_err(|e| AppError::from(e).to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(result)))
}

#[utoipa::path(
    post,
    path = "/api/import/customers",
    tag = "Import",
    request_body = ImportPayload,
    responses(
        (status = 201, description = "Clientes importados", body = ImportResult),
        (status = 400, description = "Nenhuma linha válida")
    ),
    security(("api_jwt" = []))
)]
pub async fn import_customers(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Json(payload): Json<ImportPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let mut tx = begin_user_tx(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let result = app_state
        .import_service
        .import_customers(&mut *tx, user.0.id, &payload.rows)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    tx.commit()
        .await
        .map_err(|e| AppError::from(e).to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(result)))
}

#[utoipa::path(
    get,
    path = "/api/import/templates/{kind}",
    tag = "Import",
    params(("kind" = ImportKind, Path, description = "products | customers")),
    responses(
        (status = 200, description = "Modelo CSV (separado por ';')")
    ),
    security(("api_jwt" = []))
)]
pub async fn download_template(Path(kind): Path<ImportKind>) -> Response {
    csv_response(template(kind))
}

#[utoipa::path(
    get,
    path = "/api/export/products",
    tag = "Import",
    responses((status = 200, description = "Produtos em CSV")),
    security(("api_jwt" = []))
)]
pub async fn export_products(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
) -> Result<Response, ApiError> {
    export(app_state, locale, user, ImportKind::Products).await
}

#[utoipa::path(
    get,
    path = "/api/export/customers",
    tag = "Import",
    responses((status = 200, description = "Clientes em CSV")),
    security(("api_jwt" = []))
)]
pub async fn export_customers(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
) -> Result<Response, ApiError> {
    export(app_state, locale, user, ImportKind::Customers).await
}

async fn export(
    app_state: AppState,
    locale: Locale,
    user: AuthenticatedUser,
    kind: ImportKind,
) -> Result<Response, ApiError> {
    let mut tx = begin_user_tx(&app_state, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let file = app_state
        .export_service
        .export(&mut *tx, user.0.id, kind)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    tx.commit()
        .await
        .map_err(|e| AppError::from(e).to_api_error(&locale, &app_state.i18n_store))?;

    tracing::info!("📤 Exportação {:?} gerada para o usuário {}", kind, user.0.id);
    Ok(csv_response(file))
}
