// src/services/import_service.rs

use serde_json::{Map, Value};
use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{stock_repo::NewMovement, CustomerRepository, ProductRepository, StockRepository},
    models::{
        import::{customer_from_row, product_from_row, ImportResult},
        stock::MovementType,
    },
    services::product_service::INITIAL_STOCK_REASON,
};

/// Converte as linhas, contando as ignoradas. Nenhuma válida = `EmptyImport`.
pub fn collect_valid_rows<T, F>(
    rows: &[Map<String, Value>],
    convert: F,
) -> Result<(Vec<T>, usize), AppError>
where
    F: Fn(&Map<String, Value>) -> Option<T>,
{
    let valid: Vec<T> = rows.iter().filter_map(convert).collect();
    if valid.is_empty() {
        return Err(AppError::EmptyImport);
    }
    let skipped = rows.len() - valid.len();
    Ok((valid, skipped))
}

#[derive(Clone)]
pub struct ImportService {
    product_repo: ProductRepository,
    customer_repo: CustomerRepository,
    stock_repo: StockRepository,
}

impl ImportService {
    pub fn new(
        product_repo: ProductRepository,
        customer_repo: CustomerRepository,
        stock_repo: StockRepository,
    ) -> Self {
        Self { product_repo, customer_repo, stock_repo }
    }

    // Todas as linhas válidas entram, ou nenhuma.
    pub async fn import_products<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        rows: &[Map<String, Value>],
    ) -> Result<ImportResult, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let (products, skipped) = collect_valid_rows(rows, product_from_row)?;

        let mut tx = executor.begin().await?;

        for imported in &products {
            let product = self
                .product_repo
                .create(&mut *tx, user_id, &imported.input, imported.stock_quantity)
                .await?;

            if imported.stock_quantity > 0 {
                self.stock_repo
                    .record_movement(
                        &mut *tx,
                        user_id,
                        &NewMovement {
                            product_id: product.id,
                            movement_type: MovementType::Entry,
                            quantity: imported.stock_quantity,
                            sale_id: None,
                            reason: Some(INITIAL_STOCK_REASON),
                            unit_cost: Some(imported.input.buy_price),
                        },
                    )
                    .await?;
            }
        }

        tx.commit().await?;

        tracing::info!("📥 {} produtos importados ({} linhas ignoradas)", products.len(), skipped);
        Ok(ImportResult { imported: products.len(), skipped })
    }

    pub async fn import_customers<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        rows: &[Map<String, Value>],
    ) -> Result<ImportResult, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let (customers, skipped) = collect_valid_rows(rows, customer_from_row)?;

        let mut tx = executor.begin().await?;
        for input in &customers {
            self.customer_repo.create(&mut *tx, user_id, input).await?;
        }
        tx.commit().await?;

        tracing::info!("📥 {} clientes importados ({} linhas ignoradas)", customers.len(), skipped);
        Ok(ImportResult { imported: customers.len(), skipped })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rows(value: Value) -> Vec<Map<String, Value>> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn counts_skipped_rows() {
        let data = rows(json!([
            { "Nome": "Anel", "Venda (R$)": 10 },
            { "Nome": "", "Venda (R$)": 10 },
            { "Nome": "Colar", "Venda (R$)": "25,90", "Estoque": 3 },
            { "Categoria": "Brincos" },
        ]));

        let (valid, skipped) = collect_valid_rows(&data, product_from_row).unwrap();
        assert_eq!(valid.len(), 2);
        assert_eq!(skipped, 2);
        assert_eq!(valid[1].stock_quantity, 3);
    }

    #[test]
    fn no_valid_rows_is_an_error() {
        let data = rows(json!([{ "Telefone": "1199999" }]));
        assert!(matches!(
            collect_valid_rows(&data, customer_from_row),
            Err(AppError::EmptyImport)
        ));
        assert!(matches!(
            collect_valid_rows(&[], customer_from_row),
            Err(AppError::EmptyImport)
        ));
    }
}
