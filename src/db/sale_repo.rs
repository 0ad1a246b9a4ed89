// src/db/sale_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::sale::{Sale, SaleItem, SaleItemDetail, SaleStatus, SaleSummary},
};

const SALE_COLUMNS: &str =
    "id, user_id, customer_id, total_amount, status, cancellation_reason, cancelled_at, created_at";

const SUMMARY_SELECT: &str = r#"
    SELECT s.id, s.customer_id, c.name AS customer_name, s.total_amount, s.status,
           COUNT(si.id) AS item_count, s.created_at
    FROM sales s
    JOIN customers c ON c.id = s.customer_id
    LEFT JOIN sale_items si ON si.sale_id = s.id
"#;

#[derive(Clone, Default)]
pub struct SaleRepository;

impl SaleRepository {
    pub fn new() -> Self {
        Self
    }

    // ---
    // Cabeçalho
    // ---

    pub async fn create_sale<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        customer_id: Uuid,
        total_amount: Decimal,
    ) -> Result<Sale, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO sales (user_id, customer_id, total_amount, status)
            VALUES ($1, $2, $3, 'completed')
            RETURNING {SALE_COLUMNS}
            "#
        );
        let sale = sqlx::query_as::<_, Sale>(&sql)
            .bind(user_id)
            .bind(customer_id)
            .bind(total_amount)
            .fetch_one(executor)
            .await?;
        Ok(sale)
    }

    pub async fn find_by_id<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        sale_id: Uuid,
    ) -> Result<Option<Sale>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {SALE_COLUMNS} FROM sales WHERE id = $1 AND user_id = $2");
        let sale = sqlx::query_as::<_, Sale>(&sql)
            .bind(sale_id)
            .bind(user_id)
            .fetch_optional(executor)
            .await?;
        Ok(sale)
    }

    /// Trava a venda para o cancelamento (dois cancelamentos simultâneos
    /// esperam um pelo outro).
    pub async fn find_for_update<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        sale_id: Uuid,
    ) -> Result<Option<Sale>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "SELECT {SALE_COLUMNS} FROM sales WHERE id = $1 AND user_id = $2 FOR UPDATE"
        );
        let sale = sqlx::query_as::<_, Sale>(&sql)
            .bind(sale_id)
            .bind(user_id)
            .fetch_optional(executor)
            .await?;
        Ok(sale)
    }

    pub async fn mark_cancelled<'e, E>(
        &self,
        executor: E,
        sale_id: Uuid,
        reason: &str,
    ) -> Result<Sale, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE sales
            SET status = 'cancelled', cancellation_reason = $2, cancelled_at = NOW()
            WHERE id = $1
            RETURNING {SALE_COLUMNS}
            "#
        );
        let sale = sqlx::query_as::<_, Sale>(&sql)
            .bind(sale_id)
            .bind(reason)
            .fetch_one(executor)
            .await?;
        Ok(sale)
    }

    pub async fn customer_name<'e, E>(
        &self,
        executor: E,
        customer_id: Uuid,
    ) -> Result<String, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let name: String = sqlx::query_scalar("SELECT name FROM customers WHERE id = $1")
            .bind(customer_id)
            .fetch_one(executor)
            .await?;
        Ok(name)
    }

    // ---
    // Listagens
    // ---

    pub async fn list<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        status: Option<SaleStatus>,
    ) -> Result<Vec<SaleSummary>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            {SUMMARY_SELECT}
            WHERE s.user_id = $1 AND ($2::sale_status IS NULL OR s.status = $2)
            GROUP BY s.id, c.name
            ORDER BY s.created_at DESC
            "#
        );
        let sales = sqlx::query_as::<_, SaleSummary>(&sql)
            .bind(user_id)
            .bind(status)
            .fetch_all(executor)
            .await?;
        Ok(sales)
    }

    pub async fn list_by_customer<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        customer_id: Uuid,
    ) -> Result<Vec<SaleSummary>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            {SUMMARY_SELECT}
            WHERE s.user_id = $1 AND s.customer_id = $2
            GROUP BY s.id, c.name
            ORDER BY s.created_at DESC
            "#
        );
        let sales = sqlx::query_as::<_, SaleSummary>(&sql)
            .bind(user_id)
            .bind(customer_id)
            .fetch_all(executor)
            .await?;
        Ok(sales)
    }

    // ---
    // Itens
    // ---

    pub async fn add_item<'e, E>(
        &self,
        executor: E,
        sale_id: Uuid,
        product_id: Uuid,
        quantity: i32,
        unit_price: Decimal,
    ) -> Result<SaleItem, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let item = sqlx::query_as::<_, SaleItem>(
            r#"
            INSERT INTO sale_items (sale_id, product_id, quantity, unit_price)
            VALUES ($1, $2, $3, $4)
            RETURNING id, sale_id, product_id, quantity, unit_price, created_at
            "#,
        )
        .bind(sale_id)
        .bind(product_id)
        .bind(quantity)
        .bind(unit_price)
        .fetch_one(executor)
        .await?;
        Ok(item)
    }

    pub async fn list_items<'e, E>(
        &self,
        executor: E,
        sale_id: Uuid,
    ) -> Result<Vec<SaleItemDetail>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let items = sqlx::query_as::<_, SaleItemDetail>(
            r#"
            SELECT si.id, si.product_id, p.name AS product_name, si.quantity, si.unit_price
            FROM sale_items si
            JOIN products p ON p.id = si.product_id
            WHERE si.sale_id = $1
            ORDER BY si.created_at ASC, p.name ASC
            "#,
        )
        .bind(sale_id)
        .fetch_all(executor)
        .await?;
        Ok(items)
    }
}
