// src/db/dashboard_repo.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::dashboard::{BestSeller, DashboardSummary, InventoryTotals, LowStockProduct, TopCustomer},
};

const TOP_LIMIT: i64 = 5;

#[derive(Clone, Default)]
pub struct DashboardRepository;

impl DashboardRepository {
    pub fn new() -> Self {
        Self
    }

    /// Todos os indicadores de uma vez, lidos no mesmo snapshot.
    pub async fn get_summary<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        month_start: DateTime<Utc>,
        low_stock_threshold: i32,
    ) -> Result<DashboardSummary, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        // A. Valor do estoque (custo e venda)
        let totals = sqlx::query_as::<_, InventoryTotals>(
            r#"
            SELECT
                COALESCE(SUM(buy_price * stock_quantity), 0) AS total_inventory_value,
                COALESCE(SUM(sell_price * stock_quantity), 0) AS potential_revenue
            FROM products
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        // B. Faturamento do mês (só vendas concluídas)
        let monthly_revenue: Decimal = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(total_amount), 0)
            FROM sales
            WHERE user_id = $1 AND status = 'completed' AND created_at >= $2
            "#,
        )
        .bind(user_id)
        .bind(month_start)
        .fetch_one(&mut *tx)
        .await?;

        // C. Gastos do mês: entradas de estoque, sem as devoluções de cancelamento
        let monthly_expenses: Decimal = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(m.quantity * COALESCE(m.unit_cost, p.buy_price)), 0)
            FROM stock_movements m
            JOIN products p ON p.id = m.product_id
            WHERE m.user_id = $1
              AND m.type = 'entry'
              AND m.sale_id IS NULL
              AND m.created_at >= $2
            "#,
        )
        .bind(user_id)
        .bind(month_start)
        .fetch_one(&mut *tx)
        .await?;

        let total_customers: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM customers WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(&mut *tx)
                .await?;

        let low_stock_products = sqlx::query_as::<_, LowStockProduct>(
            r#"
            SELECT id, name, stock_quantity
            FROM products
            WHERE user_id = $1 AND stock_quantity < $2
            ORDER BY stock_quantity ASC, name ASC
            "#,
        )
        .bind(user_id)
        .bind(low_stock_threshold)
        .fetch_all(&mut *tx)
        .await?;

        let top_customers = sqlx::query_as::<_, TopCustomer>(
            r#"
            SELECT c.id, c.name, SUM(s.total_amount) AS total_spent
            FROM sales s
            JOIN customers c ON c.id = s.customer_id
            WHERE s.user_id = $1 AND s.status = 'completed'
            GROUP BY c.id, c.name
            ORDER BY total_spent DESC, c.name ASC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(TOP_LIMIT)
        .fetch_all(&mut *tx)
        .await?;

        let best_sellers = sqlx::query_as::<_, BestSeller>(
            r#"
            SELECT p.id, p.name, SUM(si.quantity)::BIGINT AS quantity_sold
            FROM sale_items si
            JOIN sales s ON s.id = si.sale_id
            JOIN products p ON p.id = si.product_id
            WHERE s.user_id = $1 AND s.status = 'completed' AND s.created_at >= $2
            GROUP BY p.id, p.name
            ORDER BY quantity_sold DESC, p.name ASC
            LIMIT $3
            "#,
        )
        .bind(user_id)
        .bind(month_start)
        .bind(TOP_LIMIT)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(DashboardSummary {
            total_inventory_value: totals.total_inventory_value,
            potential_revenue: totals.potential_revenue,
            monthly_revenue,
            monthly_expenses,
            total_customers,
            low_stock_products,
            top_customers,
            best_sellers,
        })
    }
}
