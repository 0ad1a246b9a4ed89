// src/db/stock_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::stock::{MovementType, StockMovement},
};

/// Lançamento a ser gravado no histórico
#[derive(Debug, Clone)]
pub struct NewMovement<'a> {
    pub product_id: Uuid,
    pub movement_type: MovementType,
    pub quantity: i32,
    pub sale_id: Option<Uuid>,
    pub reason: Option<&'a str>,
    pub unit_cost: Option<Decimal>,
}

#[derive(Clone, Default)]
pub struct StockRepository;

impl StockRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn record_movement<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        movement: &NewMovement<'_>,
    ) -> Result<StockMovement, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let recorded = sqlx::query_as::<_, StockMovement>(
            r#"
            INSERT INTO stock_movements
                (user_id, product_id, type, quantity, sale_id, reason, unit_cost)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, user_id, product_id, type, quantity, sale_id, reason, unit_cost, created_at
            "#,
        )
        .bind(user_id)
        .bind(movement.product_id)
        .bind(movement.movement_type)
        .bind(movement.quantity)
        .bind(movement.sale_id)
        .bind(movement.reason)
        .bind(movement.unit_cost)
        .fetch_one(executor)
        .await?;
        Ok(recorded)
    }

    // Histórico do produto, mais recentes primeiro
    pub async fn list_by_product<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        product_id: Uuid,
    ) -> Result<Vec<StockMovement>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let movements = sqlx::query_as::<_, StockMovement>(
            r#"
            SELECT id, user_id, product_id, type, quantity, sale_id, reason, unit_cost, created_at
            FROM stock_movements
            WHERE product_id = $1 AND user_id = $2
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(product_id)
        .bind(user_id)
        .fetch_all(executor)
        .await?;
        Ok(movements)
    }
}
