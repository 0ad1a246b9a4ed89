// src/services/stock_service.rs

use rust_decimal::Decimal;
use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{stock_repo::NewMovement, ProductRepository, StockRepository},
    models::{
        product::{Product, ProductView},
        stock::{MovementResult, MovementType, StockMovement},
    },
};

/// Custo médio ponderado após uma entrada.
pub fn calculate_new_average_cost(
    current_qty: i32,
    current_avg: Decimal,
    incoming_qty: i32,
    incoming_cost: Decimal,
) -> Decimal {
    let current_qty = Decimal::from(current_qty.max(0));
    let incoming_qty = Decimal::from(incoming_qty);

    let total_current_value = current_qty * current_avg;
    let total_incoming_value = incoming_qty * incoming_cost;
    let new_total_qty = current_qty + incoming_qty;

    if new_total_qty <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    ((total_current_value + total_incoming_value) / new_total_qty).round_dp(2)
}

/// Saldo depois do movimento, ou o erro de estoque insuficiente.
pub fn apply_movement(
    product: &Product,
    movement_type: MovementType,
    quantity: i32,
) -> Result<i32, AppError> {
    if quantity <= 0 {
        return Err(AppError::InvalidQuantity);
    }

    let new_quantity = product
        .stock_quantity
        .checked_add(movement_type.signed(quantity))
        .ok_or(AppError::InvalidQuantity)?;

    if new_quantity < 0 {
        return Err(AppError::InsufficientStock {
            product: product.name.clone(),
            available: product.stock_quantity,
            requested: quantity,
        });
    }
    Ok(new_quantity)
}

// Dados de um lançamento manual
#[derive(Debug, Clone)]
pub struct MovementRequest<'a> {
    pub movement_type: MovementType,
    pub quantity: i32,
    pub reason: Option<&'a str>,
    pub unit_cost: Option<Decimal>,
}

#[derive(Clone)]
pub struct StockService {
    product_repo: ProductRepository,
    stock_repo: StockRepository,
    low_stock_threshold: i32,
}

impl StockService {
    pub fn new(
        product_repo: ProductRepository,
        stock_repo: StockRepository,
        low_stock_threshold: i32,
    ) -> Self {
        Self { product_repo, stock_repo, low_stock_threshold }
    }

    // --- REGISTER MOVEMENT (ENTRADA / SAÍDA) ---
    pub async fn register_movement<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        product_id: Uuid,
        request: &MovementRequest<'_>,
    ) -> Result<MovementResult, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        // 1. Trava o produto
        let product = self
            .product_repo
            .find_for_update(&mut *tx, user_id, product_id)
            .await?
            .ok_or(AppError::ProductNotFound)?;

        // 2. Calcula o novo saldo (e o custo médio, se for entrada com custo)
        let new_quantity = apply_movement(&product, request.movement_type, request.quantity)?;

        let new_buy_price = match (request.movement_type, request.unit_cost) {
            (MovementType::Entry, Some(cost)) => Some(calculate_new_average_cost(
                product.stock_quantity,
                product.buy_price,
                request.quantity,
                cost,
            )),
            _ => None,
        };

        // 3. Grava histórico + saldo
        let movement = self
            .stock_repo
            .record_movement(
                &mut *tx,
                user_id,
                &NewMovement {
                    product_id,
                    movement_type: request.movement_type,
                    quantity: request.quantity,
                    sale_id: None,
                    reason: request.reason,
                    unit_cost: request.unit_cost,
                },
            )
            .await?;

        let updated = self
            .product_repo
            .set_stock(&mut *tx, product_id, new_quantity, new_buy_price)
            .await?;

        tx.commit().await?;

        tracing::info!(
            "📦 Movimentação {:?} de {} un. no produto {} (saldo: {})",
            request.movement_type,
            request.quantity,
            product_id,
            new_quantity
        );

        Ok(MovementResult {
            movement,
            product: ProductView::new(updated, self.low_stock_threshold),
        })
    }

    pub async fn list_movements<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        product_id: Uuid,
    ) -> Result<Vec<StockMovement>, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        // 404 para produto inexistente, em vez de lista vazia
        self.product_repo
            .find_by_id(&mut *tx, user_id, product_id)
            .await?
            .ok_or(AppError::ProductNotFound)?;

        let movements = self
            .stock_repo
            .list_by_product(&mut *tx, user_id, product_id)
            .await?;

        tx.commit().await?;
        Ok(movements)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::product::sample_product;
    use rust_decimal_macros::dec;

    #[test]
    fn average_cost_weights_current_and_incoming_stock() {
        // 10 un. a 50,00 + 10 un. a 70,00 = 60,00
        assert_eq!(calculate_new_average_cost(10, dec!(50), 10, dec!(70)), dec!(60));
        // 3 un. a 10,00 + 1 un. a 20,00 = 12,50
        assert_eq!(calculate_new_average_cost(3, dec!(10), 1, dec!(20)), dec!(12.50));
    }

    #[test]
    fn average_cost_with_empty_stock_is_incoming_cost() {
        assert_eq!(calculate_new_average_cost(0, dec!(99), 5, dec!(42.10)), dec!(42.10));
    }

    #[test]
    fn average_cost_is_rounded_to_cents() {
        // (1 × 10 + 2 × 10,01) / 3 = 10,00666...
        assert_eq!(calculate_new_average_cost(1, dec!(10), 2, dec!(10.01)), dec!(10.01));
    }

    #[test]
    fn exit_beyond_stock_is_insufficient() {
        let product = sample_product("Colar", None, 2);
        let err = apply_movement(&product, MovementType::Exit, 3).unwrap_err();

        match err {
            AppError::InsufficientStock { available, requested, .. } => {
                assert_eq!(available, 2);
                assert_eq!(requested, 3);
            }
            other => panic!("erro inesperado: {other:?}"),
        }
    }

    #[test]
    fn exit_of_whole_stock_reaches_zero() {
        let product = sample_product("Colar", None, 2);
        assert_eq!(apply_movement(&product, MovementType::Exit, 2).unwrap(), 0);
        assert_eq!(apply_movement(&product, MovementType::Entry, 5).unwrap(), 7);
    }

    #[test]
    fn non_positive_quantity_is_rejected() {
        let product = sample_product("Colar", None, 2);
        assert!(matches!(
            apply_movement(&product, MovementType::Entry, 0),
            Err(AppError::InvalidQuantity)
        ));
        assert!(matches!(
            apply_movement(&product, MovementType::Exit, -1),
            Err(AppError::InvalidQuantity)
        ));
    }
}
