// src/services/product_service.rs

use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{stock_repo::NewMovement, ProductRepository, StockRepository},
    models::{
        product::{ProductFilter, ProductInput, ProductView},
        stock::MovementType,
    },
};

pub const INITIAL_STOCK_REASON: &str = "Estoque inicial";

#[derive(Clone)]
pub struct ProductService {
    product_repo: ProductRepository,
    stock_repo: StockRepository,
    low_stock_threshold: i32,
}

impl ProductService {
    pub fn new(
        product_repo: ProductRepository,
        stock_repo: StockRepository,
        low_stock_threshold: i32,
    ) -> Self {
        Self { product_repo, stock_repo, low_stock_threshold }
    }

    pub async fn list_products<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        filter: &ProductFilter,
    ) -> Result<Vec<ProductView>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let products = self.product_repo.list(executor, user_id).await?;

        Ok(products
            .into_iter()
            .filter(|p| filter.matches(p))
            .map(|p| ProductView::new(p, self.low_stock_threshold))
            .collect())
    }

    pub async fn get_product<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        product_id: Uuid,
    ) -> Result<ProductView, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.product_repo
            .find_by_id(executor, user_id, product_id)
            .await?
            .map(|p| ProductView::new(p, self.low_stock_threshold))
            .ok_or(AppError::ProductNotFound)
    }

    // --- CREATE PRODUCT ---
    // Estoque inicial > 0 vira uma entrada no histórico, na mesma transação.
    pub async fn create_product<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        input: &ProductInput,
        initial_stock: i32,
    ) -> Result<ProductView, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        if initial_stock < 0 {
            return Err(AppError::InvalidQuantity);
        }

        let mut tx = executor.begin().await?;

        let product = self
            .product_repo
            .create(&mut *tx, user_id, input, initial_stock)
            .await?;

        if initial_stock > 0 {
            self.stock_repo
                .record_movement(
                    &mut *tx,
                    user_id,
                    &NewMovement {
                        product_id: product.id,
                        movement_type: MovementType::Entry,
                        quantity: initial_stock,
                        sale_id: None,
                        reason: Some(INITIAL_STOCK_REASON),
                        unit_cost: Some(input.buy_price),
                    },
                )
                .await?;
        }

        tx.commit().await?;
        Ok(ProductView::new(product, self.low_stock_threshold))
    }

    pub async fn update_product<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        product_id: Uuid,
        input: &ProductInput,
    ) -> Result<ProductView, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.product_repo
            .update(executor, user_id, product_id, input)
            .await?
            .map(|p| ProductView::new(p, self.low_stock_threshold))
            .ok_or(AppError::ProductNotFound)
    }

    pub async fn delete_product<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        product_id: Uuid,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        if !self.product_repo.delete(executor, user_id, product_id).await? {
            return Err(AppError::ProductNotFound);
        }
        Ok(())
    }
}
