// src/services/sale_service.rs

use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{stock_repo::NewMovement, CustomerRepository, ProductRepository, SaleRepository, StockRepository},
    models::{
        sale::{merge_cart, sale_total, CartLine, SaleDetail, SaleItemDetail, SaleStatus, SaleSummary},
        stock::MovementType,
    },
    services::stock_service::apply_movement,
};

pub const SALE_REASON: &str = "Venda";
pub const CANCELLATION_REASON: &str = "Cancelamento da venda";

#[derive(Clone)]
pub struct SaleService {
    sale_repo: SaleRepository,
    product_repo: ProductRepository,
    customer_repo: CustomerRepository,
    stock_repo: StockRepository,
}

impl SaleService {
    pub fn new(
        sale_repo: SaleRepository,
        product_repo: ProductRepository,
        customer_repo: CustomerRepository,
        stock_repo: StockRepository,
    ) -> Self {
        Self { sale_repo, product_repo, customer_repo, stock_repo }
    }

    // --- CREATE SALE ---
    // Tudo ou nada: venda, itens, saídas de estoque e baixas na mesma transação.
    pub async fn create_sale<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        customer_id: Uuid,
        lines: &[CartLine],
    ) -> Result<SaleDetail, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut cart = merge_cart(lines)?;
        // Ordem fixa de travamento entre vendas concorrentes
        cart.sort_by_key(|line| line.product_id);

        let mut tx = executor.begin().await?;

        let customer = self
            .customer_repo
            .find_by_id(&mut *tx, user_id, customer_id)
            .await?
            .ok_or(AppError::CustomerNotFound)?;

        // 1. Trava cada produto e valida o saldo antes de gravar qualquer coisa
        let mut checked = Vec::with_capacity(cart.len());
        for line in &cart {
            let product = self
                .product_repo
                .find_for_update(&mut *tx, user_id, line.product_id)
                .await?
                .ok_or(AppError::ProductNotFound)?;

            let new_quantity = apply_movement(&product, MovementType::Exit, line.quantity)?;
            checked.push((product, line.quantity, new_quantity));
        }

        // 2. Total calculado com o preço de venda atual
        let total = sale_total(checked.iter().map(|(p, qty, _)| (*qty, p.sell_price)));
        let sale = self
            .sale_repo
            .create_sale(&mut *tx, user_id, customer_id, total)
            .await?;

        // 3. Itens + saídas + baixa de estoque
        let mut items = Vec::with_capacity(checked.len());
        for (product, quantity, new_quantity) in checked {
            let item = self
                .sale_repo
                .add_item(&mut *tx, sale.id, product.id, quantity, product.sell_price)
                .await?;

            self.stock_repo
                .record_movement(
                    &mut *tx,
                    user_id,
                    &NewMovement {
                        product_id: product.id,
                        movement_type: MovementType::Exit,
                        quantity,
                        sale_id: Some(sale.id),
                        reason: Some(SALE_REASON),
                        unit_cost: None,
                    },
                )
                .await?;

            self.product_repo
                .set_stock(&mut *tx, product.id, new_quantity, None)
                .await?;

            items.push(SaleItemDetail {
                id: item.id,
                product_id: product.id,
                product_name: product.name,
                quantity: item.quantity,
                unit_price: item.unit_price,
            });
        }

        tx.commit().await?;

        tracing::info!(
            "🛒 Venda {} registrada: {} itens, total {}",
            sale.id,
            items.len(),
            sale.total_amount
        );

        Ok(SaleDetail { sale, customer_name: customer.name, items })
    }

    // --- CANCEL SALE ---
    // Devolve cada item ao estoque com uma entrada vinculada à venda.
    pub async fn cancel_sale<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        sale_id: Uuid,
        reason: &str,
    ) -> Result<SaleDetail, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let sale = self
            .sale_repo
            .find_for_update(&mut *tx, user_id, sale_id)
            .await?
            .ok_or(AppError::SaleNotFound)?;

        if sale.status != SaleStatus::Completed {
            return Err(AppError::SaleAlreadyCancelled);
        }

        let mut items = self.sale_repo.list_items(&mut *tx, sale_id).await?;
        items.sort_by_key(|item| item.product_id);

        for item in &items {
            let product = self
                .product_repo
                .find_for_update(&mut *tx, user_id, item.product_id)
                .await?
                .ok_or(AppError::ProductNotFound)?;

            let new_quantity = apply_movement(&product, MovementType::Entry, item.quantity)?;

            self.stock_repo
                .record_movement(
                    &mut *tx,
                    user_id,
                    &NewMovement {
                        product_id: item.product_id,
                        movement_type: MovementType::Entry,
                        quantity: item.quantity,
                        sale_id: Some(sale_id),
                        reason: Some(CANCELLATION_REASON),
                        unit_cost: None,
                    },
                )
                .await?;

            self.product_repo
                .set_stock(&mut *tx, item.product_id, new_quantity, None)
                .await?;
        }

        let cancelled = self.sale_repo.mark_cancelled(&mut *tx, sale_id, reason).await?;
        let customer_name = self.sale_repo.customer_name(&mut *tx, cancelled.customer_id).await?;

        tx.commit().await?;

        tracing::info!("↩️ Venda {} cancelada ({} itens devolvidos)", sale_id, items.len());

        Ok(SaleDetail { sale: cancelled, customer_name, items })
    }

    pub async fn list_sales<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        status: Option<SaleStatus>,
    ) -> Result<Vec<SaleSummary>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.sale_repo.list(executor, user_id, status).await
    }

    pub async fn get_sale<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        sale_id: Uuid,
    ) -> Result<SaleDetail, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let sale = self
            .sale_repo
            .find_by_id(&mut *tx, user_id, sale_id)
            .await?
            .ok_or(AppError::SaleNotFound)?;
        let customer_name = self.sale_repo.customer_name(&mut *tx, sale.customer_id).await?;
        let items = self.sale_repo.list_items(&mut *tx, sale_id).await?;

        tx.commit().await?;
        Ok(SaleDetail { sale, customer_name, items })
    }
}
