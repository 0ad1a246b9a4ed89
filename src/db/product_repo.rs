// src/db/product_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::product::{Product, ProductInput},
};

const PRODUCT_COLUMNS: &str = "id, user_id, name, description, category, buy_price, sell_price, \
     stock_quantity, image_url, created_at, updated_at";

// Sem pool próprio: toda chamada recebe o executor (conexão ou transação com RLS).
#[derive(Clone, Default)]
pub struct ProductRepository;

impl ProductRepository {
    pub fn new() -> Self {
        Self
    }

    // ---
    // Leitura
    // ---

    pub async fn list<'e, E>(&self, executor: E, user_id: Uuid) -> Result<Vec<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE user_id = $1 ORDER BY name ASC"
        );
        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(user_id)
            .fetch_all(executor)
            .await?;
        Ok(products)
    }

    pub async fn find_by_id<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        product_id: Uuid,
    ) -> Result<Option<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1 AND user_id = $2");
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(product_id)
            .bind(user_id)
            .fetch_optional(executor)
            .await?;
        Ok(product)
    }

    /// Mesma busca, travando a linha até o fim da transação (FOR UPDATE).
    pub async fn find_for_update<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        product_id: Uuid,
    ) -> Result<Option<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1 AND user_id = $2 FOR UPDATE"
        );
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(product_id)
            .bind(user_id)
            .fetch_optional(executor)
            .await?;
        Ok(product)
    }

    // ---
    // Escrita
    // ---

    pub async fn create<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        input: &ProductInput,
        stock_quantity: i32,
    ) -> Result<Product, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO products
                (user_id, name, description, category, buy_price, sell_price, stock_quantity, image_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {PRODUCT_COLUMNS}
            "#
        );
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(user_id)
            .bind(&input.name)
            .bind(input.description.as_deref())
            .bind(input.category.as_deref())
            .bind(input.buy_price)
            .bind(input.sell_price)
            .bind(stock_quantity)
            .bind(input.image_url.as_deref())
            .fetch_one(executor)
            .await?;
        Ok(product)
    }

    /// Atualiza o cadastro. O estoque fica de fora (só muda por movimentação).
    pub async fn update<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        product_id: Uuid,
        input: &ProductInput,
    ) -> Result<Option<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE products
            SET name = $3, description = $4, category = $5,
                buy_price = $6, sell_price = $7, image_url = $8,
                updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING {PRODUCT_COLUMNS}
            "#
        );
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(product_id)
            .bind(user_id)
            .bind(&input.name)
            .bind(input.description.as_deref())
            .bind(input.category.as_deref())
            .bind(input.buy_price)
            .bind(input.sell_price)
            .bind(input.image_url.as_deref())
            .fetch_optional(executor)
            .await?;
        Ok(product)
    }

    /// Grava o novo saldo (e, numa entrada com custo, o novo custo médio).
    pub async fn set_stock<'e, E>(
        &self,
        executor: E,
        product_id: Uuid,
        stock_quantity: i32,
        buy_price: Option<Decimal>,
    ) -> Result<Product, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE products
            SET stock_quantity = $2,
                buy_price = COALESCE($3, buy_price),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {PRODUCT_COLUMNS}
            "#
        );
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(product_id)
            .bind(stock_quantity)
            .bind(buy_price)
            .fetch_one(executor)
            .await?;
        Ok(product)
    }

    /// `Ok(false)` quando o produto não existe.
    pub async fn delete<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        product_id: Uuid,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM products WHERE id = $1 AND user_id = $2")
            .bind(product_id)
            .bind(user_id)
            .execute(executor)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e {
                    // sale_items.product_id é ON DELETE RESTRICT
                    if db_err.is_foreign_key_violation() {
                        return AppError::ProductInUse;
                    }
                }
                AppError::from(e)
            })?;
        Ok(result.rows_affected() > 0)
    }
}
