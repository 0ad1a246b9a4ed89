// src/db/customer_repo.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::customer::{Customer, CustomerInput},
};

const CUSTOMER_COLUMNS: &str = "id, user_id, name, phone, email, birth_date, street, number, \
     neighborhood, city, state, complement, notes, created_at, updated_at";

#[derive(Clone, Default)]
pub struct CustomerRepository;

impl CustomerRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn list<'e, E>(&self, executor: E, user_id: Uuid) -> Result<Vec<Customer>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE user_id = $1 ORDER BY name ASC"
        );
        let customers = sqlx::query_as::<_, Customer>(&sql)
            .bind(user_id)
            .fetch_all(executor)
            .await?;
        Ok(customers)
    }

    pub async fn find_by_id<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        customer_id: Uuid,
    ) -> Result<Option<Customer>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql =
            format!("SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = $1 AND user_id = $2");
        let customer = sqlx::query_as::<_, Customer>(&sql)
            .bind(customer_id)
            .bind(user_id)
            .fetch_optional(executor)
            .await?;
        Ok(customer)
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        input: &CustomerInput,
    ) -> Result<Customer, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO customers
                (user_id, name, phone, email, birth_date, street, number,
                 neighborhood, city, state, complement, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {CUSTOMER_COLUMNS}
            "#
        );
        let customer = sqlx::query_as::<_, Customer>(&sql)
            .bind(user_id)
            .bind(&input.name)
            .bind(input.phone.as_deref())
            .bind(input.email.as_deref())
            .bind(input.birth_date)
            .bind(input.street.as_deref())
            .bind(input.number.as_deref())
            .bind(input.neighborhood.as_deref())
            .bind(input.city.as_deref())
            .bind(input.state.as_deref())
            .bind(input.complement.as_deref())
            .bind(input.notes.as_deref())
            .fetch_one(executor)
            .await?;
        Ok(customer)
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        customer_id: Uuid,
        input: &CustomerInput,
    ) -> Result<Option<Customer>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE customers
            SET name = $3, phone = $4, email = $5, birth_date = $6, street = $7,
                number = $8, neighborhood = $9, city = $10, state = $11,
                complement = $12, notes = $13, updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING {CUSTOMER_COLUMNS}
            "#
        );
        let customer = sqlx::query_as::<_, Customer>(&sql)
            .bind(customer_id)
            .bind(user_id)
            .bind(&input.name)
            .bind(input.phone.as_deref())
            .bind(input.email.as_deref())
            .bind(input.birth_date)
            .bind(input.street.as_deref())
            .bind(input.number.as_deref())
            .bind(input.neighborhood.as_deref())
            .bind(input.city.as_deref())
            .bind(input.state.as_deref())
            .bind(input.complement.as_deref())
            .bind(input.notes.as_deref())
            .fetch_optional(executor)
            .await?;
        Ok(customer)
    }

    pub async fn delete<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        customer_id: Uuid,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM customers WHERE id = $1 AND user_id = $2")
            .bind(customer_id)
            .bind(user_id)
            .execute(executor)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.is_foreign_key_violation() {
                        return AppError::CustomerHasSales;
                    }
                }
                AppError::from(e)
            })?;
        Ok(result.rows_affected() > 0)
    }
}
