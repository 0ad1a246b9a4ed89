// src/services/customer_service.rs

use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{CustomerRepository, SaleRepository},
    models::{
        customer::{Customer, CustomerFilter, CustomerInput},
        sale::SaleSummary,
    },
};

#[derive(Clone)]
pub struct CustomerService {
    customer_repo: CustomerRepository,
    sale_repo: SaleRepository,
}

impl CustomerService {
    pub fn new(customer_repo: CustomerRepository, sale_repo: SaleRepository) -> Self {
        Self { customer_repo, sale_repo }
    }

    pub async fn list_customers<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        filter: &CustomerFilter,
    ) -> Result<Vec<Customer>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let customers = self.customer_repo.list(executor, user_id).await?;
        Ok(customers.into_iter().filter(|c| filter.matches(c)).collect())
    }

    pub async fn get_customer<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        customer_id: Uuid,
    ) -> Result<Customer, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.customer_repo
            .find_by_id(executor, user_id, customer_id)
            .await?
            .ok_or(AppError::CustomerNotFound)
    }

    pub async fn create_customer<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        input: &CustomerInput,
    ) -> Result<Customer, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.customer_repo.create(executor, user_id, input).await
    }

    pub async fn update_customer<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        customer_id: Uuid,
        input: &CustomerInput,
    ) -> Result<Customer, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.customer_repo
            .update(executor, user_id, customer_id, input)
            .await?
            .ok_or(AppError::CustomerNotFound)
    }

    // Cliente com vendas não pode ser apagado (FK RESTRICT -> 409)
    pub async fn delete_customer<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        customer_id: Uuid,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        if !self.customer_repo.delete(executor, user_id, customer_id).await? {
            return Err(AppError::CustomerNotFound);
        }
        Ok(())
    }

    pub async fn sales_history<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        customer_id: Uuid,
    ) -> Result<Vec<SaleSummary>, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        self.customer_repo
            .find_by_id(&mut *tx, user_id, customer_id)
            .await?
            .ok_or(AppError::CustomerNotFound)?;

        let sales = self
            .sale_repo
            .list_by_customer(&mut *tx, user_id, customer_id)
            .await?;

        tx.commit().await?;
        Ok(sales)
    }
}
