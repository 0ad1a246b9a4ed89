// src/models/sale.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::common::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "sale_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SaleStatus {
    Completed,
    Cancelled,
}

// --- SALE (Cabeçalho) ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub id: Uuid,
    #[schema(ignore)]
    pub user_id: Uuid,
    pub customer_id: Uuid,
    #[schema(example = "240.00")]
    pub total_amount: Decimal,
    pub status: SaleStatus,
    pub cancellation_reason: Option<String>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaleItem {
    pub id: Uuid,
    pub sale_id: Uuid,
    pub product_id: Uuid,
    #[schema(example = 2)]
    pub quantity: i32,
    #[schema(example = "120.00")]
    pub unit_price: Decimal,
    pub created_at: DateTime<Utc>,
}

// Linha da listagem (com o nome do cliente e a quantidade de itens)
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaleSummary {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub customer_name: String,
    pub total_amount: Decimal,
    pub status: SaleStatus,
    pub item_count: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaleItemDetail {
    pub id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
}

impl SaleItemDetail {
    pub fn subtotal(&self) -> Decimal {
        Decimal::from(self.quantity) * self.unit_price
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaleDetail {
    #[serde(flatten)]
    pub sale: Sale,
    pub customer_name: String,
    pub items: Vec<SaleItemDetail>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SaleFilter {
    /// completed | cancelled
    pub status: Option<SaleStatus>,
}

/// Uma linha do carrinho
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: Uuid,
    #[schema(example = 1)]
    pub quantity: i32,
}

/// Junta linhas repetidas do mesmo produto, preservando a ordem da primeira
/// ocorrência. Carrinho vazio ou quantidade <= 0 é rejeitado.
pub fn merge_cart(lines: &[CartLine]) -> Result<Vec<CartLine>, AppError> {
    if lines.is_empty() {
        return Err(AppError::EmptyCart);
    }

    let mut merged: Vec<CartLine> = Vec::with_capacity(lines.len());
    for line in lines {
        if line.quantity <= 0 {
            return Err(AppError::InvalidQuantity);
        }
        match merged.iter_mut().find(|m| m.product_id == line.product_id) {
            Some(existing) => {
                existing.quantity = existing
                    .quantity
                    .checked_add(line.quantity)
                    .ok_or(AppError::InvalidQuantity)?;
            }
            None => merged.push(*line),
        }
    }
    Ok(merged)
}

/// Σ quantidade × preço unitário
pub fn sale_total<I>(lines: I) -> Decimal
where
    I: IntoIterator<Item = (i32, Decimal)>,
{
    lines
        .into_iter()
        .map(|(quantity, unit_price)| Decimal::from(quantity) * unit_price)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn line(product_id: Uuid, quantity: i32) -> CartLine {
        CartLine { product_id, quantity }
    }

    #[test]
    fn merge_cart_sums_duplicate_products() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let merged = merge_cart(&[line(a, 1), line(b, 2), line(a, 3)]).unwrap();

        assert_eq!(merged, vec![line(a, 4), line(b, 2)]);
    }

    #[test]
    fn merge_cart_rejects_empty_cart() {
        assert!(matches!(merge_cart(&[]), Err(AppError::EmptyCart)));
    }

    #[test]
    fn merge_cart_rejects_non_positive_quantity() {
        let a = Uuid::new_v4();
        assert!(matches!(merge_cart(&[line(a, 0)]), Err(AppError::InvalidQuantity)));
        assert!(matches!(merge_cart(&[line(a, 2), line(a, -1)]), Err(AppError::InvalidQuantity)));
    }

    #[test]
    fn total_is_sum_of_quantity_times_price() {
        let total = sale_total([(2, dec!(120.00)), (1, dec!(35.50))]);
        assert_eq!(total, dec!(275.50));
        assert_eq!(sale_total(std::iter::empty()), Decimal::ZERO);
    }

    #[test]
    fn status_wire_names() {
        assert_eq!(serde_json::to_value(SaleStatus::Cancelled).unwrap(), "cancelled");
    }
}
