// src/models/stock.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::product::ProductView;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "stock_movement_type", rename_all = "lowercase")] // Banco
#[serde(rename_all = "lowercase")] // JSON
pub enum MovementType {
    Entry, // "entry"
    Exit,  // "exit"
}

impl MovementType {
    /// Sinal aplicado ao estoque
    pub fn signed(self, quantity: i32) -> i32 {
        match self {
            MovementType::Entry => quantity,
            MovementType::Exit => -quantity,
        }
    }
}

// --- STOCK MOVEMENT (Histórico) ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockMovement {
    pub id: Uuid,
    #[schema(ignore)]
    pub user_id: Uuid,
    pub product_id: Uuid,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub movement_type: MovementType,
    #[schema(example = 5)]
    pub quantity: i32,
    pub sale_id: Option<Uuid>,
    #[schema(example = "Reposição do fornecedor")]
    pub reason: Option<String>,
    pub unit_cost: Option<Decimal>,
    pub created_at: DateTime<Utc>,
}

// Resposta do registro de movimentação: o lançamento + o produto atualizado
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MovementResult {
    pub movement: StockMovement,
    pub product: ProductView,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn movement_type_sign() {
        assert_eq!(MovementType::Entry.signed(4), 4);
        assert_eq!(MovementType::Exit.signed(4), -4);
    }

    #[test]
    fn movement_type_wire_names() {
        assert_eq!(serde_json::to_value(MovementType::Entry).unwrap(), "entry");
        let parsed: MovementType = serde_json::from_str("\"exit\"").unwrap();
        assert_eq!(parsed, MovementType::Exit);
    }
}
