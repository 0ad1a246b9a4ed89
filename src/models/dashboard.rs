// src/models/dashboard.rs

use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// Os cards e listas da tela inicial
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_inventory_value: Decimal, // Σ custo × estoque
    pub potential_revenue: Decimal,     // Σ venda × estoque
    pub monthly_revenue: Decimal,       // Vendas concluídas no mês
    pub monthly_expenses: Decimal,      // Entradas de estoque no mês
    pub total_customers: i64,
    pub low_stock_products: Vec<LowStockProduct>,
    pub top_customers: Vec<TopCustomer>,
    pub best_sellers: Vec<BestSeller>,
}

#[derive(Debug, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LowStockProduct {
    pub id: Uuid,
    pub name: String,
    pub stock_quantity: i32,
}

#[derive(Debug, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TopCustomer {
    pub id: Uuid,
    pub name: String,
    pub total_spent: Decimal,
}

#[derive(Debug, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BestSeller {
    pub id: Uuid,
    pub name: String,
    pub quantity_sold: i64,
}

// Totais agregados vindos de uma única consulta
#[derive(Debug, Default, FromRow)]
pub struct InventoryTotals {
    pub total_inventory_value: Decimal,
    pub potential_revenue: Decimal,
}
