// src/models/product.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

/// Categorias oferecidas no cadastro. A coluna é texto livre (importações
/// podem trazer outras), mas o formulário usa esta lista.
pub const PRODUCT_CATEGORIES: [&str; 6] =
    ["Anéis", "Brincos", "Colares", "Pulseiras", "Conjuntos", "Outros"];

pub const DEFAULT_CATEGORY: &str = "Outros";

/// Maior valor que cabe nas colunas NUMERIC(12, 2).
pub const MAX_MONEY: Decimal = Decimal::from_parts(0xD4A5_0FFF, 0xE8, 0, false, 2); // 9_999_999_999.99

/// Valor monetário gravável (já arredondado em centavos).
pub fn fits_money_column(value: Decimal) -> bool {
    value.round_dp(2) <= MAX_MONEY
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    #[schema(ignore)]
    pub user_id: Uuid,
    #[schema(example = "Brinco de Ouro")]
    pub name: String,
    pub description: Option<String>,
    #[schema(example = "Brincos")]
    pub category: Option<String>,
    #[schema(example = "50.00")]
    pub buy_price: Decimal,
    #[schema(example = "120.00")]
    pub sell_price: Decimal,
    #[schema(example = 10)]
    pub stock_quantity: i32,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// O que a API devolve: o produto + o alerta de estoque baixo já calculado.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
    #[serde(flatten)]
    pub product: Product,
    pub low_stock: bool,
}

impl ProductView {
    pub fn new(product: Product, low_stock_threshold: i32) -> Self {
        let low_stock = product.stock_quantity < low_stock_threshold;
        Self { product, low_stock }
    }
}

// Dados já validados e normalizados, prontos para o repositório.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductInput {
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub buy_price: Decimal,
    pub sell_price: Decimal,
    pub image_url: Option<String>,
}

/// Filtros da listagem (`?search=&category=&inStock=`)
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ProductFilter {
    /// Busca por nome ou categoria (sem diferenciar maiúsculas)
    pub search: Option<String>,
    /// Categoria exata
    pub category: Option<String>,
    /// Só produtos com estoque > 0
    pub in_stock: Option<bool>,
}

impl ProductFilter {
    pub fn matches(&self, product: &Product) -> bool {
        if self.in_stock.unwrap_or(false) && product.stock_quantity <= 0 {
            return false;
        }

        if let Some(category) = self.category.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
            let same = product
                .category
                .as_deref()
                .is_some_and(|c| c.to_lowercase() == category.to_lowercase());
            if !same {
                return false;
            }
        }

        match self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            None => true,
            Some(term) => {
                let term = term.to_lowercase();
                product.name.to_lowercase().contains(&term)
                    || product
                        .category
                        .as_deref()
                        .is_some_and(|c| c.to_lowercase().contains(&term))
            }
        }
    }
}

#[cfg(test)]
pub(crate) fn sample_product(name: &str, category: Option<&str>, stock: i32) -> Product {
    use rust_decimal_macros::dec;

    Product {
        id: Uuid::new_v4(),
        user_id: Uuid::nil(),
        name: name.to_string(),
        description: None,
        category: category.map(str::to_string),
        buy_price: dec!(50),
        sell_price: dec!(120),
        stock_quantity: stock,
        image_url: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn search(term: &str) -> ProductFilter {
        ProductFilter { search: Some(term.to_string()), ..Default::default() }
    }

    #[test]
    fn search_matches_name_case_insensitively() {
        let p = sample_product("Colar Pérola", Some("Colares"), 2);
        assert!(search("pérola").matches(&p));
        assert!(search("COLAR").matches(&p));
        assert!(!search("anel").matches(&p));
    }

    #[test]
    fn search_matches_category() {
        let p = sample_product("Argola Dourada", Some("Brincos"), 5);
        assert!(search("brin").matches(&p));
    }

    #[test]
    fn search_ignores_missing_category() {
        let p = sample_product("Argola Dourada", None, 5);
        assert!(!search("brin").matches(&p));
        assert!(search("   ").matches(&p));
    }

    #[test]
    fn category_filter_is_exact() {
        let p = sample_product("Anel Solitário", Some("Anéis"), 1);
        let exact = ProductFilter { category: Some("anéis".into()), ..Default::default() };
        let partial = ProductFilter { category: Some("Ané".into()), ..Default::default() };
        assert!(exact.matches(&p));
        assert!(!partial.matches(&p));
    }

    #[test]
    fn in_stock_filter_hides_empty_products() {
        let filter = ProductFilter { in_stock: Some(true), ..Default::default() };
        assert!(!filter.matches(&sample_product("Pulseira", None, 0)));
        assert!(filter.matches(&sample_product("Pulseira", None, 1)));
    }

    #[test]
    fn low_stock_is_strictly_below_threshold() {
        assert!(ProductView::new(sample_product("A", None, 2), 3).low_stock);
        assert!(!ProductView::new(sample_product("A", None, 3), 3).low_stock);
    }
}
