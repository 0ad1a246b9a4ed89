// src/models/import.rs

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::str::FromStr;
use utoipa::ToSchema;

use crate::{
    common::format::{date_from_spreadsheet_serial, parse_date_flexible, parse_decimal_br},
    models::{
        customer::CustomerInput,
        product::{fits_money_column, ProductInput, DEFAULT_CATEGORY},
    },
};

// Cabeçalhos das planilhas (modelo, importação e exportação)
pub const PRODUCT_HEADERS: [&str; 6] =
    ["Nome", "Categoria", "Custo (R$)", "Venda (R$)", "Estoque", "Descrição"];

pub const CUSTOMER_HEADERS: [&str; 10] = [
    "Nome",
    "Telefone",
    "Data Nascimento",
    "Rua",
    "Número",
    "Bairro",
    "Cidade",
    "Estado",
    "Complemento",
    "Observações",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ImportKind {
    Products,
    Customers,
}

impl ImportKind {
    pub fn template_file_name(self) -> &'static str {
        match self {
            ImportKind::Products => "modelo_produtos.csv",
            ImportKind::Customers => "modelo_clientes.csv",
        }
    }

    pub fn export_file_name(self) -> &'static str {
        match self {
            ImportKind::Products => "produtos.csv",
            ImportKind::Customers => "clientes.csv",
        }
    }
}

/// Linhas da planilha já convertidas em objetos JSON (cabeçalho -> célula)
#[derive(Debug, Deserialize, ToSchema)]
pub struct ImportPayload {
    #[schema(value_type = Vec<Object>)]
    pub rows: Vec<Map<String, Value>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImportResult {
    pub imported: usize,
    pub skipped: usize,
}

// Produto lido de uma linha, com o estoque inicial separado do cadastro
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedProduct {
    pub input: ProductInput,
    pub stock_quantity: i32,
}

// ---
// Coerção das células
// ---

fn cell<'a>(row: &'a Map<String, Value>, header: &str) -> Option<&'a Value> {
    row.get(header).filter(|v| !v.is_null())
}

/// Texto da célula, aparado; números viram texto (telefone, número da casa).
pub fn cell_text(row: &Map<String, Value>, header: &str) -> Option<String> {
    let text = match cell(row, header)? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    Some(text).filter(|t| !t.is_empty())
}

pub fn cell_decimal(row: &Map<String, Value>, header: &str) -> Option<Decimal> {
    match cell(row, header)? {
        Value::Number(n) => Decimal::from_str(&n.to_string())
            .ok()
            .or_else(|| n.as_f64().and_then(Decimal::from_f64_retain)),
        Value::String(s) => parse_decimal_br(s),
        _ => None,
    }
}

pub fn cell_date(row: &Map<String, Value>, header: &str) -> Option<chrono::NaiveDate> {
    match cell(row, header)? {
        Value::Number(n) => n.as_f64().and_then(date_from_spreadsheet_serial),
        Value::String(s) => parse_date_flexible(s),
        _ => None,
    }
}

/// Linha de produto -> cadastro. `None` = linha ignorada (sem nome, preço de
/// venda <= 0, valores negativos ou acima do que a coluna comporta).
pub fn product_from_row(row: &Map<String, Value>) -> Option<ImportedProduct> {
    let name = cell_text(row, "Nome")?;
    let sell_price = cell_decimal(row, "Venda (R$)").filter(|p| *p > Decimal::ZERO)?;
    let buy_price = cell_decimal(row, "Custo (R$)").unwrap_or(Decimal::ZERO);
    let stock = cell_decimal(row, "Estoque").unwrap_or(Decimal::ZERO).trunc();

    if buy_price.is_sign_negative() || stock.is_sign_negative() {
        return None;
    }
    if !fits_money_column(buy_price) || !fits_money_column(sell_price) {
        return None;
    }
    let stock_quantity = stock.to_i32()?;

    Some(ImportedProduct {
        input: ProductInput {
            name,
            description: cell_text(row, "Descrição"),
            category: Some(
                cell_text(row, "Categoria").unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            ),
            buy_price: buy_price.round_dp(2),
            sell_price: sell_price.round_dp(2),
            image_url: None,
        },
        stock_quantity,
    })
}

pub fn customer_from_row(row: &Map<String, Value>) -> Option<CustomerInput> {
    Some(CustomerInput {
        name: cell_text(row, "Nome")?,
        phone: cell_text(row, "Telefone"),
        email: None,
        birth_date: cell_date(row, "Data Nascimento"),
        street: cell_text(row, "Rua"),
        number: cell_text(row, "Número"),
        neighborhood: cell_text(row, "Bairro"),
        city: cell_text(row, "Cidade"),
        state: cell_text(row, "Estado"),
        complement: cell_text(row, "Complemento"),
        notes: cell_text(row, "Observações"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn row(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("linha deve ser um objeto"),
        }
    }

    #[test]
    fn product_row_accepts_numbers_and_brazilian_strings() {
        let r = row(json!({
            "Nome": " Brinco de Ouro ",
            "Custo (R$)": "R$ 1.234,56",
            "Venda (R$)": 120,
            "Estoque": 10,
        }));
        let p = product_from_row(&r).expect("linha válida");

        assert_eq!(p.input.name, "Brinco de Ouro");
        assert_eq!(p.input.buy_price, dec!(1234.56));
        assert_eq!(p.input.sell_price, dec!(120));
        assert_eq!(p.input.category.as_deref(), Some("Outros"));
        assert_eq!(p.input.description, None);
        assert_eq!(p.stock_quantity, 10);
    }

    #[test]
    fn product_row_without_name_or_price_is_skipped() {
        assert!(product_from_row(&row(json!({ "Venda (R$)": 10 }))).is_none());
        assert!(product_from_row(&row(json!({ "Nome": "Anel" }))).is_none());
        assert!(product_from_row(&row(json!({ "Nome": "Anel", "Venda (R$)": "0,00" }))).is_none());
        assert!(product_from_row(&row(json!({ "Nome": "  ", "Venda (R$)": 10 }))).is_none());
    }

    #[test]
    fn product_row_with_negative_stock_is_skipped() {
        let r = row(json!({ "Nome": "Anel", "Venda (R$)": 10, "Estoque": -2 }));
        assert!(product_from_row(&r).is_none());
    }

    #[test]
    fn product_row_with_prices_beyond_the_column_is_skipped() {
        let at_limit = row(json!({ "Nome": "Colar", "Venda (R$)": "9.999.999.999,99" }));
        assert_eq!(
            product_from_row(&at_limit).map(|p| p.input.sell_price),
            Some(dec!(9999999999.99))
        );

        let huge_sell = row(json!({ "Nome": "Colar", "Venda (R$)": 1e13 }));
        let huge_cost = row(json!({
            "Nome": "Colar",
            "Venda (R$)": 10,
            "Custo (R$)": "99999999999999",
        }));
        assert!(product_from_row(&huge_sell).is_none());
        assert!(product_from_row(&huge_cost).is_none());
    }

    #[test]
    fn customer_row_coerces_phone_and_birth_date() {
        let r = row(json!({
            "Nome": "Maria Silva",
            "Telefone": 11999999999u64,
            "Data Nascimento": 33018,
            "Número": 123,
            "Rua": "",
        }));
        let c = customer_from_row(&r).expect("linha válida");

        assert_eq!(c.phone.as_deref(), Some("11999999999"));
        assert_eq!(c.birth_date, NaiveDate::from_ymd_opt(1990, 5, 25));
        assert_eq!(c.number.as_deref(), Some("123"));
        assert_eq!(c.street, None);
    }

    #[test]
    fn customer_birth_date_accepts_text_formats() {
        let iso = row(json!({ "Nome": "A", "Data Nascimento": "1990-05-25" }));
        let br = row(json!({ "Nome": "A", "Data Nascimento": "25/05/1990" }));
        let junk = row(json!({ "Nome": "A", "Data Nascimento": "maio" }));

        let expected = NaiveDate::from_ymd_opt(1990, 5, 25);
        assert_eq!(customer_from_row(&iso).unwrap().birth_date, expected);
        assert_eq!(customer_from_row(&br).unwrap().birth_date, expected);
        assert_eq!(customer_from_row(&junk).unwrap().birth_date, None);
    }

    #[test]
    fn template_names() {
        assert_eq!(ImportKind::Products.template_file_name(), "modelo_produtos.csv");
        assert_eq!(ImportKind::Customers.template_file_name(), "modelo_clientes.csv");
    }
}
