// src/services/export_service.rs

use rust_decimal::Decimal;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        format::{format_date_br, format_decimal_br},
    },
    db::{CustomerRepository, ProductRepository},
    models::{
        customer::Customer,
        import::{ImportKind, CUSTOMER_HEADERS, PRODUCT_HEADERS},
        product::Product,
    },
};

/// Planilhas pt-BR usam vírgula como separador decimal, então o CSV usa `;`.
pub const CSV_DELIMITER: char = ';';

// BOM para o Excel reconhecer o UTF-8 (acentos nos cabeçalhos)
const UTF8_BOM: &str = "\u{feff}";

/// Arquivo pronto para download
#[derive(Debug, Clone, PartialEq)]
pub struct CsvFile {
    pub file_name: &'static str,
    pub content: String,
}

pub fn escape_field(value: &str, delimiter: char) -> String {
    if value.contains(delimiter) || value.contains('"') || value.contains('\n') || value.contains('\r')
    {
        let escaped = value.replace('"', "\"\"");
        format!("\"{escaped}\"")
    } else {
        value.to_string()
    }
}

pub fn build_csv(headers: &[&str], rows: &[Vec<String>]) -> String {
    let separator = CSV_DELIMITER.to_string();
    let mut out = String::from(UTF8_BOM);

    let header_line: Vec<String> = headers.iter().map(|h| escape_field(h, CSV_DELIMITER)).collect();
    out.push_str(&header_line.join(&separator));
    out.push_str("\r\n");

    for row in rows {
        let line: Vec<String> = row.iter().map(|v| escape_field(v, CSV_DELIMITER)).collect();
        out.push_str(&line.join(&separator));
        out.push_str("\r\n");
    }
    out
}

fn opt(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

fn product_row(p: &Product) -> Vec<String> {
    vec![
        p.name.clone(),
        opt(&p.category),
        format_decimal_br(p.buy_price),
        format_decimal_br(p.sell_price),
        p.stock_quantity.to_string(),
        opt(&p.description),
    ]
}

fn customer_row(c: &Customer) -> Vec<String> {
    vec![
        c.name.clone(),
        opt(&c.phone),
        c.birth_date.map(format_date_br).unwrap_or_default(),
        opt(&c.street),
        opt(&c.number),
        opt(&c.neighborhood),
        opt(&c.city),
        opt(&c.state),
        opt(&c.complement),
        opt(&c.notes),
    ]
}

/// Modelo com os cabeçalhos e uma linha de exemplo.
pub fn template(kind: ImportKind) -> CsvFile {
    let content = match kind {
        ImportKind::Products => build_csv(
            &PRODUCT_HEADERS,
            &[vec![
                "Brinco de Ouro Exemplo".into(),
                "Brincos".into(),
                format_decimal_br(Decimal::new(5000, 2)),
                format_decimal_br(Decimal::new(12000, 2)),
                "10".into(),
                "Brinco pequeno folheado".into(),
            ]],
        ),
        ImportKind::Customers => build_csv(
            &CUSTOMER_HEADERS,
            &[vec![
                "Maria Silva".into(),
                "(11) 99999-9999".into(),
                "1990-05-25".into(),
                "Rua das Flores".into(),
                "123".into(),
                "Centro".into(),
                "São Paulo".into(),
                "SP".into(),
                "Apto 10".into(),
                "Cliente VIP".into(),
            ]],
        ),
    };
    CsvFile { file_name: kind.template_file_name(), content }
}

#[derive(Clone)]
pub struct ExportService {
    product_repo: ProductRepository,
    customer_repo: CustomerRepository,
}

impl ExportService {
    pub fn new(product_repo: ProductRepository, customer_repo: CustomerRepository) -> Self {
        Self { product_repo, customer_repo }
    }

    pub async fn export<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        kind: ImportKind,
    ) -> Result<CsvFile, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let content = match kind {
            ImportKind::Products => {
                let products = self.product_repo.list(executor, user_id).await?;
                let rows: Vec<Vec<String>> = products.iter().map(product_row).collect();
                build_csv(&PRODUCT_HEADERS, &rows)
            }
            ImportKind::Customers => {
                let customers = self.customer_repo.list(executor, user_id).await?;
                let rows: Vec<Vec<String>> = customers.iter().map(customer_row).collect();
                build_csv(&CUSTOMER_HEADERS, &rows)
            }
        };

        Ok(CsvFile { file_name: kind.export_file_name(), content })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{customer::sample_customer, product::sample_product};
    use chrono::NaiveDate;

    fn lines(csv: &str) -> Vec<&str> {
        csv.trim_start_matches(UTF8_BOM).lines().collect()
    }

    #[test]
    fn escapes_delimiter_quotes_and_newlines() {
        assert_eq!(escape_field("Anel", ';'), "Anel");
        assert_eq!(escape_field("Anel; ouro", ';'), "\"Anel; ouro\"");
        assert_eq!(escape_field("Anel \"18k\"", ';'), "\"Anel \"\"18k\"\"\"");
        assert_eq!(escape_field("linha 1\nlinha 2", ';'), "\"linha 1\nlinha 2\"");
        // Vírgula não precisa de aspas com `;`
        assert_eq!(escape_field("12,50", ';'), "12,50");
    }

    #[test]
    fn product_template_has_headers_and_example_row() {
        let file = template(ImportKind::Products);
        let rows = lines(&file.content);

        assert_eq!(file.file_name, "modelo_produtos.csv");
        assert!(file.content.starts_with(UTF8_BOM));
        assert_eq!(rows[0], "Nome;Categoria;Custo (R$);Venda (R$);Estoque;Descrição");
        assert_eq!(rows[1], "Brinco de Ouro Exemplo;Brincos;50,00;120,00;10;Brinco pequeno folheado");
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn customer_template_lists_every_header() {
        let file = template(ImportKind::Customers);
        let header = lines(&file.content)[0];

        assert_eq!(file.file_name, "modelo_clientes.csv");
        assert_eq!(header.split(';').count(), CUSTOMER_HEADERS.len());
        assert!(header.contains("Data Nascimento"));
    }

    #[test]
    fn product_rows_use_comma_decimals() {
        let mut p = sample_product("Colar; Pérola", Some("Colares"), 4);
        p.description = Some("Banhado".into());

        assert_eq!(
            product_row(&p),
            vec!["Colar; Pérola", "Colares", "50,00", "120,00", "4", "Banhado"]
        );
        let csv = build_csv(&PRODUCT_HEADERS, &[product_row(&p)]);
        assert_eq!(lines(&csv)[1], "\"Colar; Pérola\";Colares;50,00;120,00;4;Banhado");
    }

    #[test]
    fn customer_rows_format_birth_date() {
        let mut c = sample_customer("Maria", None, Some("(11) 99999-9999"));
        c.birth_date = NaiveDate::from_ymd_opt(1990, 5, 25);

        let row = customer_row(&c);
        assert_eq!(row[1], "(11) 99999-9999");
        assert_eq!(row[2], "25/05/1990");
        assert_eq!(row.len(), CUSTOMER_HEADERS.len());
    }
}
