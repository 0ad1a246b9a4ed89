// src/services/receipt_service.rs

use chrono::{DateTime, FixedOffset, Utc};
use genpdf::{elements, style, Alignment, Element};
use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        format::{format_brl, format_date_br},
    },
    db::SaleRepository,
    models::sale::{SaleDetail, SaleStatus},
    services::dashboard_service::business_offset,
};

const STORE_NAME: &str = "CLUBE DO BRILHO";
const FONT_FAMILY: &str = "Roboto";

#[derive(Clone)]
pub struct ReceiptService {
    sale_repo: SaleRepository,
    fonts_dir: String,
    business_utc_offset_hours: i32,
}

/// Data da venda como o cliente a viu (fuso do negócio), em `dd/mm/aaaa`.
pub fn receipt_date(created_at: DateTime<Utc>, offset: FixedOffset) -> String {
    format_date_br(created_at.with_timezone(&offset).date_naive())
}

impl ReceiptService {
    pub fn new(sale_repo: SaleRepository, fonts_dir: String, business_utc_offset_hours: i32) -> Self {
        Self { sale_repo, fonts_dir, business_utc_offset_hours }
    }

    pub fn file_name(sale_id: Uuid) -> String {
        format!("recibo_{}.pdf", sale_id)
    }

    pub async fn generate_receipt<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        sale_id: Uuid,
    ) -> Result<Vec<u8>, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        // 1. Busca os dados
        let mut tx = executor.begin().await?;

        let sale = self
            .sale_repo
            .find_by_id(&mut *tx, user_id, sale_id)
            .await?
            .ok_or(AppError::SaleNotFound)?;
        let customer_name = self.sale_repo.customer_name(&mut *tx, sale.customer_id).await?;
        let items = self.sale_repo.list_items(&mut *tx, sale_id).await?;

        tx.commit().await?;

        // 2. Renderiza fora da conexão. Fontes + layout são I/O e CPU: thread separado
        let offset = business_offset(self.business_utc_offset_hours)?;
        let fonts_dir = self.fonts_dir.clone();
        let detail = SaleDetail { sale, customer_name, items };

        tokio::task::spawn_blocking(move || render(&fonts_dir, offset, &detail))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de geração do recibo: {}", e))?
    }
}

fn render(fonts_dir: &str, offset: FixedOffset, detail: &SaleDetail) -> Result<Vec<u8>, AppError> {
    let font_family = genpdf::fonts::from_files(fonts_dir, FONT_FAMILY, None)
        .map_err(|_| AppError::FontNotFound(fonts_dir.to_string()))?;

    let mut doc = genpdf::Document::new(font_family);
    doc.set_title(format!("Recibo {}", detail.sale.id));
    let mut decorator = genpdf::SimplePageDecorator::new();
    decorator.set_margins(10);
    doc.set_page_decorator(decorator);

    // --- CABEÇALHO ---
    doc.push(
        elements::Paragraph::new(STORE_NAME)
            .styled(style::Style::new().bold().with_font_size(18)),
    );
    doc.push(elements::Break::new(1.5));

    doc.push(
        elements::Paragraph::new("RECIBO DE VENDA")
            .styled(style::Style::new().bold().with_font_size(14)),
    );
    doc.push(elements::Paragraph::new(format!(
        "Data: {}",
        receipt_date(detail.sale.created_at, offset)
    )));
    doc.push(elements::Paragraph::new(format!("Cliente: {}", detail.customer_name)));

    if detail.sale.status == SaleStatus::Cancelled {
        doc.push(elements::Break::new(1));
        let motivo = detail.sale.cancellation_reason.as_deref().unwrap_or("-");
        doc.push(
            elements::Paragraph::new(format!("VENDA CANCELADA - Motivo: {}", motivo))
                .styled(style::Style::new().bold().with_color(style::Color::Rgb(200, 0, 0))),
        );
    }

    doc.push(elements::Break::new(2));

    // --- TABELA DE ITENS ---
    // Pesos das colunas: Produto (4), Qtd (1), Unitário (2), Total (2)
    let mut table = elements::TableLayout::new(vec![4, 1, 2, 2]);
    table.set_cell_decorator(elements::FrameCellDecorator::new(true, true, false));

    let style_bold = style::Style::new().bold();
    table
        .row()
        .element(elements::Paragraph::new("Produto").styled(style_bold))
        .element(elements::Paragraph::new("Qtd").styled(style_bold))
        .element(elements::Paragraph::new("Unitário").styled(style_bold))
        .element(elements::Paragraph::new("Total").styled(style_bold))
        .push()
        .map_err(|e| AppError::DocumentError(e.to_string()))?;

    for item in &detail.items {
        table
            .row()
            .element(elements::Paragraph::new(item.product_name.as_str()))
            .element(elements::Paragraph::new(item.quantity.to_string()))
            .element(elements::Paragraph::new(format_brl(item.unit_price)))
            .element(elements::Paragraph::new(format_brl(item.subtotal())))
            .push()
            .map_err(|e| AppError::DocumentError(e.to_string()))?;
    }

    doc.push(table);
    doc.push(elements::Break::new(2));

    // --- TOTAL ---
    let mut total_paragraph = elements::Paragraph::new(format!(
        "TOTAL: {}",
        format_brl(detail.sale.total_amount)
    ));
    total_paragraph.set_alignment(Alignment::Right);
    doc.push(total_paragraph.styled(style::Style::new().bold().with_font_size(12)));

    // 3. Renderiza para buffer
    let mut buffer = Vec::new();
    doc.render(&mut buffer)
        .map_err(|e| AppError::DocumentError(e.to_string()))?;

    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn receipt_file_name_uses_sale_id() {
        let id = Uuid::nil();
        assert_eq!(
            ReceiptService::file_name(id),
            "recibo_00000000-0000-0000-0000-000000000000.pdf"
        );
    }

    #[test]
    fn receipt_date_uses_business_timezone() {
        use chrono::TimeZone;

        // 01/05 01:30 UTC = 30/04 22:30 em Brasília
        let created_at = Utc.with_ymd_and_hms(2024, 5, 1, 1, 30, 0).unwrap();

        assert_eq!(receipt_date(created_at, business_offset(-3).unwrap()), "30/04/2024");
        assert_eq!(receipt_date(created_at, business_offset(0).unwrap()), "01/05/2024");
    }

    #[test]
    fn missing_fonts_are_reported() {
        use crate::models::sale::Sale;
        use rust_decimal::Decimal;

        let detail = SaleDetail {
            sale: Sale {
                id: Uuid::new_v4(),
                user_id: Uuid::nil(),
                customer_id: Uuid::new_v4(),
                total_amount: Decimal::ZERO,
                status: SaleStatus::Completed,
                cancellation_reason: None,
                cancelled_at: None,
                created_at: Utc::now(),
            },
            customer_name: "Maria".into(),
            items: vec![],
        };
        let offset = business_offset(-3).unwrap();

        assert!(matches!(
            render("/caminho/inexistente", offset, &detail),
            Err(AppError::FontNotFound(_))
        ));
    }
}
