// src/common/format.rs
//
// Formatação e leitura no padrão brasileiro (moeda, datas, números de planilha).

use chrono::{Duration, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

/// `1234.5` -> `R$ 1.234,50`
pub fn format_brl(value: Decimal) -> String {
    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let formatted = format!("{:.2}", rounded.abs());

    let (int_part, frac_part) = formatted.split_once('.').unwrap_or((&formatted, "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    if negative {
        format!("-R$ {},{}", grouped, frac_part)
    } else {
        format!("R$ {},{}", grouped, frac_part)
    }
}

/// Decimal com vírgula, sem símbolo. Usado nas planilhas exportadas.
pub fn format_decimal_br(value: Decimal) -> String {
    format!("{:.2}", value.round_dp(2)).replace('.', ",")
}

pub fn format_date_br(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Lê números vindos de planilha: `50`, `50.5`, `"50,50"`, `"R$ 1.234,56"`.
pub fn parse_decimal_br(raw: &str) -> Option<Decimal> {
    let cleaned: String = raw
        .trim()
        .trim_start_matches("R$")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();

    if cleaned.is_empty() {
        return None;
    }

    // Com vírgula, ou no formato "1.234.567": ponto é separador de milhar.
    // Fora isso ("50.5"), ponto é decimal.
    let normalized = if cleaned.contains(',') {
        cleaned.replace('.', "").replace(',', ".")
    } else if is_thousands_grouped(&cleaned) {
        cleaned.replace('.', "")
    } else {
        cleaned
    };

    Decimal::from_str(&normalized).ok()
}

// `^-?\d{1,3}(\.\d{3})+$`
fn is_thousands_grouped(raw: &str) -> bool {
    let digits = raw.strip_prefix('-').unwrap_or(raw);
    let mut groups = digits.split('.');

    let head_ok = groups
        .next()
        .is_some_and(|g| (1..=3).contains(&g.len()) && g.chars().all(|c| c.is_ascii_digit()));
    let mut tail = groups.peekable();
    let has_tail = tail.peek().is_some();

    head_ok && has_tail && tail.all(|g| g.len() == 3 && g.chars().all(|c| c.is_ascii_digit()))
}

/// Aceita `AAAA-MM-DD`, `DD/MM/AAAA` ou o número serial de data do Excel.
pub fn parse_date_flexible(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%d/%m/%Y"))
        .ok()
        .or_else(|| raw.parse::<f64>().ok().and_then(date_from_spreadsheet_serial))
}

pub fn date_from_spreadsheet_serial(serial: f64) -> Option<NaiveDate> {
    if !(1.0..=2_958_465.0).contains(&serial) {
        return None;
    }
    // Época do Excel (já considera o falso 29/02/1900).
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_signed(Duration::days(serial.trunc() as i64))
}

/// Campo de formulário: aparado, e vazio vira `None`.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn formats_currency_with_thousand_separators() {
        assert_eq!(format_brl(dec!(1234.5)), "R$ 1.234,50");
        assert_eq!(format_brl(dec!(1234567.891)), "R$ 1.234.567,89");
        assert_eq!(format_brl(dec!(0)), "R$ 0,00");
        assert_eq!(format_brl(dec!(999)), "R$ 999,00");
    }

    #[test]
    fn formats_negative_currency() {
        assert_eq!(format_brl(dec!(-15.005)), "-R$ 15,01");
        assert_eq!(format_brl(dec!(-0.001)), "R$ 0,00");
    }

    #[test]
    fn formats_decimal_for_spreadsheets() {
        assert_eq!(format_decimal_br(dec!(50)), "50,00");
        assert_eq!(format_decimal_br(dec!(120.5)), "120,50");
    }

    #[test]
    fn formats_dates_day_first() {
        let d = NaiveDate::from_ymd_opt(1990, 5, 25).unwrap();
        assert_eq!(format_date_br(d), "25/05/1990");
    }

    #[test]
    fn parses_spreadsheet_numbers() {
        assert_eq!(parse_decimal_br("50"), Some(dec!(50)));
        assert_eq!(parse_decimal_br("50.5"), Some(dec!(50.5)));
        assert_eq!(parse_decimal_br("50,50"), Some(dec!(50.50)));
        assert_eq!(parse_decimal_br("R$ 1.234,56"), Some(dec!(1234.56)));
        assert_eq!(parse_decimal_br("  "), None);
        assert_eq!(parse_decimal_br("abc"), None);
    }

    #[test]
    fn dot_grouped_thousands_are_integers() {
        assert_eq!(parse_decimal_br("1.500"), Some(dec!(1500)));
        assert_eq!(parse_decimal_br("1.234.567"), Some(dec!(1234567)));
        assert_eq!(parse_decimal_br("-2.000"), Some(dec!(-2000)));
        // Sem grupos de três dígitos o ponto continua decimal
        assert_eq!(parse_decimal_br("1.5"), Some(dec!(1.5)));
        assert_eq!(parse_decimal_br("12.34"), Some(dec!(12.34)));
        assert_eq!(parse_decimal_br("1234.567"), Some(dec!(1234.567)));
    }

    #[test]
    fn currency_survives_format_then_parse() {
        let value = dec!(98765.43);
        assert_eq!(parse_decimal_br(&format_brl(value)), Some(value));
    }

    #[test]
    fn parses_dates_in_accepted_shapes() {
        let expected = NaiveDate::from_ymd_opt(1990, 5, 25);
        assert_eq!(parse_date_flexible("1990-05-25"), expected);
        assert_eq!(parse_date_flexible("25/05/1990"), expected);
        assert_eq!(parse_date_flexible("33018"), expected);
        assert_eq!(parse_date_flexible("ontem"), None);
        assert_eq!(parse_date_flexible(""), None);
    }

    #[test]
    fn rejects_out_of_range_serials() {
        assert_eq!(date_from_spreadsheet_serial(0.0), None);
        assert_eq!(date_from_spreadsheet_serial(-3.0), None);
    }

    #[test]
    fn blank_form_fields_become_none() {
        assert_eq!(non_blank(Some("  Centro ".into())), Some("Centro".to_string()));
        assert_eq!(non_blank(Some("   ".into())), None);
        assert_eq!(non_blank(None), None);
    }
}
