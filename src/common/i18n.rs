// src/common/i18n.rs

use std::collections::HashMap;

pub const DEFAULT_LANG: &str = "pt";

// (código, português, inglês)
const MESSAGES: &[(&str, &str, &str)] = &[
    ("validation_failed", "Um ou mais campos são inválidos.", "One or more fields are invalid."),
    ("email_already_exists", "Este e-mail já está em uso.", "This e-mail is already in use."),
    ("invalid_credentials", "E-mail ou senha inválidos.", "Invalid e-mail or password."),
    ("invalid_token", "Token de autenticação inválido ou ausente.", "Missing or invalid authentication token."),
    ("user_not_found", "Usuário não encontrado.", "User not found."),
    ("product_not_found", "Produto não encontrado.", "Product not found."),
    ("customer_not_found", "Cliente não encontrado.", "Customer not found."),
    ("sale_not_found", "Venda não encontrada.", "Sale not found."),
    ("insufficient_stock", "Estoque insuficiente.", "Insufficient stock."),
    ("invalid_quantity", "A quantidade deve ser maior que zero.", "Quantity must be greater than zero."),
    ("empty_cart", "Selecione um cliente e adicione produtos.", "Select a customer and add products."),
    ("sale_already_cancelled", "Esta venda já foi cancelada.", "This sale has already been cancelled."),
    ("product_in_use", "O produto possui vendas registradas e não pode ser excluído.", "The product has recorded sales and cannot be deleted."),
    ("customer_has_sales", "O cliente possui vendas registradas e não pode ser excluído.", "The customer has recorded sales and cannot be deleted."),
    ("empty_import", "Nenhuma linha válida encontrada. Verifique as colunas.", "No valid rows found. Check the columns."),
    ("font_not_found", "Fonte do comprovante não encontrada no servidor.", "Receipt font not found on the server."),
    ("internal_error", "Ocorreu um erro inesperado.", "An unexpected error occurred."),
];

/// Catálogo de mensagens por idioma. Montado uma vez no AppState.
#[derive(Debug, Clone)]
pub struct I18nStore {
    messages: HashMap<&'static str, HashMap<&'static str, &'static str>>,
}

impl I18nStore {
    pub fn new() -> Self {
        let mut pt = HashMap::new();
        let mut en = HashMap::new();
        for (code, pt_msg, en_msg) in MESSAGES {
            pt.insert(*code, *pt_msg);
            en.insert(*code, *en_msg);
        }

        let mut messages = HashMap::new();
        messages.insert("pt", pt);
        messages.insert("en", en);
        Self { messages }
    }

    // Idioma desconhecido cai no padrão; código desconhecido volta como está.
    pub fn translate(&self, lang: &str, code: &str) -> String {
        let table = self
            .messages
            .get(lang)
            .or_else(|| self.messages.get(DEFAULT_LANG));

        table
            .and_then(|t| t.get(code))
            .map(|m| m.to_string())
            .unwrap_or_else(|| code.to_string())
    }
}

impl Default for I18nStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translates_known_codes() {
        let store = I18nStore::new();
        assert_eq!(store.translate("pt", "empty_cart"), "Selecione um cliente e adicione produtos.");
        assert_eq!(store.translate("en", "sale_not_found"), "Sale not found.");
    }

    #[test]
    fn unknown_language_falls_back_to_portuguese() {
        let store = I18nStore::new();
        assert_eq!(store.translate("de", "product_not_found"), "Produto não encontrado.");
    }

    #[test]
    fn unknown_code_is_returned_verbatim() {
        assert_eq!(I18nStore::new().translate("pt", "whatever"), "whatever");
    }

    #[test]
    fn every_code_has_both_languages() {
        let store = I18nStore::new();
        for (code, _, _) in MESSAGES {
            assert_ne!(store.translate("pt", code), *code);
            assert_ne!(store.translate("en", code), *code);
        }
    }
}
