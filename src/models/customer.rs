// src/models/customer.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: Uuid,
    #[schema(ignore)]
    pub user_id: Uuid,

    #[schema(example = "Maria Silva")]
    pub name: String,
    #[schema(example = "(11) 99999-9999")]
    pub phone: Option<String>,
    pub email: Option<String>,
    pub birth_date: Option<NaiveDate>,

    // Endereço
    pub street: Option<String>,
    pub number: Option<String>,
    pub neighborhood: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub complement: Option<String>,

    #[schema(example = "Cliente VIP")]
    pub notes: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Cadastro já normalizado (strings em branco viram None)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CustomerInput {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub street: Option<String>,
    pub number: Option<String>,
    pub neighborhood: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub complement: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CustomerFilter {
    /// Nome, e-mail ou telefone
    pub search: Option<String>,
}

impl CustomerFilter {
    pub fn matches(&self, customer: &Customer) -> bool {
        let Some(raw) = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) else {
            return true;
        };
        let term = raw.to_lowercase();

        customer.name.to_lowercase().contains(&term)
            || customer
                .email
                .as_deref()
                .is_some_and(|e| e.to_lowercase().contains(&term))
            || customer.phone.as_deref().is_some_and(|p| p.contains(raw))
    }
}

#[cfg(test)]
pub(crate) fn sample_customer(name: &str, email: Option<&str>, phone: Option<&str>) -> Customer {
    Customer {
        id: Uuid::new_v4(),
        user_id: Uuid::nil(),
        name: name.to_string(),
        phone: phone.map(str::to_string),
        email: email.map(str::to_string),
        birth_date: None,
        street: None,
        number: None,
        neighborhood: None,
        city: None,
        state: None,
        complement: None,
        notes: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn search(term: &str) -> CustomerFilter {
        CustomerFilter { search: Some(term.to_string()) }
    }

    #[test]
    fn matches_name_and_email_ignoring_case() {
        let c = sample_customer("Maria Silva", Some("Maria@Email.com"), None);
        assert!(search("silva").matches(&c));
        assert!(search("maria@email").matches(&c));
        assert!(!search("joana").matches(&c));
    }

    #[test]
    fn matches_phone_as_raw_substring() {
        let c = sample_customer("Joana", None, Some("(11) 99999-1234"));
        assert!(search("99999-1234").matches(&c));
        assert!(!search("11999991234").matches(&c));
    }

    #[test]
    fn empty_search_matches_everyone() {
        let c = sample_customer("Joana", None, None);
        assert!(CustomerFilter::default().matches(&c));
        assert!(search("  ").matches(&c));
    }
}
