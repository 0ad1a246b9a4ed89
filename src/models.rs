pub mod auth;
pub mod customer;
pub mod dashboard;
pub mod import;
pub mod product;
pub mod sale;
pub mod stock;
