pub mod auth;
pub mod customers;
pub mod dashboard;
pub mod import;
pub mod products;
pub mod sales;
pub mod stock;
