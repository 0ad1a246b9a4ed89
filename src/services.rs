pub mod auth;
pub mod customer_service;
pub mod dashboard_service;
pub mod export_service;
pub mod import_service;
pub mod product_service;
pub mod receipt_service;
pub mod sale_service;
pub mod stock_service;
