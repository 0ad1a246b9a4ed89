// src/docs.rs

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::OpenApi;

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    info(title = "Clube do Brilho API", description = "Estoque, clientes e vendas"),
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,

        // --- Users ---
        handlers::auth::get_me,

        // --- Products ---
        handlers::products::list_products,
        handlers::products::list_categories,
        handlers::products::get_product,
        handlers::products::create_product,
        handlers::products::update_product,
        handlers::products::delete_product,

        // --- Stock ---
        handlers::stock::register_movement,
        handlers::stock::list_movements,

        // --- Customers ---
        handlers::customers::list_customers,
        handlers::customers::get_customer,
        handlers::customers::create_customer,
        handlers::customers::update_customer,
        handlers::customers::delete_customer,
        handlers::customers::customer_sales,

        // --- Sales ---
        handlers::sales::create_sale,
        handlers::sales::list_sales,
        handlers::sales::get_sale,
        handlers::sales::cancel_sale,
        handlers::sales::sale_receipt,

        // --- Dashboard ---
        handlers::dashboard::get_summary,

        // --- Import / Export ---
        handlers::import::import_products,
        handlers::import::import_customers,
        handlers::import::download_template,
        handlers::import::export_products,
        handlers::import::export_customers,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::User,
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,

            // --- Products / Stock ---
            models::product::Product,
            models::product::ProductView,
            models::stock::MovementType,
            models::stock::StockMovement,
            models::stock::MovementResult,
            handlers::products::ProductPayload,
            handlers::stock::MovementPayload,

            // --- Customers ---
            models::customer::Customer,
            handlers::customers::CustomerPayload,

            // --- Sales ---
            models::sale::SaleStatus,
            models::sale::Sale,
            models::sale::SaleItem,
            models::sale::SaleItemDetail,
            models::sale::SaleSummary,
            models::sale::SaleDetail,
            models::sale::CartLine,
            handlers::sales::CreateSalePayload,
            handlers::sales::CancelSalePayload,

            // --- Dashboard ---
            models::dashboard::DashboardSummary,
            models::dashboard::LowStockProduct,
            models::dashboard::TopCustomer,
            models::dashboard::BestSeller,

            // --- Import ---
            models::import::ImportKind,
            models::import::ImportPayload,
            models::import::ImportResult,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticação e Registro"),
        (name = "Users", description = "Dados do Usuário"),
        (name = "Products", description = "Cadastro de Produtos"),
        (name = "Stock", description = "Movimentações de Estoque"),
        (name = "Customers", description = "Cadastro de Clientes"),
        (name = "Sales", description = "Vendas, Cancelamentos e Recibos"),
        (name = "Dashboard", description = "Indicadores Gerenciais"),
        (name = "Import", description = "Importação e Exportação de Planilhas")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_route_is_documented() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;

        for path in [
            "/api/products",
            "/api/products/{id}/movements",
            "/api/sales/{id}/cancel",
            "/api/sales/{id}/receipt",
            "/api/dashboard/summary",
            "/api/import/templates/{kind}",
            "/api/export/customers",
        ] {
            assert!(paths.contains_key(path), "rota sem documentação: {path}");
        }
    }

    #[test]
    fn bearer_scheme_is_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("api_jwt"));
    }
}
