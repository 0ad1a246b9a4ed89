// src/config.rs

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{env, str::FromStr, sync::Arc, time::Duration};

use crate::{
    common::i18n::I18nStore,
    db::{
        CustomerRepository, DashboardRepository, ProductRepository, SaleRepository,
        StockRepository, UserRepository,
    },
    services::{
        auth::AuthService, customer_service::CustomerService,
        dashboard_service::DashboardService, export_service::ExportService,
        import_service::ImportService, product_service::ProductService,
        receipt_service::ReceiptService, sale_service::SaleService,
        stock_service::StockService,
    },
};

/// Configuração lida do ambiente (.env + variáveis).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub server_addr: String,
    pub db_max_connections: u32,
    pub jwt_expiration_days: i64,
    pub low_stock_threshold: i32,
    pub business_utc_offset_hours: i32,
    pub fonts_dir: String,
    pub cors_allowed_origin: Option<String>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL deve ser definida")?,
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET deve ser definido")?,
            server_addr: env::var("SERVER_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            db_max_connections: env_or("DATABASE_MAX_CONNECTIONS", 5)?,
            jwt_expiration_days: env_or("JWT_EXPIRATION_DAYS", 7)?,
            low_stock_threshold: env_or("LOW_STOCK_THRESHOLD", 3)?,
            business_utc_offset_hours: env_or("BUSINESS_UTC_OFFSET_HOURS", -3)?,
            fonts_dir: env::var("FONTS_DIR").unwrap_or_else(|_| "./fonts".to_string()),
            cors_allowed_origin: env::var("CORS_ALLOWED_ORIGIN").ok().filter(|v| !v.is_empty()),
        })
    }
}

fn env_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{} inválida ({}): {}", key, raw, e)),
        Err(_) => Ok(default),
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub config: Arc<Config>,
    pub i18n_store: Arc<I18nStore>,

    pub auth_service: AuthService,
    pub product_service: ProductService,
    pub stock_service: StockService,
    pub customer_service: CustomerService,
    pub sale_service: SaleService,
    pub dashboard_service: DashboardService,
    pub import_service: ImportService,
    pub export_service: ExportService,
    pub receipt_service: ReceiptService,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await
            .context("Falha ao conectar ao banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        Ok(Self::with_pool(config, db_pool))
    }

    // --- Monta o gráfico de dependências ---
    pub fn with_pool(config: Config, db_pool: PgPool) -> Self {
        let product_repo = ProductRepository::new();
        let stock_repo = StockRepository::new();
        let customer_repo = CustomerRepository::new();
        let sale_repo = SaleRepository::new();

        let auth_service = AuthService::new(
            UserRepository::new(db_pool.clone()),
            config.jwt_secret.clone(),
            config.jwt_expiration_days,
        );
        let stock_service = StockService::new(
            product_repo.clone(),
            stock_repo.clone(),
            config.low_stock_threshold,
        );
        let product_service = ProductService::new(
            product_repo.clone(),
            stock_repo.clone(),
            config.low_stock_threshold,
        );
        let customer_service = CustomerService::new(customer_repo.clone(), sale_repo.clone());
        let sale_service = SaleService::new(
            sale_repo.clone(),
            product_repo.clone(),
            customer_repo.clone(),
            stock_repo.clone(),
        );
        let dashboard_service = DashboardService::new(
            DashboardRepository::new(),
            config.low_stock_threshold,
            config.business_utc_offset_hours,
        );
        let import_service = ImportService::new(product_repo.clone(), customer_repo.clone(), stock_repo);
        let export_service = ExportService::new(product_repo, customer_repo);
        let receipt_service = ReceiptService::new(
            sale_repo,
            config.fonts_dir.clone(),
            config.business_utc_offset_hours,
        );

        Self {
            db_pool,
            config: Arc::new(config),
            i18n_store: Arc::new(I18nStore::new()),
            auth_service,
            product_service,
            stock_service,
            customer_service,
            sale_service,
            dashboard_service,
            import_service,
            export_service,
            receipt_service,
        }
    }
}

/// Estado para testes: pool preguiçoso, só conecta se alguém consultar o banco.
#[cfg(test)]
pub(crate) fn test_state() -> AppState {
    let config = Config {
        database_url: "postgres://localhost/clube_do_brilho_test".into(),
        jwt_secret: "segredo-de-teste".into(),
        server_addr: "127.0.0.1:0".into(),
        db_max_connections: 1,
        jwt_expiration_days: 7,
        low_stock_threshold: 3,
        business_utc_offset_hours: -3,
        fonts_dir: "./fonts".into(),
        cors_allowed_origin: None,
    };
    let pool = PgPoolOptions::new()
        .connect_lazy(&config.database_url)
        .expect("url válida");
    AppState::with_pool(config, pool)
}
