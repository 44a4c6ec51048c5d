use std::path::Path;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, Method},
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};
use tracing::info;

mod auth;
mod config;
mod db;
mod error;
mod handlers;
mod models;
mod upload;


use crate::config::Config;

/// Shared application state. The pool is the only shared resource and is cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::SqlitePool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present (ignored in production where env vars are injected)
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,inventory_billing_service=debug")),
        )
        .with_target(false)
        .compact()
        .init();

    let config = Config::from_env()?;

    info!("Opening database {}...", config.database_url);
    let pool = db::connect(&config).await?;

    info!("Running migrations...");
    db::run_migrations(&pool).await?;

    let app = build_router(AppState { db: pool }, &config);

    let addr = format!("{}:{}", config.host, config.port);
    info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn build_router(state: AppState, config: &Config) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    let body_limit = match config.upload_limit_bytes {
        Some(limit) => DefaultBodyLimit::max(limit),
        None => DefaultBodyLimit::disable(),
    };

    let index = Path::new(&config.static_dir).join("index.html");

    Router::new()
        // ── Front page & health ─────────────────────────────────────────────
        .route_service("/", ServeFile::new(index))
        .route("/health", get(handlers::health))

        // ── Products ────────────────────────────────────────────────────────
        .route("/products", get(handlers::products::list_products))
        .route("/getInventory", get(handlers::products::get_inventory))
        .route("/product/:id", get(handlers::products::get_product))
        .route("/image/:id", get(handlers::products::get_image))
        .route("/addProduct", post(handlers::products::create_product))
        .route("/updateProduct/:id", put(handlers::products::update_product))
        .route("/deleteProduct/:id", delete(handlers::products::delete_product))

        // ── Users ───────────────────────────────────────────────────────────
        .route("/register", post(handlers::users::register))
        .route("/login", post(handlers::users::login))

        // ── Bills ───────────────────────────────────────────────────────────
        .route("/getBills", get(handlers::bills::list_bills))

        // ── Static assets ───────────────────────────────────────────────────
        .fallback_service(ServeDir::new(&config.static_dir))

        // ── Middleware ──────────────────────────────────────────────────────
        .layer(body_limit)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
