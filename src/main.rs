use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

mod analysis;
mod auth;
mod config;
mod db;
mod dto;
mod error;
mod handlers;
mod models;
mod month;
mod oracle;
mod services;
mod strategy;

use config::Config;
use services::store::{DreamStore, PgDreamStore};
use strategy::ClassificationStrategy;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<Config>,
    pub strategy: ClassificationStrategy,
    pub store: Arc<dyn DreamStore>,
}

fn cors_layer(config: &Config) -> CorsLayer {
    let allowed_origins: Vec<axum::http::HeaderValue> = {
        let mut origins: Vec<axum::http::HeaderValue> = config
            .frontend_url
            .parse::<axum::http::HeaderValue>()
            .into_iter()
            .collect();
        // In dev, also allow LAN access (e.g. testing from another device)
        if let Ok(extra) = std::env::var("CORS_EXTRA_ORIGINS") {
            for o in extra.split(',') {
                if let Ok(hv) = o.trim().parse::<axum::http::HeaderValue>() {
                    origins.push(hv);
                }
            }
        }
        origins
    };
    CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
            axum::http::header::ACCEPT,
        ])
        .allow_credentials(true)
}

pub fn build_router(state: AppState) -> Router {
    let cron_routes = Router::new()
        .route(
            "/api/cron/monthly-report",
            post(handlers::cron::run_monthly_reports),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::middleware::require_cron_secret,
        ));

    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/readyz", get(handlers::health::readyz))
        .route("/api/archetypes", get(handlers::archetypes::list_archetypes))
        .route("/api/cron/monthly-report", get(handlers::cron::cron_status))
        .merge(cron_routes);

    let protected_routes = Router::new()
        // Dreams
        .route("/api/dreams", post(handlers::dreams::create_dream))
        .route("/api/dreams", get(handlers::dreams::list_dreams))
        .route("/api/dreams/:id", get(handlers::dreams::get_dream))
        // Reports
        .route(
            "/api/reports/monthly",
            get(handlers::reports::get_monthly_report),
        )
        .route(
            "/api/reports/monthly",
            post(handlers::reports::regenerate_monthly_report),
        )
        .route("/api/reports/evolution", get(handlers::reports::get_evolution))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::middleware::require_auth,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(cors_layer(&state.config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dreamarc_api=debug,tower_http=debug".into()),
        )
        .json()
        .init();

    let config = Arc::new(Config::from_env());

    // Database
    let db = db::create_pool(&config).await;

    // Run migrations
    sqlx::migrate!("./migrations")
        .run(&db)
        .await
        .expect("Failed to run database migrations");

    tracing::info!("Database migrations applied");

    let strategy = ClassificationStrategy::from_config(&config);
    let store: Arc<dyn DreamStore> = Arc::new(PgDreamStore::new(db.clone()));

    let state = AppState {
        db,
        config: config.clone(),
        strategy: strategy.clone(),
        store: store.clone(),
    };

    if config.report_worker_enabled {
        services::worker::spawn_monthly_report_worker(
            store,
            strategy,
            config.report_worker_interval_secs,
            config.batch_concurrency,
        );
        tracing::info!(
            interval_secs = config.report_worker_interval_secs,
            "Monthly report worker started"
        );
    }

    let app = build_router(state);

    let addr = config.listen_addr();
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind listen address");
    axum::serve(listener, app)
        .await
        .expect("Server error");
}
