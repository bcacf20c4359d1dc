use std::sync::Arc;

use anyhow::Context;
use axum::{http::HeaderName, routing::get, Router};
use budgetbook_core::{
    budget_items::{BudgetItemRepository, BudgetItemService, BudgetItemServiceTrait},
    budgets::{BudgetRepository, BudgetService, BudgetServiceTrait},
    db::{self, DbPool},
    loans::{LoanRepository, LoanService, LoanServiceTrait},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{api, config::Config};

pub struct AppState {
    pub budget_service: Arc<dyn BudgetServiceTrait>,
    pub item_service: Arc<dyn BudgetItemServiceTrait>,
    pub loan_service: Arc<dyn LoanServiceTrait>,
    pub user_header: HeaderName,
}

pub fn build_state(pool: Arc<DbPool>, user_header: HeaderName) -> Arc<AppState> {
    let budget_repo = Arc::new(BudgetRepository::new(pool.clone()));
    let item_repo = Arc::new(BudgetItemRepository::new(pool.clone()));
    let loan_repo = Arc::new(LoanRepository::new(pool));

    Arc::new(AppState {
        budget_service: Arc::new(BudgetService::new(budget_repo)),
        item_service: Arc::new(BudgetItemService::new(item_repo)),
        loan_service: Arc::new(LoanService::new(loan_repo)),
        user_header,
    })
}

async fn health() -> &'static str {
    "ok"
}

pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(api::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn run(config: Config) -> anyhow::Result<()> {
    let pool = db::init(&config.database_url, config.db_pool_size)
        .with_context(|| format!("Failed to open database at {}", config.database_url))?;
    let state = build_state(Arc::new(pool), config.user_id_header.clone());

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
    }
}
