mod config;
mod db;
mod error;
mod notify;
mod response;
mod routes;
mod state;
mod storage;
mod workflow;

use axum::extract::DefaultBodyLimit;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ponencia=info,tower_http=info".into()),
        )
        .init();

    let config = config::Config::from_env()?;
    let config = Arc::new(config);

    storage::ensure_dirs(&config.upload_folder, &config.full_paper_folder)?;

    let pool = db::create_pool(&config.database_url).await?;
    db::run_migrations(pool.as_ref()).await?;

    let state = Arc::new(state::AppState {
        pool: pool.clone(),
        config: config.clone(),
        engine: workflow::engine::WorkflowEngine::new(pool.clone()),
        notifier: notify::Notifier::new(pool),
    });

    let app = Router::new()
        .route("/", get(routes::health))
        .route("/abstracts/submit-abstract", post(routes::abstracts::submit_abstract))
        .route("/abstracts/conference/{conference_id}", get(routes::abstracts::list_for_conference))
        .route("/abstracts/author/accepted", get(routes::abstracts::accepted_for_author))
        .route("/abstracts/author/{author_id}", get(routes::abstracts::list_for_author))
        .route("/abstracts/editor/assigned", get(routes::abstracts::assigned_to_editor))
        .route("/abstracts/{abstract_id}/assign-editor", post(routes::abstracts::assign_editor))
        .route(
            "/abstracts/{abstract_id}/assign-conference-editor",
            post(routes::abstracts::assign_conference_editor),
        )
        .route("/abstracts/{abstract_id}/review", post(routes::abstracts::review))
        .route("/abstracts/{abstract_id}/admin-decision", post(routes::abstracts::admin_decision))
        .route("/abstracts/{abstract_id}/full-paper", post(routes::abstracts::upload_full_paper))
        .layer(DefaultBodyLimit::max(25 * 1024 * 1024))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = format!("{}:{}", config.host, config.port);
    tracing::info!("Ponencia listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
