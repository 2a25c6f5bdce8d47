//! 推論APIプロキシサーバー
//!
//! ブラウザやCLIから受けた要求を分類API・計数APIへ中継する。

mod error;
mod handlers;
pub mod upstream;

pub use error::{ProxyError, ProxyResult};
pub use handlers::AppState;
pub use upstream::UpstreamClient;

use crate::api::paths;
use crate::config::Config;
use crate::error::{Result, ScaffoldCountError};
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route(paths::SCAFFOLD_UPLOAD, post(handlers::scaffold_upload))
        .route(paths::SCAFFOLD_MODELS, get(handlers::scaffold_models))
        .route(paths::SCAFFOLD_CLASSIFY, post(handlers::scaffold_classify))
        .route(paths::STEEL_UPLOAD, post(handlers::steel_upload))
        .route(paths::STEEL_MODELS, get(handlers::steel_models))
        .route(paths::STEEL_DETECT, post(handlers::steel_detect))
        .layer(DefaultBodyLimit::disable())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// 設定の `listen` で待ち受ける
pub async fn serve(config: &Config) -> Result<()> {
    let state = AppState::new(UpstreamClient::from_config(config));
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.listen).await?;
    tracing::info!(
        listen = %config.listen,
        classifier = %config.classifier_url,
        counter = %config.counter_url,
        "プロキシを起動"
    );

    axum::serve(listener, app)
        .await
        .map_err(|e| ScaffoldCountError::Http(e.to_string()))
}
