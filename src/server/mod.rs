//! HTTP 介面
//!
//! 除了靜態前端檔案外，所有路由都需要通過權杖驗證

mod auth;
mod exec;
mod handlers;

pub use auth::require_token;
pub use exec::{ExecCommand, ExecRequest, ExecResult, run_command};

use crate::component::media_library::MediaLibrary;
use crate::component::thumbnail_generator::ThumbnailPipeline;
use crate::config::AppConfig;
use crate::signal::ShutdownSignal;
use anyhow::{Context, Result};
use axum::Router;
use axum::middleware;
use axum::routing::{get, post};
use log::info;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;

/// 所有處理器共用的唯讀狀態
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub library: Arc<MediaLibrary>,
    pub pipeline: ThumbnailPipeline,
    pub shutdown: ShutdownSignal,
}

impl AppState {
    #[must_use]
    pub fn new(config: AppConfig, library: MediaLibrary, shutdown: ShutdownSignal) -> Self {
        let pipeline = ThumbnailPipeline::new(
            config.tools.clone(),
            config.keyframe_strategy,
            config.max_concurrent_thumbnails,
        );

        Self {
            config: Arc::new(config),
            library: Arc::new(library),
            pipeline,
            shutdown,
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/images", get(handlers::list_images))
        .route("/images/:index", get(handlers::serve_image))
        .route("/images/:index/*name", get(handlers::serve_image))
        .route("/thumbnails/:index", get(handlers::serve_thumbnail))
        .route("/thumbnails/:index/*name", get(handlers::serve_thumbnail))
        .route("/configs", get(handlers::list_configs))
        .route("/exit", get(handlers::exit).post(handlers::exit))
        .route("/exec", post(exec::exec))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_token));

    let router = match &state.config.assets_dir {
        Some(assets) => api.fallback_service(ServeDir::new(assets)),
        None => api,
    };

    router.with_state(state)
}

/// 啟動伺服器，直到 Ctrl-C 或 /exit 後完成進行中的請求再回傳
pub async fn serve(listener: TcpListener, state: AppState) -> Result<()> {
    let shutdown = state.shutdown.clone();
    let router = build_router(state);

    info!(
        "開始監聽 {}",
        listener.local_addr().context("無法取得監聽位址")?
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown.wait())
        .await
        .context("HTTP 伺服器異常結束")?;

    Ok(())
}
