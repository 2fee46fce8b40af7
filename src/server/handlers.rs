use super::AppState;
use crate::error::MediaError;
use crate::tools::UNKNOWN_BINARY;
use axum::Json;
use axum::body::Body;
use axum::extract::{Path, Request, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use log::{debug, error, info};
use serde::Deserialize;
use tower::ServiceExt;
use tower_http::services::ServeFile;

const THUMBNAIL_MIME: &str = "image/jpeg";

/// `/images/:index` 與 `/images/:index/*name` 共用；尾端檔名只供瀏覽器顯示
#[derive(Debug, Deserialize)]
pub struct IndexPath {
    index: usize,
}

pub async fn list_images(State(state): State<AppState>) -> Response {
    Json(state.library.entries()).into_response()
}

pub async fn list_configs(State(state): State<AppState>) -> Response {
    Json(&state.config.configs).into_response()
}

/// 串流原始檔案，支援 Range 請求；Content-Type 使用嗅探結果
pub async fn serve_image(
    State(state): State<AppState>,
    Path(IndexPath { index }): Path<IndexPath>,
    request: Request,
) -> Response {
    let entry = match state.library.get(index) {
        Ok(entry) => entry,
        Err(e) => return error_response(&e),
    };

    let mut response = match ServeFile::new(&entry.path).oneshot(request).await {
        Ok(response) => response.into_response(),
        Err(never) => match never {},
    };

    if response.status() == StatusCode::NOT_FOUND {
        error!("檔案已無法讀取: {}", entry.path.display());
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    if response.status().is_success() {
        let mime = HeaderValue::from_str(&entry.mime_type)
            .unwrap_or_else(|_| HeaderValue::from_static(UNKNOWN_BINARY));
        response.headers_mut().insert(header::CONTENT_TYPE, mime);
    }

    response
}

/// 生成縮圖；第一段輸出產生後才回應 200，其餘直接串流
pub async fn serve_thumbnail(
    State(state): State<AppState>,
    Path(IndexPath { index }): Path<IndexPath>,
) -> Response {
    let entry = match state.library.get(index) {
        Ok(entry) => entry,
        Err(e) => return error_response(&e),
    };

    match state.pipeline.render(entry).await {
        Ok(thumbnail) => (
            [(header::CONTENT_TYPE, THUMBNAIL_MIME)],
            Body::from_stream(thumbnail.into_stream()),
        )
            .into_response(),
        Err(e) => error_response(&e),
    }
}

pub async fn exit(State(state): State<AppState>) -> StatusCode {
    if state.config.auto_exit {
        info!("收到 /exit，準備關閉");
        state.shutdown.trigger();
    } else {
        debug!("收到 /exit，但未啟用自動結束");
    }
    StatusCode::OK
}

/// 錯誤細節只寫入日誌，回應一律為空白內容
fn error_response(err: &MediaError) -> Response {
    let status = if err.is_client_error() {
        debug!("{err}");
        StatusCode::NOT_FOUND
    } else {
        error!("{err}");
        StatusCode::INTERNAL_SERVER_ERROR
    };
    status.into_response()
}
