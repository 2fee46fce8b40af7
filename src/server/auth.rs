use super::AppState;
use axum::extract::{Request, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use cmov::Cmov;
use log::warn;

const TOKEN_COOKIE: &str = "token";

/// 驗證 `Authorization: Bearer` 或 `token` cookie，失敗回傳空白的 403
pub async fn require_token(State(state): State<AppState>, request: Request, next: Next) -> Response {
    if is_authorized(request.headers(), &state.config.token) {
        next.run(request).await
    } else {
        warn!("拒絕未授權的請求: {}", request.uri().path());
        StatusCode::FORBIDDEN.into_response()
    }
}

fn is_authorized(headers: &HeaderMap, token: &str) -> bool {
    bearer_token(headers).is_some_and(|presented| tokens_match(presented, token))
        || cookie_tokens(headers).any(|presented| tokens_match(presented, token))
}

/// 逐位元組比較且不提早結束，比較時間與第一個不同的位置無關
fn tokens_match(presented: &str, expected: &str) -> bool {
    let (presented, expected) = (presented.as_bytes(), expected.as_bytes());
    if presented.len() != expected.len() {
        return false;
    }

    let mut equal = 1u8;
    for (a, b) in presented.iter().zip(expected) {
        equal.cmovnz(&0u8, a ^ b);
    }
    equal != 0
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

fn cookie_tokens(headers: &HeaderMap) -> impl Iterator<Item = &str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .filter(|(name, value)| *name == TOKEN_COOKIE && !value.is_empty())
        .map(|(_, value)| value)
}
