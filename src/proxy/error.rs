//! プロキシのエラー応答
//!
//! 失敗はすべて `{ error, details }` + 500。必須項目の欠落のみ 400。

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt::Display;

#[derive(Debug)]
pub enum ProxyError {
    /// 400
    BadRequest(String),
    /// 500（エンドポイントの概要＋詳細）
    Failed {
        summary: &'static str,
        details: String,
    },
}

impl ProxyError {
    pub fn failed(summary: &'static str, details: impl Display) -> Self {
        Self::Failed {
            summary,
            details: details.to_string(),
        }
    }

    /// `map_err` 用
    pub fn with<E: Display>(summary: &'static str) -> impl Fn(E) -> Self {
        move |e| Self::failed(summary, e)
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        match self {
            ProxyError::BadRequest(message) => {
                tracing::warn!(%message, "不正なリクエスト");
                (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
            }
            ProxyError::Failed { summary, details } => {
                tracing::error!(%summary, %details, "プロキシエラー");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": summary, "details": details })),
                )
                    .into_response()
            }
        }
    }
}

pub type ProxyResult<T> = std::result::Result<T, ProxyError>;
