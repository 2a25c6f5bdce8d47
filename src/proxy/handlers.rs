//! プロキシの各エンドポイント
//!
//! 受け取った内容をそのまま外部APIへ転送し、応答JSONを変更せずに返す。

use super::error::{ProxyError, ProxyResult};
use super::upstream::{self, FormField, Service, UpstreamClient};
use axum::{
    body::Bytes,
    extract::{multipart::MultipartRejection, Multipart, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub upstream: Arc<UpstreamClient>,
}

impl AppState {
    pub fn new(upstream: UpstreamClient) -> Self {
        Self {
            upstream: Arc::new(upstream),
        }
    }
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// 受信したマルチパートを全項目そのまま転送用に読み込む
async fn read_multipart(mut multipart: Multipart) -> Result<Vec<FormField>, String> {
    let mut fields = Vec::new();
    while let Some(field) = multipart.next_field().await.map_err(|e| e.to_string())? {
        let name = field.name().unwrap_or("files").to_string();
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.map_err(|e| e.to_string())?;

        if file_name.is_some() {
            fields.push(FormField::File {
                name,
                file_name,
                content_type,
                bytes,
            });
        } else {
            fields.push(FormField::Text {
                name,
                value: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }
    }
    Ok(fields)
}

/// マルチパートとして読めない本文も500の封筒で返す
async fn forward_upload(
    upstream: &UpstreamClient,
    service: Service,
    path: &str,
    multipart: Result<Multipart, MultipartRejection>,
    summary: &'static str,
) -> ProxyResult<Json<Value>> {
    let multipart = multipart.map_err(ProxyError::with(summary))?;
    let fields = read_multipart(multipart)
        .await
        .map_err(ProxyError::with(summary))?;
    tracing::info!(path, fields = fields.len(), "アップロードを転送");

    let body = upstream
        .post_form(service, path, fields)
        .await
        .map_err(ProxyError::with(summary))?;
    Ok(Json(body))
}

pub async fn scaffold_upload(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ProxyResult<Json<Value>> {
    forward_upload(
        &state.upstream,
        Service::Classifier,
        upstream::CLASSIFIER_UPLOAD,
        multipart,
        "Upload failed",
    )
    .await
}

pub async fn steel_upload(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ProxyResult<Json<Value>> {
    forward_upload(
        &state.upstream,
        Service::Counter,
        upstream::COUNTER_UPLOAD,
        multipart,
        "Steel upload failed",
    )
    .await
}

pub async fn scaffold_models(State(state): State<AppState>) -> ProxyResult<Json<Value>> {
    let body = state
        .upstream
        .get_json(Service::Classifier, upstream::CLASSIFIER_MODELS)
        .await
        .map_err(ProxyError::with("Failed to fetch models"))?;
    Ok(Json(body))
}

pub async fn steel_models(State(state): State<AppState>) -> ProxyResult<Json<Value>> {
    let body = state
        .upstream
        .get_json(Service::Counter, upstream::COUNTER_MODELS)
        .await
        .map_err(ProxyError::with("Failed to fetch steel models"))?;
    Ok(Json(body))
}

/// 配列でも文字列でも受け付け、カンマ区切りにする
fn join_ids(value: &Value) -> String {
    match value {
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[derive(Debug, Deserialize)]
struct ClassifyBody {
    image_ids: Value,
    model_name: Value,
}

pub async fn scaffold_classify(
    State(state): State<AppState>,
    body: Bytes,
) -> ProxyResult<Json<Value>> {
    const SUMMARY: &str = "Classification failed";
    let request: ClassifyBody = serde_json::from_slice(&body).map_err(ProxyError::with(SUMMARY))?;

    let fields = vec![
        FormField::text("image_ids", join_ids(&request.image_ids)),
        FormField::text("model_name", value_text(&request.model_name)),
    ];
    tracing::info!(image_ids = %join_ids(&request.image_ids), "分類を転送");

    let body = state
        .upstream
        .post_form(Service::Classifier, upstream::CLASSIFIER_CLASSIFY, fields)
        .await
        .map_err(ProxyError::with(SUMMARY))?;
    Ok(Json(body))
}

#[derive(Debug, Default, Deserialize)]
struct DetectBody {
    #[serde(default)]
    image_ids: Option<Value>,
    #[serde(default)]
    model_choice: Option<Value>,
    #[serde(default)]
    brightness: Option<f64>,
    #[serde(default)]
    contrast: Option<f64>,
    #[serde(default)]
    gamma: Option<f64>,
}

fn present(value: &Option<Value>) -> Option<&Value> {
    match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.is_empty() => None,
        Some(v) => Some(v),
    }
}

/// 0 は未指定と同じ扱い
fn or_default(value: Option<f64>, default: f64) -> f64 {
    value.filter(|v| *v != 0.0).unwrap_or(default)
}

pub async fn steel_detect(
    State(state): State<AppState>,
    body: Bytes,
) -> ProxyResult<Json<Value>> {
    const SUMMARY: &str = "Detection failed";
    let request: DetectBody = serde_json::from_slice(&body).map_err(ProxyError::with(SUMMARY))?;

    let (Some(image_ids), Some(model_choice)) =
        (present(&request.image_ids), present(&request.model_choice))
    else {
        return Err(ProxyError::BadRequest(
            "Missing required fields: image_ids and model_choice are required".to_string(),
        ));
    };

    let fields = vec![
        FormField::text("image_ids", join_ids(image_ids)),
        FormField::text("model_choice", value_text(model_choice)),
        FormField::text("brightness", or_default(request.brightness, 0.0).to_string()),
        FormField::text("contrast", or_default(request.contrast, 0.0).to_string()),
        FormField::text("gamma", or_default(request.gamma, 1.0).to_string()),
    ];
    tracing::info!(model = %value_text(model_choice), "検出を転送");

    let body = state
        .upstream
        .post_form(Service::Counter, upstream::COUNTER_DETECT, fields)
        .await
        .map_err(ProxyError::with(SUMMARY))?;
    Ok(Json(body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_ids_accepts_array_and_string() {
        assert_eq!(join_ids(&json!(["a", "b", 3])), "a,b,3");
        assert_eq!(join_ids(&json!("x,y")), "x,y");
    }

    #[test]
    fn test_detect_defaults() {
        assert_eq!(or_default(None, 1.0).to_string(), "1");
        assert_eq!(or_default(Some(0.0), 1.0).to_string(), "1");
        assert_eq!(or_default(Some(1.5), 1.0).to_string(), "1.5");
        assert_eq!(or_default(None, 0.0).to_string(), "0");
    }

    #[test]
    fn test_present_rejects_empty() {
        assert!(present(&None).is_none());
        assert!(present(&Some(Value::Null)).is_none());
        assert!(present(&Some(json!(""))).is_none());
        assert!(present(&Some(json!(["a"]))).is_some());
    }
}
