//! プロキシAPIクライアント
//!
//! ウィザード側からプロキシの6エンドポイントを呼び出す。
//! レスポンスは生のJSONで返し、スキーマ検証は呼び出し側（common::parser）で行う。

use crate::error::{Result, ScaffoldCountError};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Serialize;
use serde_json::Value;

pub mod paths {
    pub const SCAFFOLD_UPLOAD: &str = "/api/scaffold/upload";
    pub const SCAFFOLD_MODELS: &str = "/api/scaffold/models";
    pub const SCAFFOLD_CLASSIFY: &str = "/api/scaffold/classify";
    pub const STEEL_UPLOAD: &str = "/api/steel/upload";
    pub const STEEL_MODELS: &str = "/api/steel/models";
    pub const STEEL_DETECT: &str = "/api/steel/detect";
}

/// アップロードする画像1枚
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// カウント（検出）リクエスト
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectRequest {
    pub image_ids: Vec<String>,
    pub model_choice: String,
    pub brightness: f64,
    pub contrast: f64,
    pub gamma: f64,
}

impl DetectRequest {
    /// 画像補正なし（brightness 0 / contrast 0 / gamma 1.0）
    pub fn new(image_ids: Vec<String>, model_choice: impl Into<String>) -> Self {
        Self {
            image_ids,
            model_choice: model_choice.into(),
            brightness: 0.0,
            contrast: 0.0,
            gamma: 1.0,
        }
    }
}

#[derive(Debug, Serialize)]
struct ClassifyRequest<'a> {
    image_ids: &'a str,
    model_name: &'a str,
}

#[async_trait]
pub trait InferenceApi: Send + Sync {
    async fn upload_scaffold(&self, images: &[ImageUpload]) -> Result<Value>;
    async fn upload_steel(&self, images: &[ImageUpload]) -> Result<Value>;
    async fn classification_models(&self) -> Result<Value>;
    /// `image_ids` はカンマ区切り
    async fn classify(&self, image_ids: &str, model_name: &str) -> Result<Value>;
    async fn counting_models(&self) -> Result<Value>;
    async fn detect(&self, request: &DetectRequest) -> Result<Value>;
}

/// HTTP経由でプロキシを呼ぶ実装
#[derive(Debug, Clone)]
pub struct HttpApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn files_form(images: &[ImageUpload]) -> Result<Form> {
        images.iter().try_fold(Form::new(), |form, image| -> Result<Form> {
            let part = Part::bytes(image.bytes.clone())
                .file_name(image.file_name.clone())
                .mime_str(&image.mime_type)?;
            Ok(form.part("files", part))
        })
    }

    async fn upload(&self, path: &str, images: &[ImageUpload], label: &str) -> Result<Value> {
        tracing::debug!(path, count = images.len(), "画像をアップロード");
        let response = self
            .client
            .post(self.url(path))
            .multipart(Self::files_form(images)?)
            .send()
            .await?;
        read_json(response, label).await
    }
}

/// 成功ならJSONを返し、失敗ならエラー封筒からメッセージを取り出す
async fn read_json(response: reqwest::Response, label: &str) -> Result<Value> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }

    let text = response.text().await.unwrap_or_default();
    let detail = serde_json::from_str::<Value>(&text)
        .ok()
        .and_then(|body| scaffold_count_common::parser::error_message(&body))
        .or_else(|| status.canonical_reason().map(str::to_string))
        .unwrap_or_else(|| status.to_string());

    tracing::warn!(status = status.as_u16(), %detail, "{} 失敗", label);
    Err(ScaffoldCountError::api_call(
        Some(status.as_u16()),
        format!("{}: {}", label, detail),
    ))
}

#[async_trait]
impl InferenceApi for HttpApi {
    async fn upload_scaffold(&self, images: &[ImageUpload]) -> Result<Value> {
        self.upload(paths::SCAFFOLD_UPLOAD, images, "Scaffold upload failed").await
    }

    async fn upload_steel(&self, images: &[ImageUpload]) -> Result<Value> {
        self.upload(paths::STEEL_UPLOAD, images, "Steel upload failed").await
    }

    async fn classification_models(&self) -> Result<Value> {
        let response = self.client.get(self.url(paths::SCAFFOLD_MODELS)).send().await?;
        read_json(response, "Failed to fetch models").await
    }

    async fn classify(&self, image_ids: &str, model_name: &str) -> Result<Value> {
        let response = self
            .client
            .post(self.url(paths::SCAFFOLD_CLASSIFY))
            .json(&ClassifyRequest { image_ids, model_name })
            .send()
            .await?;
        read_json(response, "Classification failed").await
    }

    async fn counting_models(&self) -> Result<Value> {
        let response = self.client.get(self.url(paths::STEEL_MODELS)).send().await?;
        read_json(response, "Failed to fetch counting models").await
    }

    async fn detect(&self, request: &DetectRequest) -> Result<Value> {
        let response = self
            .client
            .post(self.url(paths::STEEL_DETECT))
            .json(request)
            .send()
            .await?;
        read_json(response, "Detection failed").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_request_defaults() {
        let request = DetectRequest::new(vec!["a".into(), "b".into()], "ND Connector");
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["image_ids"], serde_json::json!(["a", "b"]));
        assert_eq!(json["brightness"], 0.0);
        assert_eq!(json["contrast"], 0.0);
        assert_eq!(json["gamma"], 1.0);
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let api = HttpApi::new("http://localhost:3000/");
        assert_eq!(api.url(paths::STEEL_DETECT), "http://localhost:3000/api/steel/detect");
    }
}
