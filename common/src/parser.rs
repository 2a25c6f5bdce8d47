//! 上流APIレスポンスパーサー
//!
//! 各エンドポイントのレスポンスは1つのスキーマに固定する。
//! 形が合わない場合は `Error::Schema` を返し、空配列などで黙って続行しない。
//!
//! | エンドポイント | スキーマ |
//! |---|---|
//! | scaffold/upload | `{ "uploaded_files": [{ "file_id", "filename" }] }` |
//! | scaffold/models | `{ "models": [string] }` |
//! | scaffold/classify | `{ "results": [{ "image_id", "predicted_class_en", "predicted_class_jp"? }] }` |
//! | steel/upload | `{ "images": [{ "image_id", "filename", "preview"? }] }` |
//! | steel/models | `{ "models": [string] }` |
//! | steel/detect | `CountingResponse` |

use crate::error::{Error, Result};
use crate::types::{ClassificationResult, CountingResponse, ScaffoldFile, SteelUpload};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

/// 分類モデル一覧が空のときに使うモデル
pub const DEFAULT_CLASSIFICATION_MODEL: &str = "initial_model.keras";

#[derive(Debug, Deserialize)]
struct ScaffoldUploadBody {
    uploaded_files: Vec<ScaffoldFile>,
}

#[derive(Debug, Deserialize)]
struct SteelUploadBody {
    images: Vec<SteelUpload>,
}

#[derive(Debug, Deserialize)]
struct ModelListBody {
    models: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ClassifyBody {
    results: Vec<ClassificationResult>,
}

fn parse_body<T: DeserializeOwned>(endpoint: &'static str, body: Value) -> Result<T> {
    serde_json::from_value(body).map_err(|e| Error::Schema {
        endpoint,
        message: e.to_string(),
    })
}

/// 分類APIのアップロード結果をパース
pub fn parse_scaffold_upload(body: Value) -> Result<Vec<ScaffoldFile>> {
    parse_body::<ScaffoldUploadBody>("scaffold/upload", body).map(|b| b.uploaded_files)
}

/// カウントAPIのアップロード結果をパース
pub fn parse_steel_upload(body: Value) -> Result<Vec<SteelUpload>> {
    parse_body::<SteelUploadBody>("steel/upload", body).map(|b| b.images)
}

/// 分類モデル一覧をパース
pub fn parse_classification_models(body: Value) -> Result<Vec<String>> {
    parse_body::<ModelListBody>("scaffold/models", body).map(|b| b.models)
}

/// カウントモデル一覧をパース
pub fn parse_counting_models(body: Value) -> Result<Vec<String>> {
    parse_body::<ModelListBody>("steel/models", body).map(|b| b.models)
}

/// 分類結果をパース
pub fn parse_classification(body: Value) -> Result<Vec<ClassificationResult>> {
    parse_body::<ClassifyBody>("scaffold/classify", body).map(|b| b.results)
}

/// カウント結果をパース
pub fn parse_counting(body: Value) -> Result<CountingResponse> {
    parse_body("steel/detect", body)
}

/// 分類に使うモデルを決定（一覧の先頭、空ならデフォルト）
pub fn default_classification_model(models: &[String]) -> String {
    models
        .first()
        .cloned()
        .unwrap_or_else(|| DEFAULT_CLASSIFICATION_MODEL.to_string())
}

/// エラーレスポンスから表示用メッセージを取り出す
///
/// プロキシのエラー封筒 `{ error, details }` を想定し、`details` を優先する。
pub fn error_message(body: &Value) -> Option<String> {
    ["details", "error"]
        .iter()
        .find_map(|key| body.get(*key).and_then(Value::as_str))
        .map(str::to_string)
}
