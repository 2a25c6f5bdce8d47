//! ウィザード各ステップで受け渡す型
//!
//! - ScaffoldFile / SteelUpload: 上流APIへのアップロード結果
//! - OriginalImage / SteelFile: セッションに保存する元画像と対応付け
//! - ClassificationResult: 分類結果（推奨モデル判定に使用）
//! - CountingResponse: カウント結果（実API応答またはデモ用の合成データ）

use crate::i18n::Language;
use serde::{Deserialize, Serialize};

/// 分類API（足場）にアップロードしたファイル
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScaffoldFile {
    pub file_id: String,
    #[serde(default)]
    pub filename: String,
}

/// カウントAPI（鉄骨）にアップロードした画像
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SteelUpload {
    pub image_id: String,
    #[serde(default)]
    pub filename: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview: Option<String>,
}

/// 元画像（表示用のData URL付き）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OriginalImage {
    /// `original_<index>`
    pub id: String,
    pub name: String,
    pub size: u64,
    #[serde(rename = "type")]
    pub mime_type: String,
    pub data_url: String,
}

/// セッションに保存するカウント対象画像
///
/// アップロード結果に元画像IDと表示用URLを付与したもの。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SteelFile {
    #[serde(flatten)]
    pub upload: SteelUpload,
    #[serde(rename = "originalId", default, skip_serializing_if = "Option::is_none")]
    pub original_id: Option<String>,
    #[serde(rename = "displayUrl", default)]
    pub display_url: String,
}

impl SteelFile {
    pub fn image_id(&self) -> &str {
        &self.upload.image_id
    }

    pub fn filename(&self) -> &str {
        &self.upload.filename
    }
}

/// 画像1枚の分類結果
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub image_id: String,
    #[serde(default)]
    pub predicted_class_en: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predicted_class_jp: Option<String>,
}

impl ClassificationResult {
    /// 表示用ラベル
    ///
    /// 日本語表示では `predicted_class_jp` を優先し、無ければ英語名。
    pub fn label(&self, language: Language) -> &str {
        let jp = self.predicted_class_jp.as_deref().filter(|c| !c.is_empty());
        match (language, jp) {
            (Language::Ja, Some(jp)) => jp,
            (_, jp) if self.predicted_class_en.is_empty() => jp.unwrap_or_default(),
            _ => &self.predicted_class_en,
        }
    }
}

/// 画像1枚のカウント結果
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CountingResult {
    pub image_id: String,
    #[serde(default)]
    pub filename: String,
    pub count: u32,
    #[serde(default)]
    pub annotated_image_base64: String,
}

/// カウントAPIの応答
///
/// 未知のフィールドは `extra` に保持し、保存時にそのまま書き戻す。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CountingResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub total_images_processed: usize,
    #[serde(default)]
    pub total_count: u32,
    /// 秒
    #[serde(default)]
    pub processing_time: f64,
    #[serde(default)]
    pub model_used: String,
    pub results: Vec<CountingResult>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}
