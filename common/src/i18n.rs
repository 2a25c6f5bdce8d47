//! 表示文言（英語/日本語）
//!
//! 文言キーは `progress.*` / `toast.*` / `results.*` / `model.*`。
//! `{name}` 形式のプレースホルダは [`Language::format`] で置換する。

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    #[default]
    Ja,
}

/// (キー, 英語, 日本語)
const MESSAGES: &[(&str, &str, &str)] = &[
    // 進捗
    ("progress.preparing", "Preparing images...", "画像を準備中..."),
    ("progress.storing", "Storing original images...", "元画像を保存中..."),
    ("progress.uploading.scaffold", "Uploading to scaffold API...", "足場APIにアップロード中..."),
    ("progress.uploading.steel", "Uploading to steel API...", "鉄骨APIにアップロード中..."),
    ("progress.getting.models", "Getting classification models...", "分類モデルを取得中..."),
    ("progress.classifying", "Classifying images...", "画像を分類中..."),
    ("progress.saving", "Saving results...", "結果を保存中..."),
    ("progress.redirecting", "Redirecting...", "リダイレクト中..."),
    ("progress.loading.models", "Loading counting models...", "カウントモデルを読み込み中..."),
    ("progress.counting", "Counting objects...", "カウント中..."),
    // 通知
    ("toast.missing.data", "Missing Data", "データが見つかりません"),
    ("toast.missing.data.desc", "Please upload and classify images first", "最初に画像をアップロードして分類してください"),
    ("toast.error.loading.models", "Error Loading Models", "モデル読み込みエラー"),
    ("toast.error.loading.models.desc", "Using fallback models", "フォールバックモデルを使用します"),
    ("toast.no.model.selected", "No Model Selected", "モデルが選択されていません"),
    ("toast.no.model.selected.desc", "Please select a model before proceeding", "続行する前にモデルを選択してください"),
    ("toast.model.selected", "Model Selected", "モデルが選択されました"),
    ("toast.model.selected.desc", "Proceeding with {model}", "{model}で続行します"),
    ("toast.photo.captured", "Photo Captured!", "写真が撮影されました！"),
    ("toast.photo.captured.desc", "Image added to your selection", "画像が選択に追加されました"),
    ("toast.upload.successful", "Upload Successful!", "アップロード成功！"),
    ("toast.upload.successful.desc", "Images uploaded to both APIs successfully", "両方のAPIに画像が正常にアップロードされました"),
    ("toast.partial.success", "Partial Success", "部分的成功"),
    ("toast.partial.success.desc", "Some APIs returned no data. Continuing with best-effort data.", "一部のAPIがデータを返しませんでした。ベストエフォートデータで続行します。"),
    ("toast.classification.complete", "Classification Complete!", "分類完了！"),
    ("toast.classification.complete.desc", "Images uploaded to both APIs and classified successfully", "両方のAPIに画像がアップロードされ、分類が正常に完了しました"),
    ("toast.process.failed", "Process Failed", "処理失敗"),
    ("toast.process.failed.desc", "Please check your connection and try again", "接続を確認して再試行してください"),
    ("toast.no.images", "No Images", "画像がありません"),
    ("toast.no.images.desc", "No images found for steel count API", "鉄骨カウントAPI用の画像が見つかりません"),
    ("toast.counting.complete", "Counting Complete!", "カウント完了！"),
    ("toast.counting.complete.desc", "Found {count} in {images} images", "{images}枚の画像で{count}個を発見しました"),
    ("toast.counting.complete.demo", "Counting Complete! (Demo Mode)", "カウント完了！（デモモード）"),
    ("toast.counting.demo.desc", "API Error: {error}. Using mock data.", "APIエラー: {error}。モックデータを使用します。"),
    ("toast.new.analysis", "New Analysis", "新しい分析"),
    ("toast.new.analysis.desc", "Session cleared", "セッションをクリアしました"),
    // 結果
    ("results.title", "Detection Results", "検出結果"),
    ("results.total.objects", "Total Objects", "総オブジェクト数"),
    ("results.images.analyzed", "Images Analyzed", "分析された画像数"),
    ("results.total.time", "Total Time", "総処理時間"),
    ("results.found", "found", "個発見"),
    ("results.exported", "Results exported", "結果をエクスポートしました"),
    ("results.demo.notice", "These counts are demo data (API unavailable)", "このカウントはデモデータです（API未接続）"),
    // モデル選択
    ("model.recommended", "Recommended", "推奨"),
    ("model.most.classified", "Most images were classified as", "最も多い分類結果"),
    ("model.select.prompt", "Select counting model", "カウントモデルを選択"),
];

impl Language {
    /// 文言を取得（未登録キーはキーをそのまま返す）
    pub fn t(self, key: &'static str) -> &'static str {
        MESSAGES
            .iter()
            .find(|(k, _, _)| *k == key)
            .map(|(_, en, ja)| match self {
                Language::En => *en,
                Language::Ja => *ja,
            })
            .unwrap_or(key)
    }

    /// プレースホルダ置換付きで文言を取得
    pub fn format(self, key: &'static str, args: &[(&str, &str)]) -> String {
        args.iter().fold(self.t(key).to_string(), |text, (name, value)| {
            text.replace(&format!("{{{name}}}"), value)
        })
    }

    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Ja => "ja",
        }
    }
}

impl std::str::FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "en" | "english" => Ok(Language::En),
            "ja" | "jp" | "japanese" | "日本語" => Ok(Language::Ja),
            _ => Err(format!("Unknown language: {}. Use en or ja", s)),
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translate() {
        assert_eq!(Language::En.t("toast.partial.success"), "Partial Success");
        assert_eq!(Language::Ja.t("toast.partial.success"), "部分的成功");
    }

    #[test]
    fn test_unknown_key_returns_key() {
        assert_eq!(Language::En.t("no.such.key"), "no.such.key");
    }

    #[test]
    fn test_format_placeholders() {
        let text = Language::Ja.format("toast.counting.complete.desc", &[("count", "12"), ("images", "3")]);
        assert_eq!(text, "3枚の画像で12個を発見しました");
    }

    #[test]
    fn test_parse_language() {
        assert_eq!("EN".parse::<Language>().unwrap(), Language::En);
        assert_eq!("ja".parse::<Language>().unwrap(), Language::Ja);
        assert!("fr".parse::<Language>().is_err());
    }

    #[test]
    fn test_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Language::En).unwrap(), "\"en\"");
        let lang: Language = serde_json::from_str("\"ja\"").unwrap();
        assert_eq!(lang, Language::Ja);
    }
}
