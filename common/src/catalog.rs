//! カウントモデルカタログ
//!
//! 表示名・説明は静的に持ち、実際に選べるモデルは
//! カウントAPIの `available-models` との積集合で決まる。

use crate::i18n::Language;
use serde::Serialize;

/// カタログの1エントリ
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelEntry {
    /// API呼び出しに使うID
    pub id: &'static str,
    pub en: &'static str,
    pub ja: &'static str,
    pub desc_en: &'static str,
    pub desc_ja: &'static str,
}

impl ModelEntry {
    pub fn display_name(&self, language: Language) -> &'static str {
        match language {
            Language::En => self.en,
            Language::Ja => self.ja,
        }
    }

    pub fn description(&self, language: Language) -> &'static str {
        match language {
            Language::En => self.desc_en,
            Language::Ja => self.desc_ja,
        }
    }

    /// 分類クラス名がこのモデルを指すか
    fn matches_class(&self, class_en: &str) -> bool {
        self.en == class_en || self.id == class_en
    }
}

pub const COUNTING_MODELS: &[ModelEntry] = &[
    ModelEntry {
        id: "ND press",
        en: "ND brace",
        ja: "NDブレス",
        desc_en: "ND brace detection model",
        desc_ja: "NDブレス検出モデル",
    },
    ModelEntry {
        id: "ND Connector",
        en: "ND Connector",
        ja: "NDつなぎ",
        desc_en: "ND Connector detection model",
        desc_ja: "NDつなぎ検出モデル",
    },
    ModelEntry {
        id: "ND Post",
        en: "ND POST",
        ja: "ND支柱",
        desc_en: "ND POST detection model",
        desc_ja: "ND支柱検出モデル",
    },
    ModelEntry {
        id: "Aluminum Stairs",
        en: "Aluminum Stairs",
        ja: "アルミ階段",
        desc_en: "Aluminum stairs detection model",
        desc_ja: "アルミ階段検出モデル",
    },
    ModelEntry {
        id: "Roundpipes",
        en: "Roundpipes",
        ja: "丸パイプ",
        desc_en: "Round pipe detection model",
        desc_ja: "丸パイプ検出モデル",
    },
    ModelEntry {
        id: "Toe Board",
        en: "Toe Board",
        ja: "巾木",
        desc_en: "Toe board detection model",
        desc_ja: "巾木検出モデル",
    },
    ModelEntry {
        id: "plank[Plank SKN, PlankNDN2, Plank NDN1, Plank BKN]",
        en: "plank (Plank SKN, Plank NDN2, Plank NDN1, Plank BKN)",
        ja: "布板4種類",
        desc_en: "Multi-type plank detection model",
        desc_ja: "布板4種類検出モデル",
    },
    ModelEntry {
        id: "Rectangle pipes",
        en: "Rectangle pipes",
        ja: "角パイプ",
        desc_en: "Rectangle pipe detection model",
        desc_ja: "角パイプ検出モデル",
    },
    ModelEntry {
        id: "Scaffold Plank(Alumi)",
        en: "Scaffold Plank (Alumi)",
        ja: "足場板（アルミ）",
        desc_en: "Aluminum scaffold plank detection model",
        desc_ja: "足場板（アルミ）検出モデル",
    },
    ModelEntry {
        id: "Scaffold Plank(Wood)",
        en: "Scaffold Plank (Wood)",
        ja: "足場板（杉）",
        desc_en: "Wooden scaffold plank detection model",
        desc_ja: "足場板（杉）検出モデル",
    },
    ModelEntry {
        id: "Scaffold Plank(Steel)",
        en: "Scaffold Plank (Steel)",
        ja: "足場板（鋼）",
        desc_en: "Steel scaffold plank detection model",
        desc_ja: "足場板（鋼）検出モデル",
    },
];

/// モデル一覧を取得できなかった場合の候補
const FALLBACK_MODEL_IDS: &[&str] = &["ND Connector", "Scaffold Plank(Steel)"];

/// 選択画面に出すモデル
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CountingModel {
    pub id: String,
    pub display_name: String,
    pub description: String,
    pub available_in_api: bool,
    pub recommended: bool,
}

impl CountingModel {
    fn from_entry(entry: &ModelEntry, language: Language, available_in_api: bool) -> Self {
        Self {
            id: entry.id.to_string(),
            display_name: entry.display_name(language).to_string(),
            description: entry.description(language).to_string(),
            available_in_api,
            recommended: false,
        }
    }
}

pub fn find(id: &str) -> Option<&'static ModelEntry> {
    COUNTING_MODELS.iter().find(|m| m.id == id)
}

/// 分類クラス名（英語）に対応するカタログエントリ
pub fn find_by_class(class_en: &str) -> Option<&'static ModelEntry> {
    COUNTING_MODELS.iter().find(|m| m.matches_class(class_en))
}

/// 表示名（カタログにないIDはそのまま）
pub fn display_name(id: &str, language: Language) -> String {
    find(id)
        .map(|m| m.display_name(language).to_string())
        .unwrap_or_else(|| id.to_string())
}

/// カタログとAPIのモデル一覧の積集合（カタログ順）
pub fn available_models(api_models: &[String], language: Language) -> Vec<CountingModel> {
    COUNTING_MODELS
        .iter()
        .filter(|entry| api_models.iter().any(|m| m == entry.id))
        .map(|entry| CountingModel::from_entry(entry, language, true))
        .collect()
}

/// フォールバック候補（先頭を推奨）
pub fn fallback_models(language: Language) -> Vec<CountingModel> {
    let mut models: Vec<CountingModel> = FALLBACK_MODEL_IDS
        .iter()
        .filter_map(|id| find(id))
        .map(|entry| CountingModel::from_entry(entry, language, true))
        .collect();
    if let Some(first) = models.first_mut() {
        first.recommended = true;
    }
    models
}
