//! セッション状態ストア
//!
//! ウィザードのステップ間で中間データを受け渡すキー・バリューストア。
//! 値はJSON文字列で保存する（`selectedCountingModel` と `preferred-language`、
//! `cameraImage` は生の文字列）。

mod file_store;
mod memory;

pub use file_store::FileStore;
pub use memory::MemoryStore;

use crate::error::Result;
use scaffold_count_common::{
    ClassificationResult, CountingResponse, Language, OriginalImage, ScaffoldFile, SteelFile,
};
use serde::de::DeserializeOwned;
use serde::Serialize;

pub mod keys {
    pub const ORIGINAL_IMAGES: &str = "originalImages";
    pub const SCAFFOLD_FILES: &str = "scaffoldFiles";
    pub const STEEL_FILES: &str = "steelFiles";
    pub const CLASSIFICATION_RESULTS: &str = "classificationResults";
    pub const SELECTED_COUNTING_MODEL: &str = "selectedCountingModel";
    pub const COUNTING_RESULTS: &str = "countingResults";
    pub const COUNTING_SOURCE: &str = "countingSource";
    pub const PREFERRED_LANGUAGE: &str = "preferred-language";
    pub const CAMERA_IMAGE: &str = "cameraImage";
}

/// 文字列キー・文字列値のストア
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
    fn keys(&self) -> Vec<String>;
}

/// ウィザードの画面
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Start,
    ModelSelection,
    Counting,
    Results,
}

impl Page {
    /// 表示に必要なキー
    pub fn required_keys(self) -> &'static [&'static str] {
        match self {
            Page::Start => &[],
            Page::ModelSelection => &[
                keys::SCAFFOLD_FILES,
                keys::STEEL_FILES,
                keys::CLASSIFICATION_RESULTS,
            ],
            Page::Counting => &[
                keys::SCAFFOLD_FILES,
                keys::STEEL_FILES,
                keys::CLASSIFICATION_RESULTS,
                keys::SELECTED_COUNTING_MODEL,
            ],
            Page::Results => &[keys::COUNTING_RESULTS],
        }
    }
}

/// ナビゲーションガードの判定
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Proceed,
    RedirectToStart { missing: Vec<&'static str> },
}

/// ウィザードの進行状態（保存済みキーから導出）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum WizardStep {
    Start,
    Uploaded,
    Classified,
    ModelChosen,
    Counted,
}

/// `countingResults` を生成した経路
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CountingSource {
    Live,
    Demo,
}

/// 型付きアクセサ付きのセッション
pub struct Session<S> {
    store: S,
}

impl<S: KeyValueStore> Session<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn contains(&self, key: &str) -> bool {
        self.store.get(key).is_some()
    }

    fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.store.get(key) {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    fn set_json<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> Result<()> {
        self.store.set(key, serde_json::to_string(value)?)
    }

    pub fn original_images(&self) -> Result<Option<Vec<OriginalImage>>> {
        self.get_json(keys::ORIGINAL_IMAGES)
    }

    pub fn set_original_images(&mut self, images: &[OriginalImage]) -> Result<()> {
        self.set_json(keys::ORIGINAL_IMAGES, images)
    }

    pub fn scaffold_files(&self) -> Result<Option<Vec<ScaffoldFile>>> {
        self.get_json(keys::SCAFFOLD_FILES)
    }

    pub fn set_scaffold_files(&mut self, files: &[ScaffoldFile]) -> Result<()> {
        self.set_json(keys::SCAFFOLD_FILES, files)
    }

    pub fn steel_files(&self) -> Result<Option<Vec<SteelFile>>> {
        self.get_json(keys::STEEL_FILES)
    }

    pub fn set_steel_files(&mut self, files: &[SteelFile]) -> Result<()> {
        self.set_json(keys::STEEL_FILES, files)
    }

    pub fn classification_results(&self) -> Result<Option<Vec<ClassificationResult>>> {
        self.get_json(keys::CLASSIFICATION_RESULTS)
    }

    pub fn set_classification_results(&mut self, results: &[ClassificationResult]) -> Result<()> {
        self.set_json(keys::CLASSIFICATION_RESULTS, results)
    }

    pub fn selected_model(&self) -> Option<String> {
        self.store.get(keys::SELECTED_COUNTING_MODEL)
    }

    pub fn set_selected_model(&mut self, model_id: &str) -> Result<()> {
        self.store.set(keys::SELECTED_COUNTING_MODEL, model_id.to_string())
    }

    pub fn counting_results(&self) -> Result<Option<CountingResponse>> {
        self.get_json(keys::COUNTING_RESULTS)
    }

    pub fn set_counting_results(&mut self, results: &CountingResponse, source: CountingSource) -> Result<()> {
        self.set_json(keys::COUNTING_RESULTS, results)?;
        self.set_json(keys::COUNTING_SOURCE, &source)
    }

    pub fn counting_source(&self) -> Result<Option<CountingSource>> {
        self.get_json(keys::COUNTING_SOURCE)
    }

    /// 保存済みの言語（不正値は無視）
    pub fn language(&self) -> Option<Language> {
        self.store
            .get(keys::PREFERRED_LANGUAGE)
            .and_then(|raw| raw.parse().ok())
    }

    pub fn set_language(&mut self, language: Language) -> Result<()> {
        self.store.set(keys::PREFERRED_LANGUAGE, language.code().to_string())
    }

    pub fn camera_image(&self) -> Option<String> {
        self.store.get(keys::CAMERA_IMAGE)
    }

    pub fn set_camera_image(&mut self, data_url: &str) -> Result<()> {
        self.store.set(keys::CAMERA_IMAGE, data_url.to_string())
    }

    /// 撮影画像を取り出して削除
    pub fn take_camera_image(&mut self) -> Result<Option<String>> {
        let image = self.camera_image();
        if image.is_some() {
            self.store.remove(keys::CAMERA_IMAGE)?;
        }
        Ok(image)
    }

    /// 画面に必要なキーが揃っているか
    pub fn guard(&self, page: Page) -> Navigation {
        let missing: Vec<&'static str> = page
            .required_keys()
            .iter()
            .copied()
            .filter(|key| !self.contains(key))
            .collect();

        if missing.is_empty() {
            Navigation::Proceed
        } else {
            tracing::debug!(?page, ?missing, "必要なセッションキーがありません");
            Navigation::RedirectToStart { missing }
        }
    }

    pub fn current_step(&self) -> WizardStep {
        if self.contains(keys::COUNTING_RESULTS) {
            WizardStep::Counted
        } else if self.guard(Page::Counting) == Navigation::Proceed {
            WizardStep::ModelChosen
        } else if self.guard(Page::ModelSelection) == Navigation::Proceed {
            WizardStep::Classified
        } else if self.contains(keys::ORIGINAL_IMAGES) {
            WizardStep::Uploaded
        } else {
            WizardStep::Start
        }
    }

    /// 前回の分類・カウント結果を削除（新しいアップロードの前に呼ぶ）
    pub fn clear_downstream(&mut self) -> Result<()> {
        for key in [
            keys::SCAFFOLD_FILES,
            keys::STEEL_FILES,
            keys::CLASSIFICATION_RESULTS,
            keys::SELECTED_COUNTING_MODEL,
            keys::COUNTING_RESULTS,
            keys::COUNTING_SOURCE,
        ] {
            self.store.remove(key)?;
        }
        Ok(())
    }

    /// 新しい分析: 言語設定以外をすべて削除
    pub fn clear_analysis(&mut self) -> Result<()> {
        for key in self.store.keys() {
            if key != keys::PREFERRED_LANGUAGE {
                self.store.remove(&key)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classified_session() -> Session<MemoryStore> {
        let mut session = Session::new(MemoryStore::new());
        session.set_original_images(&[]).unwrap();
        session.set_scaffold_files(&[]).unwrap();
        session.set_steel_files(&[]).unwrap();
        session.set_classification_results(&[]).unwrap();
        session
    }

    #[test]
    fn test_guard_redirects_when_keys_missing() {
        let session = Session::new(MemoryStore::new());
        match session.guard(Page::ModelSelection) {
            Navigation::RedirectToStart { missing } => assert_eq!(missing.len(), 3),
            Navigation::Proceed => panic!("should redirect"),
        }
        assert_eq!(session.guard(Page::Start), Navigation::Proceed);
    }

    #[test]
    fn test_guard_counting_requires_selected_model() {
        let mut session = classified_session();
        assert_eq!(session.guard(Page::ModelSelection), Navigation::Proceed);
        assert_eq!(
            session.guard(Page::Counting),
            Navigation::RedirectToStart {
                missing: vec![keys::SELECTED_COUNTING_MODEL]
            }
        );

        session.set_selected_model("ND Connector").unwrap();
        assert_eq!(session.guard(Page::Counting), Navigation::Proceed);
    }

    #[test]
    fn test_current_step_progression() {
        let mut session = Session::new(MemoryStore::new());
        assert_eq!(session.current_step(), WizardStep::Start);

        session.set_original_images(&[]).unwrap();
        assert_eq!(session.current_step(), WizardStep::Uploaded);

        let mut session = classified_session();
        assert_eq!(session.current_step(), WizardStep::Classified);

        session.set_selected_model("Roundpipes").unwrap();
        assert_eq!(session.current_step(), WizardStep::ModelChosen);

        session
            .set_counting_results(&CountingResponse::default(), CountingSource::Live)
            .unwrap();
        assert_eq!(session.current_step(), WizardStep::Counted);
    }

    #[test]
    fn test_clear_analysis_keeps_language() {
        let mut session = classified_session();
        session.set_language(Language::En).unwrap();
        session.set_camera_image("data:image/jpeg;base64,AA").unwrap();

        session.clear_analysis().unwrap();

        assert_eq!(session.store().keys(), vec![keys::PREFERRED_LANGUAGE.to_string()]);
        assert_eq!(session.language(), Some(Language::En));
    }

    #[test]
    fn test_clear_downstream_keeps_originals() {
        let mut session = classified_session();
        session.clear_downstream().unwrap();
        assert!(session.contains(keys::ORIGINAL_IMAGES));
        assert!(!session.contains(keys::CLASSIFICATION_RESULTS));
    }

    #[test]
    fn test_take_camera_image_removes_key() {
        let mut session = Session::new(MemoryStore::new());
        session.set_camera_image("data:image/jpeg;base64,AA").unwrap();
        assert!(session.take_camera_image().unwrap().is_some());
        assert!(session.take_camera_image().unwrap().is_none());
    }

    #[test]
    fn test_counting_source_roundtrip() {
        let mut session = Session::new(MemoryStore::new());
        session
            .set_counting_results(&CountingResponse::default(), CountingSource::Demo)
            .unwrap();
        assert_eq!(session.counting_source().unwrap(), Some(CountingSource::Demo));
        assert_eq!(session.store().get(keys::COUNTING_SOURCE).as_deref(), Some("\"demo\""));
    }
}
