use crate::error::{Result, ScaffoldCountError};
use scaffold_count_common::Language;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CLASSIFIER_URL: &str =
    "https://scaffold-classifier-app.purpledesert-bb804eea.japaneast.azurecontainerapps.io";
pub const DEFAULT_COUNTER_URL: &str =
    "https://steel-count-app-new.salmonstone-3d570dc6.eastus.azurecontainerapps.io";

const ENV_PROXY_URL: &str = "SCAFFOLD_COUNT_PROXY_URL";
const ENV_CLASSIFIER_URL: &str = "SCAFFOLD_CLASSIFIER_URL";
const ENV_COUNTER_URL: &str = "SCAFFOLD_COUNTER_URL";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// ウィザードが呼び出すプロキシのURL
    pub proxy_url: String,
    /// プロキシサーバーの待受アドレス
    pub listen: String,
    /// 分類API（足場）
    pub classifier_url: String,
    /// カウントAPI（鉄骨）
    pub counter_url: String,
    /// セッション保存先（省略時は設定ディレクトリ配下）
    pub session_dir: Option<PathBuf>,
    pub language: Language,
    /// カウントAPI失敗時にデモデータで続行するか
    pub demo_fallback: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            proxy_url: "http://127.0.0.1:3000".into(),
            listen: "127.0.0.1:3000".into(),
            classifier_url: DEFAULT_CLASSIFIER_URL.into(),
            counter_url: DEFAULT_COUNTER_URL.into(),
            session_dir: None,
            language: Language::Ja,
            demo_fallback: true,
        }
    }
}

impl Config {
    /// 設定ファイルに環境変数の上書きを適用した実行時の設定
    pub fn load() -> Result<Self> {
        Ok(Self::load_file()?.with_env_overrides())
    }

    /// 設定ファイルの内容のみ（`config --set-*` の保存はこちらを元にする）
    pub fn load_file() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_dir() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| ScaffoldCountError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("scaffold-count"))
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    pub fn session_dir(&self) -> Result<PathBuf> {
        match &self.session_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(Self::config_dir()?.join("session")),
        }
    }

    /// 環境変数を優先
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup(ENV_PROXY_URL) {
            self.proxy_url = url;
        }
        if let Some(url) = lookup(ENV_CLASSIFIER_URL) {
            self.classifier_url = url;
        }
        if let Some(url) = lookup(ENV_COUNTER_URL) {
            self.counter_url = url;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.proxy_url, "http://127.0.0.1:3000");
        assert_eq!(config.language, Language::Ja);
        assert!(config.demo_fallback);
        assert!(config.counter_url.starts_with("https://steel-count-app-new"));
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: Config = serde_json::from_str(r#"{"language": "en", "demo_fallback": false}"#).unwrap();
        assert_eq!(config.language, Language::En);
        assert!(!config.demo_fallback);
        assert_eq!(config.listen, "127.0.0.1:3000");
        assert_eq!(config.classifier_url, DEFAULT_CLASSIFIER_URL);
    }

    #[test]
    fn test_env_override_not_persisted() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("config.json");

        let stored = Config::load_from(&path).unwrap();
        let effective = stored.clone().with_overrides(|key| {
            (key == ENV_COUNTER_URL).then(|| "http://temporary-override".to_string())
        });
        assert_eq!(effective.counter_url, "http://temporary-override");

        let mut stored = stored;
        stored.demo_fallback = false;
        stored.save_to(&path).unwrap();

        let reloaded = Config::load_from(&path).unwrap();
        assert_eq!(reloaded.counter_url, DEFAULT_COUNTER_URL);
        assert!(!reloaded.demo_fallback);
    }
}
