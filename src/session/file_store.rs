//! セッションファイル（JSON）
//!
//! ディレクトリ直下の `session.json` に全キーを保存する。
//! 変更のたびに全体を書き直す。

use super::KeyValueStore;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

const SESSION_FILE_NAME: &str = "session.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SessionFile {
    /// バージョン（互換性チェック用）
    version: u32,
    entries: BTreeMap<String, String>,
}

impl SessionFile {
    const CURRENT_VERSION: u32 = 1;
}

impl Default for SessionFile {
    fn default() -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            entries: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    file: SessionFile,
}

impl FileStore {
    /// セッションファイルを読み込み（存在しない・壊れている場合は空）
    pub fn open(dir: &Path) -> Self {
        let path = Self::file_path(dir);
        let file = Self::read(&path).unwrap_or_default();
        Self { path, file }
    }

    pub fn file_path(dir: &Path) -> PathBuf {
        dir.join(SESSION_FILE_NAME)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(path: &Path) -> Option<SessionFile> {
        if !path.exists() {
            return None;
        }

        let reader = BufReader::new(File::open(path).ok()?);
        match serde_json::from_reader::<_, SessionFile>(reader) {
            Ok(file) if file.version == SessionFile::CURRENT_VERSION => Some(file),
            Ok(file) => {
                tracing::warn!(version = file.version, "セッションファイルのバージョン不一致、破棄します");
                None
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "セッションファイルが壊れています、破棄します");
                None
            }
        }
    }

    fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let writer = BufWriter::new(File::create(&self.path)?);
        serde_json::to_writer_pretty(writer, &self.file)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.file.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        self.file.entries.insert(key.to_string(), value);
        self.save()
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        if self.file.entries.remove(key).is_some() {
            self.save()?;
        }
        Ok(())
    }

    fn keys(&self) -> Vec<String> {
        self.file.entries.keys().cloned().collect()
    }
}
