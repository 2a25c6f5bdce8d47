use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScaffoldCountError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("フォルダが見つかりません: {0}")]
    FolderNotFound(String),

    #[error("画像が見つかりません: {0}")]
    NoImagesFound(String),

    #[error("同じファイル名の画像が複数あります: {0}")]
    DuplicateFileName(String),

    /// 上流（またはプロキシ）が非2xxを返した
    #[error("API呼び出しエラー: {message}")]
    ApiCall {
        status: Option<u16>,
        message: String,
    },

    #[error("通信エラー: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("セッションデータが不足しています。`scaffold-count upload` からやり直してください")]
    MissingSession,

    #[error("カウントモデルが選択されていません")]
    NoModelSelected,

    #[error("カウントAPI用の画像IDがありません")]
    NoImageIds,

    #[error("入力エラー: {0}")]
    Prompt(String),

    #[error("HTTPサーバーエラー: {0}")]
    Http(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] scaffold_count_common::Error),
}

impl ScaffoldCountError {
    pub fn api_call(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::ApiCall {
            status,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ScaffoldCountError>;
