//! エラー型定義

use thiserror::Error;

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// 上流APIのレスポンスが文書化されたスキーマと一致しない
    #[error("Schema error ({endpoint}): {message}")]
    Schema {
        endpoint: &'static str,
        message: String,
    },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Data URL error: {0}")]
    DataUrl(String),
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_io() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error = Error::Io(io_error);
        let display = format!("{}", error);
        assert!(display.contains("IO error"));
        assert!(display.contains("file not found"));
    }

    #[test]
    fn test_error_display_schema() {
        let error = Error::Schema {
            endpoint: "steel/upload",
            message: "missing field `images`".to_string(),
        };
        let display = format!("{}", error);
        assert_eq!(display, "Schema error (steel/upload): missing field `images`");
    }

    #[test]
    fn test_error_from_json() {
        let json_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error: Error = json_error.into();
        assert!(matches!(error, Error::Json(_)));
    }

    #[test]
    fn test_error_debug() {
        let error = Error::DataUrl("カンマがありません".to_string());
        let debug = format!("{:?}", error);
        assert!(debug.contains("DataUrl"));
        assert!(debug.contains("カンマがありません"));
    }
}
