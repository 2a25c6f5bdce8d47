//! Data URL の生成と分解
//!
//! `data:image/jpeg;base64,/9j/4AAQ...` 形式のみ扱う。

use crate::error::{Error, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// バイト列からData URLを生成
pub fn encode(mime_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime_type, STANDARD.encode(bytes))
}

/// Data URLからMIMEタイプを抽出（取れなければ image/jpeg）
pub fn mime_type(data_url: &str) -> &str {
    data_url
        .strip_prefix("data:")
        .and_then(|rest| rest.split([';', ',']).next())
        .filter(|m| !m.is_empty())
        .unwrap_or("image/jpeg")
}

/// Data URLをデコードして (MIMEタイプ, バイト列) を返す
pub fn decode(data_url: &str) -> Result<(String, Vec<u8>)> {
    let rest = data_url
        .strip_prefix("data:")
        .ok_or_else(|| Error::DataUrl("data: で始まっていません".into()))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| Error::DataUrl("カンマがありません".into()))?;
    if !header.ends_with(";base64") {
        return Err(Error::DataUrl("base64以外のエンコードは未対応です".into()));
    }
    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|e| Error::DataUrl(e.to_string()))?;
    Ok((mime_type(data_url).to_string(), bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_then_decode() {
        let url = encode("image/png", b"\x89PNG");
        assert!(url.starts_with("data:image/png;base64,"));
        let (mime, bytes) = decode(&url).unwrap();
        assert_eq!(mime, "image/png");
        assert_eq!(bytes, b"\x89PNG");
    }

    #[test]
    fn test_mime_type_default() {
        assert_eq!(mime_type("data:image/webp;base64,AAAA"), "image/webp");
        assert_eq!(mime_type("not a data url"), "image/jpeg");
    }

    #[test]
    fn test_decode_rejects_invalid() {
        assert!(decode("/placeholder.svg").is_err());
        assert!(decode("data:image/png;base64").is_err());
        assert!(decode("data:text/plain,hello").is_err());
        assert!(decode("data:image/png;base64,!!!").is_err());
    }
}
