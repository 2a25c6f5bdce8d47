use crate::error::{Result, ScaffoldCountError};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInfo {
    pub path: PathBuf,
    pub file_name: String,
    pub mime_type: String,
}

const IMAGE_EXTENSIONS: &[(&str, &str)] = &[
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
    ("gif", "image/gif"),
    ("webp", "image/webp"),
    ("bmp", "image/bmp"),
];

/// 拡張子からMIMEタイプ（大文字小文字を区別しない）
pub fn mime_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_string_lossy().to_lowercase();
    IMAGE_EXTENSIONS
        .iter()
        .find(|(e, _)| *e == ext)
        .map(|(_, mime)| *mime)
}

fn image_info(path: &Path, mime_type: &str) -> ImageInfo {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    ImageInfo {
        path: path.to_path_buf(),
        file_name,
        mime_type: mime_type.to_string(),
    }
}

pub fn scan_folder(folder: &Path) -> Result<Vec<ImageInfo>> {
    if !folder.is_dir() {
        return Err(ScaffoldCountError::FolderNotFound(folder.display().to_string()));
    }

    let mut images: Vec<ImageInfo> = WalkDir::new(folder)
        .max_depth(1) // 直下のみ（再帰しない）
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| mime_for_path(e.path()).map(|mime| image_info(e.path(), mime)))
        .collect();

    // ファイル名でソート
    images.sort_by(|a, b| a.file_name.cmp(&b.file_name));

    tracing::debug!(folder = %folder.display(), count = images.len(), "フォルダをスキャン");
    Ok(images)
}

/// 明示指定のファイル（画像拡張子でないものはエラー）
pub fn scan_file(path: &Path) -> Result<ImageInfo> {
    if !path.is_file() {
        return Err(ScaffoldCountError::FileNotFound(path.display().to_string()));
    }
    let mime = mime_for_path(path).ok_or_else(|| {
        ScaffoldCountError::NoImagesFound(format!("画像ファイルではありません: {}", path.display()))
    })?;
    Ok(image_info(path, mime))
}

/// フォルダ・ファイルの混在指定をまとめる（指定順、フォルダ内はファイル名順）
pub fn collect_images(inputs: &[PathBuf]) -> Result<Vec<ImageInfo>> {
    let mut images = Vec::new();
    for input in inputs {
        if input.is_dir() {
            images.extend(scan_folder(input)?);
        } else {
            images.push(scan_file(input)?);
        }
    }
    Ok(images)
}

/// 同名ファイルの検出（結合キーがファイル名のため）
pub fn ensure_unique_names<'a>(names: impl IntoIterator<Item = &'a str>) -> Result<()> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name) {
            return Err(ScaffoldCountError::DuplicateFileName(name.to_string()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use std::io::Write;

    #[test]
    fn test_mime_for_path() {
        assert_eq!(mime_for_path(Path::new("a.jpg")), Some("image/jpeg"));
        assert_eq!(mime_for_path(Path::new("a.JPEG")), Some("image/jpeg"));
        assert_eq!(mime_for_path(Path::new("a.PNG")), Some("image/png"));
        assert_eq!(mime_for_path(Path::new("a.webp")), Some("image/webp"));
        assert_eq!(mime_for_path(Path::new("a.txt")), None);
        assert_eq!(mime_for_path(Path::new("noext")), None);
    }

    #[test]
    fn test_scan_folder_not_found() {
        let result = scan_folder(Path::new("/nonexistent/folder"));
        assert!(matches!(result, Err(ScaffoldCountError::FolderNotFound(_))));
    }

    #[test]
    fn test_scan_folder_empty() {
        let temp_dir = tempfile::tempdir().unwrap();
        let result = scan_folder(temp_dir.path()).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_scan_folder_with_images() {
        let temp_dir = tempfile::tempdir().unwrap();
        let dir = temp_dir.path();

        File::create(dir.join("site2.JPG")).unwrap().write_all(b"dummy").unwrap();
        File::create(dir.join("site1.jpg")).unwrap().write_all(b"dummy").unwrap();
        File::create(dir.join("site3.png")).unwrap().write_all(b"dummy").unwrap();
        File::create(dir.join("readme.txt")).unwrap().write_all(b"text").unwrap();
        fs::create_dir(dir.join("nested")).unwrap();
        File::create(dir.join("nested").join("deep.jpg")).unwrap();

        let result = scan_folder(dir).unwrap();
        let names: Vec<_> = result.iter().map(|i| i.file_name.as_str()).collect();
        assert_eq!(names, vec!["site1.jpg", "site2.JPG", "site3.png"]);
        assert_eq!(result[2].mime_type, "image/png");
    }

    #[test]
    fn test_collect_images_mixed_inputs() {
        let temp_dir = tempfile::tempdir().unwrap();
        let dir = temp_dir.path();
        let folder = dir.join("photos");
        fs::create_dir(&folder).unwrap();
        File::create(folder.join("b.jpg")).unwrap();
        File::create(folder.join("a.jpg")).unwrap();
        let single = dir.join("extra.png");
        File::create(&single).unwrap();

        let result = collect_images(&[single.clone(), folder]).unwrap();
        let names: Vec<_> = result.iter().map(|i| i.file_name.as_str()).collect();
        assert_eq!(names, vec!["extra.png", "a.jpg", "b.jpg"]);
    }

    #[test]
    fn test_scan_file_missing() {
        let result = scan_file(Path::new("/nonexistent/photo.jpg"));
        assert!(matches!(result, Err(ScaffoldCountError::FileNotFound(_))));
    }

    #[test]
    fn test_ensure_unique_names() {
        assert!(ensure_unique_names(["a.jpg", "b.jpg"]).is_ok());
        let err = ensure_unique_names(["a.jpg", "b.jpg", "a.jpg"]).unwrap_err();
        assert!(matches!(err, ScaffoldCountError::DuplicateFileName(name) if name == "a.jpg"));
    }
}
