//! アップロード〜分類
//!
//! 1. 元画像をData URL化して `originalImages` に保存
//! 2. 分類API（足場）へアップロード
//! 3. カウントAPI（鉄骨）へ同じ画像を同じ順でアップロード
//! 4. 分類モデル一覧を取得し先頭を使用
//! 5. 分類
//! 6. 鉄骨アップロード結果を元画像とファイル名で対応付け
//! 7. 保存

use crate::api::{ImageUpload, InferenceApi};
use crate::error::{Result, ScaffoldCountError};
use crate::notify::Context;
use crate::scanner::{self, ImageInfo};
use crate::session::{KeyValueStore, Session};
use futures::future::try_join_all;
use scaffold_count_common::{
    data_url, parser, ClassificationResult, OriginalImage, ScaffoldFile, SteelFile, SteelUpload,
};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub const PLACEHOLDER_DISPLAY_URL: &str = "/placeholder.svg";

#[derive(Debug, Clone)]
pub struct UploadOutcome {
    pub original_images: Vec<OriginalImage>,
    pub scaffold_files: Vec<ScaffoldFile>,
    pub steel_files: Vec<SteelFile>,
    pub classification_results: Vec<ClassificationResult>,
    pub classification_model: String,
    /// いずれかのAPIが空の結果を返した
    pub partial: bool,
}

async fn read_image(info: &ImageInfo) -> Result<ImageUpload> {
    let bytes = tokio::fs::read(&info.path).await?;
    Ok(ImageUpload {
        file_name: info.file_name.clone(),
        mime_type: info.mime_type.clone(),
        bytes,
    })
}

fn camera_upload(data_url: &str) -> Result<ImageUpload> {
    let (mime_type, bytes) = data_url::decode(data_url)?;
    Ok(ImageUpload {
        file_name: format!("camera-{}.jpg", chrono::Local::now().timestamp_millis()),
        mime_type,
        bytes,
    })
}

/// 入力パスと撮影画像から送信する画像一覧を作る
pub async fn prepare_images<S: KeyValueStore>(
    session: &mut Session<S>,
    inputs: &[PathBuf],
) -> Result<Vec<ImageUpload>> {
    let infos = scanner::collect_images(inputs)?;
    let mut uploads = try_join_all(infos.iter().map(|info| read_image(info))).await?;

    if let Some(camera) = session.take_camera_image()? {
        uploads.push(camera_upload(&camera)?);
    }

    if uploads.is_empty() {
        let target = inputs
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(", ");
        return Err(ScaffoldCountError::NoImagesFound(target));
    }
    scanner::ensure_unique_names(uploads.iter().map(|u| u.file_name.as_str()))?;

    Ok(uploads)
}

pub fn original_images(uploads: &[ImageUpload]) -> Vec<OriginalImage> {
    uploads
        .iter()
        .enumerate()
        .map(|(index, upload)| OriginalImage {
            id: format!("original_{}", index),
            name: upload.file_name.clone(),
            size: upload.bytes.len() as u64,
            mime_type: upload.mime_type.clone(),
            data_url: data_url::encode(&upload.mime_type, &upload.bytes),
        })
        .collect()
}

/// 鉄骨アップロード結果に元画像を対応付ける（ファイル名で結合）
pub fn merge_steel_files(uploads: Vec<SteelUpload>, originals: &[OriginalImage]) -> Vec<SteelFile> {
    let by_name: HashMap<&str, &OriginalImage> =
        originals.iter().map(|o| (o.name.as_str(), o)).collect();

    uploads
        .into_iter()
        .map(|upload| {
            let original = by_name.get(upload.filename.as_str());
            let display_url = upload
                .preview
                .clone()
                .filter(|p| !p.is_empty())
                .or_else(|| original.map(|o| o.data_url.clone()))
                .unwrap_or_else(|| PLACEHOLDER_DISPLAY_URL.to_string());
            SteelFile {
                original_id: original.map(|o| o.id.clone()),
                display_url,
                upload,
            }
        })
        .collect()
}

/// アップロードから分類結果の保存まで
///
/// 途中で失敗した場合は通知を出してエラーを返す（保存済みのキーは戻さない）。
pub async fn upload_and_classify<A, S>(
    api: &A,
    session: &mut Session<S>,
    ctx: &Context<'_>,
    inputs: &[PathBuf],
) -> Result<UploadOutcome>
where
    A: InferenceApi + ?Sized,
    S: KeyValueStore,
{
    let result = run_pipeline(api, session, ctx, inputs).await;
    ctx.notifier.finish();

    if let Err(e) = &result {
        tracing::error!(error = %e, "アップロード処理に失敗");
        ctx.error("toast.process.failed", e.to_string());
    }
    result
}

async fn run_pipeline<A, S>(
    api: &A,
    session: &mut Session<S>,
    ctx: &Context<'_>,
    inputs: &[PathBuf],
) -> Result<UploadOutcome>
where
    A: InferenceApi + ?Sized,
    S: KeyValueStore,
{
    ctx.progress("progress.preparing");
    let uploads = prepare_images(session, inputs).await?;
    tracing::info!(count = uploads.len(), "画像を準備");

    session.clear_downstream()?;

    ctx.progress("progress.storing");
    let originals = original_images(&uploads);
    session.set_original_images(&originals)?;

    ctx.progress("progress.uploading.scaffold");
    let scaffold_files = parser::parse_scaffold_upload(api.upload_scaffold(&uploads).await?)?;

    ctx.progress("progress.uploading.steel");
    let steel_uploads = parser::parse_steel_upload(api.upload_steel(&uploads).await?)?;
    ctx.success("toast.upload.successful", ctx.t("toast.upload.successful.desc"));

    ctx.progress("progress.getting.models");
    let models = parser::parse_classification_models(api.classification_models().await?)?;
    let classification_model = parser::default_classification_model(&models);

    ctx.progress("progress.classifying");
    let image_ids = scaffold_files
        .iter()
        .map(|f| f.file_id.as_str())
        .collect::<Vec<_>>()
        .join(",");
    let classification_results =
        parser::parse_classification(api.classify(&image_ids, &classification_model).await?)?;

    ctx.progress("progress.saving");
    let steel_files = merge_steel_files(steel_uploads, &originals);
    session.set_scaffold_files(&scaffold_files)?;
    session.set_steel_files(&steel_files)?;
    session.set_classification_results(&classification_results)?;

    let partial =
        scaffold_files.is_empty() || steel_files.is_empty() || classification_results.is_empty();
    tracing::info!(
        scaffold = scaffold_files.len(),
        steel = steel_files.len(),
        classified = classification_results.len(),
        model = %classification_model,
        "分類完了"
    );

    ctx.notifier.finish();
    if partial {
        ctx.error("toast.partial.success", ctx.t("toast.partial.success.desc"));
    } else {
        ctx.success(
            "toast.classification.complete",
            ctx.t("toast.classification.complete.desc"),
        );
    }

    Ok(UploadOutcome {
        original_images: originals,
        scaffold_files,
        steel_files,
        classification_results,
        classification_model,
        partial,
    })
}

/// 撮影画像を次回アップロード用に保存（`cameraImage`）
pub fn stage_camera_image<S: KeyValueStore>(
    session: &mut Session<S>,
    ctx: &Context<'_>,
    path: &Path,
) -> Result<()> {
    let info = scanner::scan_file(path)?;
    let bytes = std::fs::read(&info.path)?;
    session.set_camera_image(&data_url::encode(&info.mime_type, &bytes))?;
    ctx.success("toast.photo.captured", ctx.t("toast.photo.captured.desc"));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(name: &str, bytes: &[u8]) -> ImageUpload {
        ImageUpload {
            file_name: name.to_string(),
            mime_type: "image/jpeg".to_string(),
            bytes: bytes.to_vec(),
        }
    }

    fn steel(image_id: &str, filename: &str, preview: Option<&str>) -> SteelUpload {
        SteelUpload {
            image_id: image_id.to_string(),
            filename: filename.to_string(),
            preview: preview.map(str::to_string),
        }
    }

    #[test]
    fn test_original_images_ids_follow_order() {
        let originals = original_images(&[upload("a.jpg", b"abc"), upload("b.jpg", b"de")]);
        assert_eq!(originals[0].id, "original_0");
        assert_eq!(originals[1].id, "original_1");
        assert_eq!(originals[1].size, 2);
        assert!(originals[0].data_url.starts_with("data:image/jpeg;base64,"));
    }

    #[test]
    fn test_merge_joins_by_filename_not_position() {
        let originals = original_images(&[upload("a.jpg", b"a"), upload("b.jpg", b"b")]);
        // 上流が逆順で返しても対応が崩れない
        let merged = merge_steel_files(
            vec![steel("s-b", "b.jpg", None), steel("s-a", "a.jpg", None)],
            &originals,
        );
        assert_eq!(merged[0].original_id.as_deref(), Some("original_1"));
        assert_eq!(merged[1].original_id.as_deref(), Some("original_0"));
        assert_eq!(merged[0].display_url, originals[1].data_url);
    }

    #[test]
    fn test_merge_display_url_priority() {
        let originals = original_images(&[upload("a.jpg", b"a")]);
        let merged = merge_steel_files(
            vec![
                steel("s-1", "a.jpg", Some("https://preview/1")),
                steel("s-2", "unknown.jpg", None),
            ],
            &originals,
        );
        assert_eq!(merged[0].display_url, "https://preview/1");
        assert_eq!(merged[1].display_url, PLACEHOLDER_DISPLAY_URL);
        assert_eq!(merged[1].original_id, None);
    }

    #[test]
    fn test_camera_upload_name_and_type() {
        let url = data_url::encode("image/png", b"png-bytes");
        let upload = camera_upload(&url).unwrap();
        assert!(upload.file_name.starts_with("camera-"));
        assert!(upload.file_name.ends_with(".jpg"));
        assert_eq!(upload.mime_type, "image/png");
        assert_eq!(upload.bytes, b"png-bytes");
    }
}
