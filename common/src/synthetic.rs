//! カウントAPI失敗時のデモ用カウント結果

use crate::types::{CountingResponse, CountingResult, SteelFile};
use rand::Rng;

pub const PLACEHOLDER_ANNOTATED_IMAGE: &str = "/placeholder.svg?height=400&width=600";

/// 画像1枚あたりのカウント範囲
pub const COUNT_RANGE: std::ops::RangeInclusive<u32> = 2..=16;

/// 合成したカウント結果を生成
///
/// `success` は常に true。画像1枚につき1件の結果を作る。
pub fn synthetic_counting<R: Rng>(
    steel_files: &[SteelFile],
    model: &str,
    rng: &mut R,
) -> CountingResponse {
    let results = steel_files
        .iter()
        .enumerate()
        .map(|(index, file)| CountingResult {
            image_id: file.image_id().to_string(),
            filename: if file.filename().is_empty() {
                format!("image_{}.jpg", index + 1)
            } else {
                file.filename().to_string()
            },
            count: rng.random_range(COUNT_RANGE),
            annotated_image_base64: PLACEHOLDER_ANNOTATED_IMAGE.to_string(),
        })
        .collect();

    CountingResponse {
        success: true,
        total_images_processed: steel_files.len(),
        total_count: rng.random_range(10..=59),
        processing_time: rng.random_range(1.0..4.0),
        model_used: model.to_string(),
        results,
        extra: Default::default(),
    }
}
