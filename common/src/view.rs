//! 結果表示用のビューモデル
//!
//! カウント結果を元画像と突き合わせる。突き合わせは位置ではなくIDで行う:
//! `image_id` → SteelFile → `originalId` → OriginalImage。

use crate::error::Result;
use crate::synthetic::PLACEHOLDER_ANNOTATED_IMAGE;
use crate::types::{CountingResponse, OriginalImage, SteelFile};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const PLACEHOLDER_ORIGINAL_IMAGE: &str = "/placeholder.svg?height=400&width=600";

/// エクスポート時のデフォルトファイル名
pub const EXPORT_FILE_NAME: &str = "steel-count-results.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedObject {
    #[serde(rename = "type")]
    pub kind: String,
    pub count: u32,
    pub confidence: u8,
}

/// 画像1枚分の表示データ
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultView {
    pub original_image: String,
    pub processed_image: String,
    pub object_count: u32,
    /// 上流が返さないため表示用に生成した値（80〜99）
    pub confidence: u8,
    /// ミリ秒
    pub processing_time: f64,
    pub detected_objects: Vec<DetectedObject>,
    pub filename: String,
    pub image_id: String,
}

/// 集計
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultSummary {
    pub total_objects: u32,
    pub images_analyzed: usize,
    /// 秒
    pub total_time: f64,
}

/// カウント結果からビューモデルを組み立てる
pub fn build_views<R: Rng>(
    counting: &CountingResponse,
    steel_files: &[SteelFile],
    originals: &[OriginalImage],
    rng: &mut R,
) -> Vec<ResultView> {
    let original_by_id: HashMap<&str, &OriginalImage> =
        originals.iter().map(|o| (o.id.as_str(), o)).collect();
    let original_by_name: HashMap<&str, &OriginalImage> =
        originals.iter().map(|o| (o.name.as_str(), o)).collect();
    let original_id_by_image: HashMap<&str, &str> = steel_files
        .iter()
        .filter_map(|f| f.original_id.as_deref().map(|o| (f.image_id(), o)))
        .collect();

    let object_type = counting.model_used.to_lowercase();

    counting
        .results
        .iter()
        .map(|result| {
            let original = original_id_by_image
                .get(result.image_id.as_str())
                .and_then(|id| original_by_id.get(id))
                .or_else(|| original_by_name.get(result.filename.as_str()));

            let original_image = original
                .map(|o| o.data_url.clone())
                .unwrap_or_else(|| PLACEHOLDER_ORIGINAL_IMAGE.to_string());
            let processed_image = if result.annotated_image_base64.is_empty() {
                PLACEHOLDER_ANNOTATED_IMAGE.to_string()
            } else {
                result.annotated_image_base64.clone()
            };

            ResultView {
                original_image,
                processed_image,
                object_count: result.count,
                confidence: rng.random_range(80..=99),
                processing_time: counting.processing_time * 1000.0,
                detected_objects: vec![DetectedObject {
                    kind: object_type.clone(),
                    count: result.count,
                    confidence: rng.random_range(90..=99),
                }],
                filename: result.filename.clone(),
                image_id: result.image_id.clone(),
            }
        })
        .collect()
}

pub fn summarize(views: &[ResultView]) -> ResultSummary {
    ResultSummary {
        total_objects: views.iter().map(|v| v.object_count).sum(),
        images_analyzed: views.len(),
        total_time: views.iter().map(|v| v.processing_time).sum::<f64>() / 1000.0,
    }
}

/// エクスポート用JSON（整形済み配列）
pub fn export_json(views: &[ResultView]) -> Result<String> {
    Ok(serde_json::to_string_pretty(views)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CountingResult, SteelUpload};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn original(index: usize, name: &str) -> OriginalImage {
        OriginalImage {
            id: format!("original_{index}"),
            name: name.to_string(),
            size: 10,
            mime_type: "image/jpeg".to_string(),
            data_url: format!("data:image/jpeg;base64,{index}"),
        }
    }

    fn steel(image_id: &str, name: &str, original_id: Option<&str>) -> SteelFile {
        SteelFile {
            upload: SteelUpload {
                image_id: image_id.to_string(),
                filename: name.to_string(),
                preview: None,
            },
            original_id: original_id.map(str::to_string),
            display_url: String::new(),
        }
    }

    fn counting(results: Vec<(&str, &str, u32)>) -> CountingResponse {
        CountingResponse {
            success: true,
            total_images_processed: results.len(),
            total_count: results.iter().map(|r| r.2).sum(),
            processing_time: 1.5,
            model_used: "ND Connector".to_string(),
            results: results
                .into_iter()
                .map(|(id, name, count)| CountingResult {
                    image_id: id.to_string(),
                    filename: name.to_string(),
                    count,
                    annotated_image_base64: String::new(),
                })
                .collect(),
            extra: Default::default(),
        }
    }

    #[test]
    fn test_join_by_id_not_position() {
        let originals = vec![original(0, "a.jpg"), original(1, "b.jpg")];
        let steel_files = vec![
            steel("s-a", "a.jpg", Some("original_0")),
            steel("s-b", "b.jpg", Some("original_1")),
        ];
        // 上流が逆順で返しても正しい元画像に対応付く
        let response = counting(vec![("s-b", "b.jpg", 4), ("s-a", "a.jpg", 9)]);

        let views = build_views(&response, &steel_files, &originals, &mut StdRng::seed_from_u64(3));
        assert_eq!(views.len(), 2);
        assert_eq!(views[0].original_image, "data:image/jpeg;base64,1");
        assert_eq!(views[1].original_image, "data:image/jpeg;base64,0");
        assert_eq!(views[0].processed_image, PLACEHOLDER_ANNOTATED_IMAGE);
        assert_eq!(views[0].processing_time, 1500.0);
        assert_eq!(views[0].detected_objects[0].kind, "nd connector");
        assert!((80..=99).contains(&views[0].confidence));
        assert!((90..=99).contains(&views[0].detected_objects[0].confidence));
    }

    #[test]
    fn test_missing_original_uses_placeholder() {
        let response = counting(vec![("unknown", "zzz.jpg", 2)]);
        let views = build_views(&response, &[], &[], &mut StdRng::seed_from_u64(3));
        assert_eq!(views[0].original_image, PLACEHOLDER_ORIGINAL_IMAGE);
    }

    #[test]
    fn test_summary_and_export() {
        let originals = vec![original(0, "a.jpg")];
        let response = counting(vec![("s-a", "a.jpg", 5), ("s-b", "b.jpg", 7)]);
        let views = build_views(&response, &[], &originals, &mut StdRng::seed_from_u64(3));

        let summary = summarize(&views);
        assert_eq!(summary.total_objects, 12);
        assert_eq!(summary.images_analyzed, 2);
        assert!((summary.total_time - 3.0).abs() < 1e-9);

        let json = export_json(&views).unwrap();
        let parsed: Vec<serde_json::Value> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.len(), views.len());
        assert_eq!(parsed[0]["objectCount"], 5);
        assert_eq!(parsed[0]["originalImage"], "data:image/jpeg;base64,0");
    }
}
