//! ウィザードの各ステップ
//!
//! アップロード → 分類 → モデル選択 → カウント → 結果

pub mod counting;
pub mod results;
pub mod upload;

pub use counting::{count, load_models, select_model, ModelChoice};
pub use results::{export_results, load_results, new_analysis, ResultsReport};
pub use upload::{stage_camera_image, upload_and_classify, UploadOutcome};
