//! Scaffold Count Common Library
//!
//! プロキシサーバーとCLIウィザードで共有される型と処理（I/Oなし）

pub mod catalog;
pub mod data_url;
pub mod error;
pub mod i18n;
pub mod parser;
pub mod recommend;
pub mod synthetic;
pub mod types;
pub mod view;

pub use catalog::{available_models, fallback_models, CountingModel, ModelEntry, COUNTING_MODELS};
pub use error::{Error, Result};
pub use i18n::Language;
pub use recommend::{most_common_class, recommend};
pub use synthetic::synthetic_counting;
pub use types::{
    ClassificationResult, CountingResponse, CountingResult, OriginalImage, ScaffoldFile,
    SteelFile, SteelUpload,
};
pub use view::{build_views, export_json, summarize, ResultSummary, ResultView};
