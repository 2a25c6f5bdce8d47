//! 結果表示・エクスポート・新しい分析

use crate::error::{Result, ScaffoldCountError};
use crate::notify::Context;
use crate::session::{CountingSource, KeyValueStore, Navigation, Page, Session};
use rand::Rng;
use scaffold_count_common::{build_views, export_json, summarize, ResultSummary, ResultView};
use std::path::Path;

#[derive(Debug, Clone)]
pub struct ResultsReport {
    pub views: Vec<ResultView>,
    pub summary: ResultSummary,
    pub model_used: String,
    /// 保存された結果の出どころ（旧セッションでは不明）
    pub source: Option<CountingSource>,
}

impl ResultsReport {
    pub fn is_demo(&self) -> bool {
        self.source == Some(CountingSource::Demo)
    }
}

pub fn load_results<S, R>(session: &Session<S>, rng: &mut R) -> Result<ResultsReport>
where
    S: KeyValueStore,
    R: Rng,
{
    if let Navigation::RedirectToStart { missing } = session.guard(Page::Results) {
        tracing::debug!(?missing, "カウント結果がありません");
        return Err(ScaffoldCountError::MissingSession);
    }

    let counting = session
        .counting_results()?
        .ok_or(ScaffoldCountError::MissingSession)?;
    let steel_files = session.steel_files()?.unwrap_or_default();
    let originals = session.original_images()?.unwrap_or_default();

    let views = build_views(&counting, &steel_files, &originals, rng);
    let summary = summarize(&views);

    Ok(ResultsReport {
        views,
        summary,
        model_used: counting.model_used,
        source: session.counting_source()?,
    })
}

/// 表示中の結果をJSON配列で書き出す
pub fn export_results(report: &ResultsReport, ctx: &Context<'_>, path: &Path) -> Result<()> {
    let json = export_json(&report.views)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, json)?;
    tracing::info!(path = %path.display(), count = report.views.len(), "結果をエクスポート");
    ctx.success("results.exported", path.display().to_string());
    Ok(())
}

/// 言語設定以外のセッションを消去
pub fn new_analysis<S: KeyValueStore>(session: &mut Session<S>, ctx: &Context<'_>) -> Result<()> {
    session.clear_analysis()?;
    ctx.success("toast.new.analysis", ctx.t("toast.new.analysis.desc"));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::RecordingNotifier;
    use crate::session::MemoryStore;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use scaffold_count_common::{CountingResponse, CountingResult, Language};

    fn counted_session() -> Session<MemoryStore> {
        let mut session = Session::new(MemoryStore::new());
        let response = CountingResponse {
            success: true,
            total_images_processed: 2,
            total_count: 7,
            processing_time: 1.5,
            model_used: "ND Connector".to_string(),
            results: vec![
                CountingResult {
                    image_id: "s-1".to_string(),
                    filename: "a.jpg".to_string(),
                    count: 3,
                    annotated_image_base64: String::new(),
                },
                CountingResult {
                    image_id: "s-2".to_string(),
                    filename: "b.jpg".to_string(),
                    count: 4,
                    annotated_image_base64: String::new(),
                },
            ],
            extra: Default::default(),
        };
        session
            .set_counting_results(&response, CountingSource::Live)
            .unwrap();
        session
    }

    #[test]
    fn test_load_results_requires_counting() {
        let session = Session::new(MemoryStore::new());
        let mut rng = StdRng::seed_from_u64(1);
        assert!(matches!(
            load_results(&session, &mut rng),
            Err(ScaffoldCountError::MissingSession)
        ));
    }

    #[test]
    fn test_load_results_summary() {
        let session = counted_session();
        let mut rng = StdRng::seed_from_u64(1);
        let report = load_results(&session, &mut rng).unwrap();
        assert_eq!(report.views.len(), 2);
        assert_eq!(report.summary.total_objects, 7);
        assert_eq!(report.summary.images_analyzed, 2);
        assert!(!report.is_demo());
    }

    #[test]
    fn test_export_length_matches_views() {
        let session = counted_session();
        let mut rng = StdRng::seed_from_u64(2);
        let report = load_results(&session, &mut rng).unwrap();
        let notifier = RecordingNotifier::new();
        let ctx = Context::new(Language::En, &notifier);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("steel-count-results.json");

        export_results(&report, &ctx, &path).unwrap();

        let exported: Vec<serde_json::Value> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(exported.len(), report.views.len());
        assert_eq!(exported[0]["imageId"], "s-1");
        assert_eq!(notifier.toasts()[0].title, "Results exported");
    }

    #[test]
    fn test_new_analysis_clears_results() {
        let mut session = counted_session();
        let notifier = RecordingNotifier::new();
        let ctx = Context::new(Language::Ja, &notifier);
        new_analysis(&mut session, &ctx).unwrap();
        assert!(session.store().keys().is_empty());
        assert_eq!(notifier.toasts()[0].title, "新しい分析");
    }
}
