//! カウントモデルの選択とカウント実行

use crate::api::{DetectRequest, InferenceApi};
use crate::error::{Result, ScaffoldCountError};
use crate::notify::Context;
use crate::session::{CountingSource, KeyValueStore, Navigation, Page, Session};
use rand::Rng;
use scaffold_count_common::{
    available_models, fallback_models, most_common_class, parser, recommend, synthetic_counting,
    CountingModel, CountingResponse,
};

/// モデル選択画面の内容
#[derive(Debug, Clone)]
pub struct ModelChoice {
    pub models: Vec<CountingModel>,
    pub recommended: Option<String>,
    /// 分類結果で最も多かったクラス
    pub most_common_class: Option<String>,
    /// 上記クラスの表示名（日本語表示なら `predicted_class_jp`）
    pub most_common_label: Option<String>,
    /// モデル一覧を取得できずフォールバック候補を使っている
    pub fallback: bool,
}

impl ModelChoice {
    pub fn find(&self, id: &str) -> Option<&CountingModel> {
        self.models.iter().find(|m| m.id == id)
    }

    pub fn recommended_index(&self) -> usize {
        self.models.iter().position(|m| m.recommended).unwrap_or(0)
    }
}

fn ensure_page<S: KeyValueStore>(session: &Session<S>, ctx: &Context<'_>, page: Page) -> Result<()> {
    match session.guard(page) {
        Navigation::Proceed => Ok(()),
        Navigation::RedirectToStart { missing } => {
            tracing::warn!(?page, ?missing, "セッションが不完全なため開始画面へ戻ります");
            if page == Page::ModelSelection {
                ctx.error("toast.missing.data", ctx.t("toast.missing.data.desc"));
            }
            Err(ScaffoldCountError::MissingSession)
        }
    }
}

/// 利用可能なモデルを取得して推奨を決める
pub async fn load_models<A, S>(api: &A, session: &Session<S>, ctx: &Context<'_>) -> Result<ModelChoice>
where
    A: InferenceApi + ?Sized,
    S: KeyValueStore,
{
    ensure_page(session, ctx, Page::ModelSelection)?;
    let results = session.classification_results()?.unwrap_or_default();

    ctx.progress("progress.loading.models");
    let fetched = match api.counting_models().await {
        Ok(body) => parser::parse_counting_models(body).map_err(ScaffoldCountError::from),
        Err(e) => Err(e),
    };
    ctx.notifier.finish();

    let (mut models, fallback) = match fetched {
        Ok(ids) => (available_models(&ids, ctx.language), false),
        Err(e) => {
            tracing::warn!(error = %e, "カウントモデル一覧の取得に失敗");
            ctx.error("toast.error.loading.models", ctx.t("toast.error.loading.models.desc"));
            (fallback_models(ctx.language), true)
        }
    };

    // フォールバック候補は先頭が推奨済み
    let recommended = if fallback {
        models.iter().find(|m| m.recommended).map(|m| m.id.clone())
    } else {
        recommend(&mut models, &results)
    };

    let top_class = most_common_class(&results);
    let most_common_label = top_class.as_deref().and_then(|class| {
        results
            .iter()
            .find(|r| r.predicted_class_en == class)
            .map(|r| r.label(ctx.language).to_string())
    });

    Ok(ModelChoice {
        models,
        recommended,
        most_common_class: top_class,
        most_common_label,
        fallback,
    })
}

/// モデルを確定して保存
///
/// `requested` が無ければ推奨モデルを使う。
pub fn select_model<S: KeyValueStore>(
    session: &mut Session<S>,
    ctx: &Context<'_>,
    choice: &ModelChoice,
    requested: Option<&str>,
) -> Result<String> {
    let id = requested
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .or_else(|| choice.recommended.clone());

    let Some(model) = id.as_deref().and_then(|id| choice.find(id)) else {
        tracing::warn!(requested = ?requested, "モデルが選択されていません");
        ctx.error("toast.no.model.selected", ctx.t("toast.no.model.selected.desc"));
        return Err(ScaffoldCountError::NoModelSelected);
    };

    session.set_selected_model(&model.id)?;
    tracing::info!(model = %model.id, "カウントモデルを選択");
    ctx.success(
        "toast.model.selected",
        ctx.language
            .format("toast.model.selected.desc", &[("model", model.display_name.as_str())]),
    );
    Ok(model.id.clone())
}

/// 保存済みのモデルでカウントを実行
///
/// API失敗時、`demo_fallback` が有効ならデモ用の合成結果を保存して続行する。
pub async fn count<A, S, R>(
    api: &A,
    session: &mut Session<S>,
    ctx: &Context<'_>,
    demo_fallback: bool,
    rng: &mut R,
) -> Result<CountingResponse>
where
    A: InferenceApi + ?Sized,
    S: KeyValueStore,
    R: Rng,
{
    ensure_page(session, ctx, Page::Counting)?;

    let steel_files = session.steel_files()?.unwrap_or_default();
    let model = session
        .selected_model()
        .filter(|m| !m.is_empty())
        .ok_or(ScaffoldCountError::NoModelSelected)?;

    let image_ids: Vec<String> = steel_files
        .iter()
        .map(|f| f.image_id().to_string())
        .filter(|id| !id.is_empty())
        .collect();
    if image_ids.is_empty() {
        ctx.error("toast.no.images", ctx.t("toast.no.images.desc"));
        return Err(ScaffoldCountError::NoImageIds);
    }

    ctx.progress("progress.counting");
    tracing::info!(model = %model, images = image_ids.len(), "カウント開始");
    let request = DetectRequest::new(image_ids, model.clone());
    let outcome = match api.detect(&request).await {
        Ok(body) => parser::parse_counting(body).map_err(ScaffoldCountError::from),
        Err(e) => Err(e),
    };
    ctx.notifier.finish();

    match outcome {
        Ok(response) => {
            session.set_counting_results(&response, CountingSource::Live)?;
            ctx.success(
                "toast.counting.complete",
                ctx.language.format(
                    "toast.counting.complete.desc",
                    &[
                        ("count", response.total_count.to_string().as_str()),
                        ("images", response.total_images_processed.to_string().as_str()),
                    ],
                ),
            );
            Ok(response)
        }
        Err(e) if demo_fallback => {
            tracing::warn!(error = %e, "カウントAPIに失敗したためデモデータで続行");
            let response = synthetic_counting(&steel_files, &model, rng);
            session.set_counting_results(&response, CountingSource::Demo)?;
            ctx.success(
                "toast.counting.complete.demo",
                ctx.language
                    .format("toast.counting.demo.desc", &[("error", e.to_string().as_str())]),
            );
            Ok(response)
        }
        Err(e) => {
            tracing::error!(error = %e, "カウントに失敗");
            ctx.error("toast.process.failed", e.to_string());
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scaffold_count_common::catalog;
    use scaffold_count_common::Language;

    fn choice() -> ModelChoice {
        let mut models = catalog::available_models(
            &["ND Connector".to_string(), "Roundpipes".to_string()],
            Language::En,
        );
        models[1].recommended = true;
        ModelChoice {
            recommended: Some("Roundpipes".to_string()),
            models,
            most_common_class: Some("Roundpipes".to_string()),
            most_common_label: Some("丸パイプ".to_string()),
            fallback: false,
        }
    }

    #[test]
    fn test_recommended_index() {
        assert_eq!(choice().recommended_index(), 1);
        assert!(choice().find("ND Connector").is_some());
        assert!(choice().find("Unknown").is_none());
    }
}
