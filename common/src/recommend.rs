//! 推奨カウントモデルの判定
//!
//! 分類結果の `predicted_class_en` で多数決を取り、
//! 最多クラスに対応するモデルを推奨する。同数の場合は先に現れたクラスを優先。

use crate::catalog::{self, CountingModel};
use crate::types::ClassificationResult;
use indexmap::IndexMap;

/// 最も多く分類されたクラス（英語）
pub fn most_common_class(results: &[ClassificationResult]) -> Option<String> {
    let mut counts: IndexMap<&str, usize> = IndexMap::new();
    for class in results
        .iter()
        .map(|r| r.predicted_class_en.as_str())
        .filter(|c| !c.is_empty())
    {
        *counts.entry(class).or_default() += 1;
    }

    // max_by_keyは同数なら後勝ちなので、先勝ちになるよう自前で走査
    let mut best: Option<(&str, usize)> = None;
    for (class, count) in counts {
        if best.map_or(true, |(_, n)| count > n) {
            best = Some((class, count));
        }
    }
    best.map(|(class, _)| class.to_string())
}

/// 推奨モデルに印を付け、そのIDを返す
///
/// 最多クラスに一致するモデルがなければ先頭モデルを推奨する。
/// `models` が空なら何もせず `None`。
pub fn recommend(models: &mut [CountingModel], results: &[ClassificationResult]) -> Option<String> {
    if models.is_empty() {
        return None;
    }

    for model in models.iter_mut() {
        model.recommended = false;
    }

    let matched = most_common_class(results).and_then(|class| {
        let id = catalog::find_by_class(&class).map_or(class.as_str(), |entry| entry.id);
        models.iter().position(|m| m.id == id)
    });

    let index = matched.unwrap_or(0);
    models[index].recommended = true;
    Some(models[index].id.clone())
}
