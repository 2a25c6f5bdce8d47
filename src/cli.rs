use clap::{Parser, Subcommand};
use scaffold_count_common::Language;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "scaffold-count")]
#[command(about = "足場写真の分類・鋼材カウントツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// 表示言語 (ja/en)。指定するとセッションに保存
    #[arg(long, global = true)]
    pub lang: Option<Language>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 推論APIプロキシサーバーを起動
    Serve {
        /// 待受アドレス（省略時は設定値）
        #[arg(short, long)]
        listen: Option<String>,
    },

    /// 画像をアップロードして分類
    Upload {
        /// 画像フォルダまたは画像ファイル
        inputs: Vec<PathBuf>,
    },

    /// カウントモデルを選択
    Select {
        /// モデルID（省略時は対話選択、非対話なら推奨モデル）
        #[arg(short, long)]
        model: Option<String>,

        /// 対話せず推奨モデルを使う
        #[arg(short, long)]
        yes: bool,
    },

    /// 選択済みモデルでカウント
    Count,

    /// カウント結果を表示
    Results {
        /// JSONで書き出す（パス省略時は steel-count-results.json）
        #[arg(short, long, num_args = 0..=1, default_missing_value = scaffold_count_common::view::EXPORT_FILE_NAME)]
        export: Option<PathBuf>,
    },

    /// 新しい分析（言語設定以外のセッションを消去）
    Reset,

    /// アップロードから結果表示まで一括実行
    Run {
        /// 画像フォルダまたは画像ファイル
        inputs: Vec<PathBuf>,

        /// モデルID（省略時は推奨モデル）
        #[arg(short, long)]
        model: Option<String>,

        /// 結果のJSON出力先
        #[arg(short, long)]
        export: Option<PathBuf>,
    },

    /// 撮影画像を次回のアップロードに追加
    Camera {
        /// 画像ファイル
        #[arg(required = true)]
        image: PathBuf,
    },

    /// 利用可能なカウントモデルと推奨を表示
    Models,

    /// ウィザードの進行状況を表示
    Status,

    /// 設定を表示/編集
    Config {
        /// プロキシURLを設定
        #[arg(long)]
        set_proxy_url: Option<String>,

        /// 分類APIのURLを設定
        #[arg(long)]
        set_classifier_url: Option<String>,

        /// カウントAPIのURLを設定
        #[arg(long)]
        set_counter_url: Option<String>,

        /// 既定の表示言語を設定
        #[arg(long)]
        set_language: Option<Language>,

        /// カウントAPI失敗時のデモデータ (true/false)
        #[arg(long)]
        set_demo_fallback: Option<bool>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}
