use clap::Parser;
use scaffold_count::{api, cli, config, error, notify, proxy, session, workflow};
use api::HttpApi;
use cli::{Cli, Commands};
use config::Config;
use error::{Result, ScaffoldCountError};
use notify::{ConsoleNotifier, Context};
use scaffold_count_common::{catalog, Language};
use session::{FileStore, Session};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use workflow::{ModelChoice, ResultsReport};

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "scaffold_count=debug,scaffold_count_common=debug,tower_http=debug"
    } else {
        "scaffold_count=info,tower_http=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// フラグ > 保存済み > 設定ファイル の順
fn resolve_language(cli_lang: Option<Language>, session: &mut Session<FileStore>, config: &Config) -> Result<Language> {
    if let Some(language) = cli_lang {
        session.set_language(language)?;
        return Ok(language);
    }
    Ok(session.language().unwrap_or(config.language))
}

fn prompt_model(choice: &ModelChoice, ctx: &Context<'_>) -> Result<Option<String>> {
    let items: Vec<String> = choice
        .models
        .iter()
        .map(|m| {
            if m.recommended {
                format!("{} ({}) ★ {}", m.display_name, m.id, ctx.t("model.recommended"))
            } else {
                format!("{} ({})", m.display_name, m.id)
            }
        })
        .collect();

    let selected = dialoguer::Select::new()
        .with_prompt(ctx.t("model.select.prompt"))
        .items(&items)
        .default(choice.recommended_index())
        .interact_opt()
        .map_err(|e| ScaffoldCountError::Prompt(e.to_string()))?;

    Ok(selected.and_then(|i| choice.models.get(i)).map(|m| m.id.clone()))
}

fn print_models(choice: &ModelChoice, ctx: &Context<'_>) {
    if let Some(label) = choice.most_common_label.as_ref().or(choice.most_common_class.as_ref()) {
        println!("{}: {}\n", ctx.t("model.most.classified"), label);
    }
    for model in &choice.models {
        let mark = if model.recommended { "★" } else { " " };
        println!("{} {} ({})", mark, model.display_name, model.id);
        println!("    {}", model.description);
    }
}

fn print_results(report: &ResultsReport, ctx: &Context<'_>) {
    println!("{} - {}\n", ctx.t("results.title"), catalog::display_name(&report.model_used, ctx.language));
    if report.is_demo() {
        println!("⚠ {}\n", ctx.t("results.demo.notice"));
    }

    for view in &report.views {
        println!(
            "  {} : {} {} ({}%)",
            view.filename,
            view.object_count,
            ctx.t("results.found"),
            view.confidence
        );
    }

    println!();
    println!("  {}: {}", ctx.t("results.total.objects"), report.summary.total_objects);
    println!("  {}: {}", ctx.t("results.images.analyzed"), report.summary.images_analyzed);
    println!("  {}: {:.1}s", ctx.t("results.total.time"), report.summary.total_time);
}

async fn choose_and_save(
    api: &HttpApi,
    session: &mut Session<FileStore>,
    ctx: &Context<'_>,
    model: Option<String>,
    interactive: bool,
) -> Result<String> {
    let choice = workflow::load_models(api, session, ctx).await?;
    let requested = match model {
        Some(model) => Some(model),
        None if interactive && std::io::stdin().is_terminal() => prompt_model(&choice, ctx)?,
        None => None,
    };
    workflow::select_model(session, ctx, &choice, requested.as_deref())
}

fn show_results(session: &Session<FileStore>, ctx: &Context<'_>, export: Option<&Path>) -> Result<()> {
    let report = workflow::load_results(session, &mut rand::rng())?;
    print_results(&report, ctx);
    if let Some(path) = export {
        workflow::export_results(&report, ctx, path)?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = Config::load()?;

    if let Commands::Serve { listen } = &cli.command {
        if let Some(listen) = listen {
            config.listen = listen.clone();
        }
        println!("🛰 scaffold-count - プロキシ ({})\n", config.listen);
        return proxy::serve(&config).await;
    }

    let mut session = Session::new(FileStore::open(&config.session_dir()?));
    let language = resolve_language(cli.lang, &mut session, &config)?;
    let notifier = ConsoleNotifier::new();
    let ctx = Context::new(language, &notifier);
    let api = HttpApi::new(config.proxy_url.clone());

    match cli.command {
        Commands::Serve { .. } => {}

        Commands::Upload { inputs } => {
            println!("📸 scaffold-count - アップロード\n");
            let outcome = workflow::upload_and_classify(&api, &mut session, &ctx, &inputs).await?;
            println!(
                "\n✔ {}枚をアップロード、{}件を分類 (モデル: {})",
                outcome.original_images.len(),
                outcome.classification_results.len(),
                outcome.classification_model
            );
            println!("次: scaffold-count select");
        }

        Commands::Select { model, yes } => {
            let id = choose_and_save(&api, &mut session, &ctx, model, !yes).await?;
            println!("\n✔ {}", catalog::display_name(&id, language));
            println!("次: scaffold-count count");
        }

        Commands::Count => {
            let response =
                workflow::count(&api, &mut session, &ctx, config.demo_fallback, &mut rand::rng()).await?;
            println!("\n✔ {} ({})", response.total_count, response.model_used);
            println!("次: scaffold-count results");
        }

        Commands::Results { export } => {
            show_results(&session, &ctx, export.as_deref())?;
        }

        Commands::Reset => {
            workflow::new_analysis(&mut session, &ctx)?;
        }

        Commands::Run { inputs, model, export } => {
            println!("🚀 scaffold-count - 一括処理\n");

            println!("[1/4] アップロード・分類");
            workflow::upload_and_classify(&api, &mut session, &ctx, &inputs).await?;

            println!("\n[2/4] モデル選択");
            choose_and_save(&api, &mut session, &ctx, model, false).await?;

            println!("\n[3/4] カウント");
            workflow::count(&api, &mut session, &ctx, config.demo_fallback, &mut rand::rng()).await?;

            println!("\n[4/4] 結果\n");
            show_results(&session, &ctx, export.as_deref())?;

            println!("\n✅ 完了");
        }

        Commands::Camera { image } => {
            workflow::stage_camera_image(&mut session, &ctx, &image)?;
        }

        Commands::Models => {
            let choice = workflow::load_models(&api, &session, &ctx).await?;
            print_models(&choice, &ctx);
        }

        Commands::Status => {
            println!("ステップ: {:?}", session.current_step());
            println!("セッション: {}", session.store().path().display());
            for key in session::KeyValueStore::keys(session.store()) {
                println!("  - {}", key);
            }
        }

        Commands::Config {
            set_proxy_url,
            set_classifier_url,
            set_counter_url,
            set_language,
            set_demo_fallback,
            show,
        } => {
            // 環境変数の上書きを保存しないよう、ファイルの内容だけを編集する
            let mut stored = Config::load_file()?;
            let mut changed = false;
            if let Some(url) = set_proxy_url {
                stored.proxy_url = url;
                changed = true;
            }
            if let Some(url) = set_classifier_url {
                stored.classifier_url = url;
                changed = true;
            }
            if let Some(url) = set_counter_url {
                stored.counter_url = url;
                changed = true;
            }
            if let Some(language) = set_language {
                stored.language = language;
                changed = true;
            }
            if let Some(enabled) = set_demo_fallback {
                stored.demo_fallback = enabled;
                changed = true;
            }
            if changed {
                stored.save()?;
                config = stored.with_env_overrides();
                println!("✔ 設定を保存しました: {}", Config::config_path()?.display());
            }

            if show || !changed {
                let session_dir: PathBuf = config.session_dir()?;
                println!("設定:");
                println!("  プロキシURL: {}", config.proxy_url);
                println!("  待受アドレス: {}", config.listen);
                println!("  分類API: {}", config.classifier_url);
                println!("  カウントAPI: {}", config.counter_url);
                println!("  セッション: {}", session_dir.display());
                println!("  言語: {}", config.language);
                println!("  デモデータ: {}", if config.demo_fallback { "有効" } else { "無効" });
            }
        }
    }

    Ok(())
}
