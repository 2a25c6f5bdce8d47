//! 通知（トースト・進捗表示）と実行コンテキスト
//!
//! 言語と通知先は `Context` にまとめ、main で組み立ててから各処理に渡す。

use indicatif::{ProgressBar, ProgressStyle};
use scaffold_count_common::Language;
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastVariant {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub title: String,
    pub description: String,
    pub variant: ToastVariant,
}

impl Toast {
    pub fn success(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant: ToastVariant::Success,
        }
    }

    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant: ToastVariant::Error,
        }
    }
}

pub trait Notifier: Send + Sync {
    fn toast(&self, toast: Toast);

    /// 進捗メッセージ
    fn progress(&self, _message: &str) {}

    /// 進捗表示を終了
    fn finish(&self) {}
}

/// 処理に渡す実行コンテキスト
pub struct Context<'a> {
    pub language: Language,
    pub notifier: &'a dyn Notifier,
}

impl<'a> Context<'a> {
    pub fn new(language: Language, notifier: &'a dyn Notifier) -> Self {
        Self { language, notifier }
    }

    pub fn t(&self, key: &'static str) -> &'static str {
        self.language.t(key)
    }

    pub fn progress(&self, key: &'static str) {
        self.notifier.progress(self.t(key));
    }

    pub fn success(&self, title_key: &'static str, description: impl Into<String>) {
        self.notifier.toast(Toast::success(self.t(title_key), description));
    }

    pub fn error(&self, title_key: &'static str, description: impl Into<String>) {
        self.notifier.toast(Toast::error(self.t(title_key), description));
    }
}

/// 端末出力（スピナー＋トースト）
pub struct ConsoleNotifier {
    spinner: Mutex<Option<ProgressBar>>,
}

impl ConsoleNotifier {
    pub fn new() -> Self {
        Self {
            spinner: Mutex::new(None),
        }
    }
}

impl Default for ConsoleNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier for ConsoleNotifier {
    fn toast(&self, toast: Toast) {
        let icon = match toast.variant {
            ToastVariant::Success => "✔",
            ToastVariant::Error => "⚠",
        };
        let line = format!("{} {} - {}", icon, toast.title, toast.description);

        match self.spinner.lock().ok().and_then(|guard| guard.clone()) {
            Some(spinner) => spinner.println(line),
            None => println!("{}", line),
        }
    }

    fn progress(&self, message: &str) {
        let Ok(mut guard) = self.spinner.lock() else {
            return;
        };
        let spinner = guard.get_or_insert_with(|| {
            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::with_template("{spinner:.green} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            pb.enable_steady_tick(Duration::from_millis(100));
            pb
        });
        spinner.set_message(message.to_string());
    }

    fn finish(&self) {
        if let Ok(mut guard) = self.spinner.lock() {
            if let Some(spinner) = guard.take() {
                spinner.finish_and_clear();
            }
        }
    }
}

/// 通知を記録するだけの実装（テスト用）
#[derive(Default)]
pub struct RecordingNotifier {
    toasts: Mutex<Vec<Toast>>,
    progress: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toasts(&self) -> Vec<Toast> {
        self.toasts.lock().map(|t| t.clone()).unwrap_or_default()
    }

    pub fn progress_messages(&self) -> Vec<String> {
        self.progress.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

impl Notifier for RecordingNotifier {
    fn toast(&self, toast: Toast) {
        if let Ok(mut toasts) = self.toasts.lock() {
            toasts.push(toast);
        }
    }

    fn progress(&self, message: &str) {
        if let Ok(mut progress) = self.progress.lock() {
            progress.push(message.to_string());
        }
    }
}
