// ログ出力の初期化
// ワーカーの標準出力はチャンネル専用のため、ログは常に標準エラーへ出す

use std::io::IsTerminal;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// フィルタを読み取る環境変数（優先順）
pub const LOG_ENV_VARS: [&str; 2] = ["TASK_SWARM_LOG", "RUST_LOG"];

const DEFAULT_FILTER: &str = "info";
const SILENT_FILTER: &str = "warn";

/// ログ設定
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogConfig {
    filter: Option<String>,
    silent: bool,
}

impl LogConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// 環境変数からフィルタを読み取る
    pub fn from_env() -> Self {
        let filter = LOG_ENV_VARS
            .iter()
            .find_map(|key| std::env::var(key).ok())
            .filter(|value| !value.trim().is_empty());
        Self {
            filter,
            silent: false,
        }
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// 明示的なフィルタがなければ警告以上のみ出力する
    pub fn with_silent(mut self, silent: bool) -> Self {
        self.silent = silent;
        self
    }

    /// 有効なフィルタ文字列
    pub fn directives(&self) -> &str {
        match (&self.filter, self.silent) {
            (Some(filter), _) => filter,
            (None, true) => SILENT_FILTER,
            (None, false) => DEFAULT_FILTER,
        }
    }

    fn build_filter(&self) -> EnvFilter {
        EnvFilter::try_new(self.directives()).unwrap_or_else(|_| {
            eprintln!("Warning: invalid log filter '{}', using default", self.directives());
            EnvFilter::new(DEFAULT_FILTER)
        })
    }
}

/// グローバルなsubscriberを初期化する。二度目以降の呼び出しは無視される
pub fn init(config: &LogConfig) {
    let layer = fmt::layer()
        .with_target(false)
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr);

    let _ = tracing_subscriber::registry()
        .with(config.build_filter())
        .with(layer)
        .try_init();
}
