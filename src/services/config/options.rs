// 実行オプションの定義と検証
// ユーザー設定をデフォルトにマージし、ワーカー起動前に不正値を弾く

use crate::core::{SwarmError, SwarmResult};
use serde::Deserialize;
use std::path::Path;

/// 実行オプション
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunOptions {
    /// ワーカープロセス数。未指定なら利用可能なCPU数
    #[serde(default)]
    concurrency: Option<usize>,
    /// コーディネーターの情報ログとワーカーの標準エラーを抑制する
    #[serde(default)]
    silent: bool,
}

impl RunOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = Some(concurrency);
        self
    }

    pub fn with_silent(mut self, silent: bool) -> Self {
        self.silent = silent;
        self
    }

    pub fn concurrency(&self) -> Option<usize> {
        self.concurrency
    }

    pub fn silent(&self) -> bool {
        self.silent
    }

    /// JSON値から厳密に読み込む
    ///
    /// 未知のキーや型違いの値は設定エラーになる。
    pub fn from_value(value: serde_json::Value) -> SwarmResult<Self> {
        let options: Self = serde_json::from_value(value)
            .map_err(|e| SwarmError::configuration(format!("invalid options: {e}")))?;
        options.validate()?;
        Ok(options)
    }

    /// JSONファイルから読み込む
    pub fn from_file(path: &Path) -> SwarmResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            SwarmError::configuration(format!("cannot read options file {}: {e}", path.display()))
        })?;
        let value: serde_json::Value = serde_json::from_str(&content).map_err(|e| {
            SwarmError::configuration(format!("options file {} is not JSON: {e}", path.display()))
        })?;
        Self::from_value(value)
    }

    /// `other` で指定された項目だけを上書きする
    pub fn merge(mut self, other: RunOptions) -> Self {
        if other.concurrency.is_some() {
            self.concurrency = other.concurrency;
        }
        self.silent |= other.silent;
        self
    }

    pub fn validate(&self) -> SwarmResult<()> {
        if self.concurrency == Some(0) {
            return Err(SwarmError::validation(
                "concurrency",
                "must be a positive integer",
            ));
        }
        Ok(())
    }
}

/// 実際に起動するワーカー数を決める
///
/// 指定値（なければ `parallelism`）を作業単位の数で上限し、最低でも1つは起動する。
pub fn resolve_concurrency(options: &RunOptions, item_count: usize, parallelism: usize) -> usize {
    let requested = options.concurrency.unwrap_or(parallelism).max(1);
    requested.min(item_count).max(1)
}

/// 利用可能なCPU並列度
pub fn available_parallelism() -> usize {
    num_cpus::get().max(1)
}
