// タスク分散に関連するデータ型定義

use serde::{Deserialize, Serialize};
use std::fmt;

/// ワーカーの識別子（起動順の連番）
pub type WorkerId = usize;

/// ワーカーに渡される作業単位
///
/// 単一のファイルパス、またはグループ化されたファイルパスのリスト。
/// キューに入った後は変更されない。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WorkItem {
    File(String),
    Group(Vec<String>),
}

impl WorkItem {
    pub fn file(path: impl Into<String>) -> Self {
        Self::File(path.into())
    }

    pub fn group<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Group(paths.into_iter().map(Into::into).collect())
    }

    /// 作業単位に含まれるパスを順番に返す
    pub fn paths(&self) -> Vec<&str> {
        match self {
            Self::File(path) => vec![path.as_str()],
            Self::Group(paths) => paths.iter().map(String::as_str).collect(),
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self, Self::Group(_))
    }
}

impl fmt::Display for WorkItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{path}"),
            Self::Group(paths) => write!(f, "[{}]", paths.join(", ")),
        }
    }
}

/// 作業リストの要素
///
/// 文字列はglobパターンとして展開され、リストは一つのグループとしてそのまま渡される
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkListEntry {
    Pattern(String),
    Group(Vec<String>),
}

/// ワーカー単位の実行結果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WorkerReport {
    pub worker_id: WorkerId,
    /// このワーカーに送られた作業単位の数
    pub items_processed: usize,
    /// このワーカーから受信したRequestFileの数（items_processed + 1 で正常終了）
    pub requests: usize,
}

/// 実行全体のサマリー
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub total_items: usize,
    pub worker_count: usize,
    pub requests_received: usize,
    pub per_worker: Vec<WorkerReport>,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub elapsed_ms: u64,
}

impl RunSummary {
    /// 全ワーカーに配信された作業単位の合計
    pub fn items_dispatched(&self) -> usize {
        self.per_worker.iter().map(|r| r.items_processed).sum()
    }
}
