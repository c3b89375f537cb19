// 実行全体の失敗を一度だけ記録するセル
// 最初の失敗だけが採用され、二度目以降の失敗シグナルは無視される

use crate::core::{SwarmError, WorkerId};
use std::sync::Arc;
use tokio::sync::watch;

/// 実行を終了させた失敗の内容
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunFailure {
    /// ワーカーが報告した処理ステップの失敗
    Task {
        worker_id: WorkerId,
        task_name: String,
        message: String,
    },
    /// プロトコル外でのワーカーの異常
    Process { worker_id: WorkerId, message: String },
}

impl RunFailure {
    pub fn worker_id(&self) -> WorkerId {
        match self {
            Self::Task { worker_id, .. } | Self::Process { worker_id, .. } => *worker_id,
        }
    }

    pub fn to_error(&self) -> SwarmError {
        match self {
            Self::Task {
                task_name, message, ..
            } => SwarmError::worker_task(task_name.clone(), message.clone()),
            Self::Process { worker_id, message } => {
                SwarmError::worker_process(*worker_id, message.clone())
            }
        }
    }
}

/// 失敗シグナルの購読側
pub type FailureSignal = watch::Receiver<Option<Arc<RunFailure>>>;

/// 一度だけ設定可能な失敗セル
#[derive(Debug)]
pub struct FailureCell {
    tx: watch::Sender<Option<Arc<RunFailure>>>,
}

impl Default for FailureCell {
    fn default() -> Self {
        Self::new()
    }
}

impl FailureCell {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx }
    }

    /// 失敗を記録する。既に記録済みなら何もせず `false` を返す
    pub fn fail(&self, failure: RunFailure) -> bool {
        let mut pending = Some(failure);
        self.tx.send_if_modified(|slot| {
            if slot.is_some() {
                return false;
            }
            *slot = pending.take().map(Arc::new);
            true
        })
    }

    pub fn failure(&self) -> Option<Arc<RunFailure>> {
        self.tx.borrow().clone()
    }

    pub fn is_failed(&self) -> bool {
        self.tx.borrow().is_some()
    }

    /// 失敗の発生を待ち受けるための購読
    pub fn subscribe(&self) -> FailureSignal {
        self.tx.subscribe()
    }
}
