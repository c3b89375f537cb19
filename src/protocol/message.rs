// コーディネーターとワーカー間で交換されるメッセージ

use crate::core::WorkItem;
use serde::{Deserialize, Serialize};

/// プロセス間チャンネルを流れるメッセージ
///
/// タグ（`type`フィールド）で両端のディスパッチが決まる。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Message {
    /// ワーカー → コーディネーター: 次の作業単位を要求
    RequestFile,
    /// コーディネーター → ワーカー: 作業単位を一つ渡す
    File { file: WorkItem },
    /// コーディネーター → ワーカー: キューが空になった
    End,
    /// ワーカー → コーディネーター: 処理ステップが失敗した
    #[serde(rename_all = "camelCase")]
    WorkerError {
        task_name: String,
        error_message: String,
    },
}

/// メッセージの送信方向
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    ToCoordinator,
    ToWorker,
}

impl Message {
    pub fn file(item: WorkItem) -> Self {
        Self::File { file: item }
    }

    pub fn worker_error(task_name: impl Into<String>, error_message: impl Into<String>) -> Self {
        Self::WorkerError {
            task_name: task_name.into(),
            error_message: error_message.into(),
        }
    }

    pub fn direction(&self) -> Direction {
        match self {
            Self::RequestFile | Self::WorkerError { .. } => Direction::ToCoordinator,
            Self::File { .. } | Self::End => Direction::ToWorker,
        }
    }

    /// ログ出力用のタグ名
    pub fn tag(&self) -> &'static str {
        match self {
            Self::RequestFile => "requestFile",
            Self::File { .. } => "file",
            Self::End => "end",
            Self::WorkerError { .. } => "workerError",
        }
    }
}
