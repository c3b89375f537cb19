// ワーカー起動層 - ワーカーの生成とチャンネルの接続
//
// 実プロセスを起動するProcessLauncherと、同一プロセス内のタスクとして
// ワーカーを動かすInProcessLauncherの二種類を提供する。

pub mod in_process;
pub mod process;

use crate::core::{SwarmResult, WorkerId};
use crate::protocol::{BoxedReader, BoxedWriter, MessageReader, MessageWriter};
use crate::services::RunOptions;
use async_trait::async_trait;
use mockall::automock;

pub use in_process::InProcessLauncher;
pub use process::ProcessLauncher;

/// ワーカーの終了状態
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerExit {
    pub success: bool,
    pub description: String,
}

impl WorkerExit {
    pub fn success() -> Self {
        Self {
            success: true,
            description: "exit status 0".to_string(),
        }
    }

    pub fn failure(description: impl Into<String>) -> Self {
        Self {
            success: false,
            description: description.into(),
        }
    }
}

/// 起動済みワーカーの制御ハンドル
#[automock]
#[async_trait]
pub trait WorkerProcess: Send {
    /// ワーカーの終了を待つ
    async fn wait(&mut self) -> SwarmResult<WorkerExit>;

    /// ワーカーを強制終了する
    async fn kill(&mut self) -> SwarmResult<()>;
}

/// コーディネーターから見たワーカー一つ分の接続
pub struct WorkerConnection {
    /// ワーカー → コーディネーター
    pub reader: MessageReader<BoxedReader>,
    /// コーディネーター → ワーカー
    pub writer: MessageWriter<BoxedWriter>,
    pub process: Box<dyn WorkerProcess>,
}

impl WorkerConnection {
    pub fn new(reader: BoxedReader, writer: BoxedWriter, process: Box<dyn WorkerProcess>) -> Self {
        Self {
            reader: MessageReader::new(reader),
            writer: MessageWriter::new(writer),
            process,
        }
    }
}

/// ワーカーを起動する手段
#[async_trait]
pub trait Launcher: Send + Sync {
    async fn launch(&self, worker_id: WorkerId, options: &RunOptions)
        -> SwarmResult<WorkerConnection>;
}

#[async_trait]
impl<T: Launcher + ?Sized> Launcher for std::sync::Arc<T> {
    async fn launch(
        &self,
        worker_id: WorkerId,
        options: &RunOptions,
    ) -> SwarmResult<WorkerConnection> {
        self.as_ref().launch(worker_id, options).await
    }
}
