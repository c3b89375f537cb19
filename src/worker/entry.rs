// ワーカープロセスのエントリーポイント
// 標準入力をコーディネーターからの受信、標準出力を送信に使う

use super::dispatcher::{WorkerDispatcher, WorkerSummary};
use crate::core::{ProcessingStep, SwarmError, SwarmResult, WorkerId};
use crate::protocol::{MessageReader, MessageWriter};
use std::sync::Arc;

/// ワーカーとして起動されたことを示す環境変数
pub const WORKER_ID_ENV: &str = "TASK_SWARM_WORKER_ID";

/// 環境変数からワーカーIDを読み取る。コーディネーターなら `None`
pub fn worker_id_from_env() -> SwarmResult<Option<WorkerId>> {
    match std::env::var(WORKER_ID_ENV) {
        Ok(value) => value.trim().parse().map(Some).map_err(|_| {
            SwarmError::configuration(format!("{WORKER_ID_ENV} must be a worker index, got {value:?}"))
        }),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(std::env::VarError::NotUnicode(_)) => Err(SwarmError::configuration(format!(
            "{WORKER_ID_ENV} is not valid unicode"
        ))),
    }
}

/// 標準入出力をチャンネルとしてワーカーループを実行する
///
/// 標準出力はチャンネル専用のため、処理ステップやログは標準エラーへ出力すること。
pub async fn run_worker<S>(worker_id: WorkerId, step: Arc<S>) -> SwarmResult<WorkerSummary>
where
    S: ProcessingStep + ?Sized,
{
    tracing::debug!(worker = worker_id, pid = std::process::id(), "worker process started");

    let reader = MessageReader::new(tokio::io::stdin());
    let writer = MessageWriter::new(tokio::io::stdout());

    WorkerDispatcher::new(worker_id, step).run(reader, writer).await
}
