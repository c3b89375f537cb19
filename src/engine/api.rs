// 高レベル公開API
// 役割（コーディネーター/ワーカー）を判定し、SwarmEngineを簡単に使えるようにする

use super::SwarmEngine;
use crate::core::{ProcessingStep, RunSummary, SwarmResult};
use crate::launcher::{InProcessLauncher, ProcessLauncher};
use crate::services::{RunOptions, TracingRunReporter, WorkList};
use crate::worker::{run_worker, worker_id_from_env, WorkerSummary};
use std::sync::Arc;

/// このプロセスが果たした役割ごとの実行結果
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// 全ワーカーが正常終了した
    Coordinator(RunSummary),
    /// ワーカーとして `End` まで処理した
    Worker(WorkerSummary),
}

impl RunOutcome {
    pub fn is_worker(&self) -> bool {
        matches!(self, RunOutcome::Worker(_))
    }

    pub fn summary(&self) -> Option<&RunSummary> {
        match self {
            RunOutcome::Coordinator(summary) => Some(summary),
            RunOutcome::Worker(_) => None,
        }
    }
}

/// 作業リストを複数のワーカープロセスで処理する
///
/// ワーカー用の環境変数が設定されていればワーカーとして標準入出力のチャンネルを処理し、
/// そうでなければ現在の実行ファイルをワーカーとして再起動するコーディネーターになる。
/// ワーカーは同じ引数で起動されるため、呼び出し側は両方の役割で同じ処理ステップを組み立てること。
pub async fn run(
    work_list: &WorkList,
    step: Arc<dyn ProcessingStep>,
    options: &RunOptions,
) -> SwarmResult<RunOutcome> {
    if let Some(worker_id) = worker_id_from_env()? {
        return run_worker(worker_id, step).await.map(RunOutcome::Worker);
    }

    let engine = SwarmEngine::new(
        ProcessLauncher::current_exe()?,
        TracingRunReporter::for_silent(options.silent()),
    );
    engine.run(work_list, options).await.map(RunOutcome::Coordinator)
}

/// ワーカーを同一プロセス内のタスクとして動かす
///
/// プロトコルは実プロセスと同じ。埋め込み用途やテストで使う。
pub async fn run_in_process(
    work_list: &WorkList,
    step: Arc<dyn ProcessingStep>,
    options: &RunOptions,
) -> SwarmResult<RunSummary> {
    SwarmEngine::new(
        InProcessLauncher::from_shared(step),
        TracingRunReporter::for_silent(options.silent()),
    )
    .run(work_list, options)
    .await
}
