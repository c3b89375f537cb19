// SwarmEngine - ワーカー群を起動し、実行全体の結果を一つにまとめる
// ランチャーとレポーターはコンストラクタで注入される

use crate::coordinator::{CoordinatorDispatcher, RunFailure, WorkerSession};
use crate::core::{RunReporter, RunSummary, SwarmError, SwarmResult, WorkItem, WorkerReport};
use crate::file_scanner::FileScanner;
use crate::launcher::Launcher;
use crate::services::{available_parallelism, resolve_concurrency, RunOptions, WorkList};
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinSet;

/// コーディネーター側のオーケストレーター
///
/// 一回の `run` につき一つのキューと一つのディスパッチャーを作り、
/// 全ワーカーセッションで共有する。最初の失敗で残りのワーカーを切断して即座に失敗を返す。
pub struct SwarmEngine<L, R> {
    launcher: Arc<L>,
    reporter: Arc<R>,
    parallelism: usize,
}

impl<L, R> SwarmEngine<L, R>
where
    L: Launcher + 'static,
    R: RunReporter + 'static,
{
    pub fn new(launcher: L, reporter: R) -> Self {
        Self {
            launcher: Arc::new(launcher),
            reporter: Arc::new(reporter),
            parallelism: available_parallelism(),
        }
    }

    /// 並列度の既定値（通常はCPU数）を上書きする
    pub fn with_parallelism(mut self, parallelism: usize) -> Self {
        self.parallelism = parallelism.max(1);
        self
    }

    pub fn parallelism(&self) -> usize {
        self.parallelism
    }

    pub fn reporter(&self) -> &R {
        &self.reporter
    }

    /// 作業リストを展開し、全ワーカーで処理する
    ///
    /// 設定エラーはワーカー起動前に返される。
    pub async fn run(&self, work_list: &WorkList, options: &RunOptions) -> SwarmResult<RunSummary> {
        options.validate()?;
        let items = FileScanner::expand_work_list(work_list)?;
        self.run_items(items, options).await
    }

    /// 展開済みの作業単位を全ワーカーで処理する
    pub async fn run_items(
        &self,
        items: Vec<WorkItem>,
        options: &RunOptions,
    ) -> SwarmResult<RunSummary> {
        options.validate()?;

        let started_at = chrono::Utc::now();
        let start_time = Instant::now();
        let total_items = items.len();
        let worker_count = resolve_concurrency(options, total_items, self.parallelism);

        self.reporter.report_spawning(worker_count, total_items).await;

        let dispatcher = CoordinatorDispatcher::shared(items);
        let mut sessions = JoinSet::new();

        for worker_id in 0..worker_count {
            let connection = match self.launcher.launch(worker_id, options).await {
                Ok(connection) => connection,
                Err(error) => {
                    dispatcher.fail(RunFailure::Process {
                        worker_id,
                        message: error.to_string(),
                    });
                    sessions.abort_all();
                    self.reporter.report_failed(&error).await;
                    return Err(error);
                }
            };

            let session = WorkerSession::new(
                worker_id,
                connection,
                Arc::clone(&dispatcher),
                Arc::clone(&self.reporter),
            );
            sessions.spawn(session.run());
        }

        if let Err(error) = Self::await_sessions(&dispatcher, &mut sessions).await {
            // 残りのセッションは待たない。破棄時にワーカーも停止する
            sessions.abort_all();
            self.reporter.report_failed(&error).await;
            return Err(error);
        }

        let summary = RunSummary {
            total_items,
            worker_count,
            requests_received: dispatcher.requests_received(),
            per_worker: dispatcher.reports(),
            started_at,
            elapsed_ms: start_time.elapsed().as_millis() as u64,
        };
        self.reporter.report_completed(&summary).await;
        Ok(summary)
    }

    /// 全セッションの完了、または最初の失敗を待つ
    async fn await_sessions(
        dispatcher: &CoordinatorDispatcher,
        sessions: &mut JoinSet<WorkerReport>,
    ) -> SwarmResult<()> {
        let mut failure_signal = dispatcher.subscribe_failure();

        loop {
            if let Some(failure) = dispatcher.failure() {
                return Err(failure.to_error());
            }

            tokio::select! {
                biased;
                changed = failure_signal.changed() => {
                    if changed.is_err() {
                        return Err(SwarmError::channel("failure signal closed"));
                    }
                }
                joined = sessions.join_next() => match joined {
                    Some(Ok(report)) => {
                        tracing::trace!(worker = report.worker_id, "session settled");
                    }
                    Some(Err(join_error)) => return Err(SwarmError::task(join_error)),
                    None => {
                        return match dispatcher.failure() {
                            Some(failure) => Err(failure.to_error()),
                            None => Ok(()),
                        };
                    }
                }
            }
        }
    }
}
