// ワーカー側のタスクディスパッチャー
// 作業単位を一つずつ要求し、処理ステップの完了を待ってから次を要求する

use crate::core::stream::panic_message;
use crate::core::{ProcessingStep, SwarmError, SwarmResult, WorkItem, WorkerId};
use crate::protocol::{Message, MessageReader, MessageWriter};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};

/// ワーカーの状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Idle,
    AwaitingFile,
    Processing,
    Done,
    Failed,
}

impl WorkerState {
    /// 許可された状態遷移かどうか
    pub fn can_transition_to(self, next: WorkerState) -> bool {
        use WorkerState::*;
        matches!(
            (self, next),
            (Idle, AwaitingFile)
                | (AwaitingFile, Processing)
                | (Processing, AwaitingFile)
                | (AwaitingFile, Done)
                | (Idle | AwaitingFile | Processing, Failed)
        )
    }
}

/// ワーカー一つ分の処理結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerSummary {
    pub worker_id: WorkerId,
    pub items_processed: usize,
    pub artifacts_produced: usize,
}

/// ワーカープロセス内で動くディスパッチャー
pub struct WorkerDispatcher<S: ?Sized> {
    worker_id: WorkerId,
    step: Arc<S>,
    state: WorkerState,
    items_processed: usize,
    artifacts_produced: usize,
}

impl<S> WorkerDispatcher<S>
where
    S: ProcessingStep + ?Sized,
{
    pub fn new(worker_id: WorkerId, step: Arc<S>) -> Self {
        Self {
            worker_id,
            step,
            state: WorkerState::Idle,
            items_processed: 0,
            artifacts_produced: 0,
        }
    }

    pub fn state(&self) -> WorkerState {
        self.state
    }

    fn transition(&mut self, next: WorkerState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "invalid worker transition {:?} -> {next:?}",
            self.state
        );
        tracing::trace!(worker = self.worker_id, from = ?self.state, to = ?next, "state");
        self.state = next;
    }

    /// チャンネルが切断されるか `End` を受け取るまでワーカーを駆動する
    ///
    /// 処理ステップが失敗した場合は `WorkerError` を送信してからエラーを返す。
    #[tracing::instrument(name = "worker", skip_all, fields(worker = self.worker_id))]
    pub async fn run<R, W>(
        mut self,
        mut reader: MessageReader<R>,
        mut writer: MessageWriter<W>,
    ) -> SwarmResult<WorkerSummary>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let task_name = self.step.name();

        writer.send(&Message::RequestFile).await?;
        self.transition(WorkerState::AwaitingFile);

        loop {
            let message = match reader.recv().await {
                Ok(Some(message)) => message,
                Ok(None) => {
                    self.transition(WorkerState::Failed);
                    return Err(SwarmError::channel(
                        "coordinator closed the channel before sending end",
                    ));
                }
                Err(error) => {
                    self.transition(WorkerState::Failed);
                    return Err(error);
                }
            };

            match message {
                Message::File { file } => {
                    self.transition(WorkerState::Processing);
                    tracing::debug!(item = %file, "processing");

                    match self.process_item(file).await {
                        Ok(artifacts) => {
                            self.items_processed += 1;
                            self.artifacts_produced += artifacts;
                            writer.send(&Message::RequestFile).await?;
                            self.transition(WorkerState::AwaitingFile);
                        }
                        Err(error_message) => {
                            return self.fail(&mut writer, &task_name, error_message).await;
                        }
                    }
                }
                Message::End => {
                    self.transition(WorkerState::Done);
                    tracing::debug!(items = self.items_processed, "queue drained");
                    // 書き込み側を閉じてコーディネーターから切断する
                    writer.close().await?;
                    return Ok(self.summary());
                }
                Message::RequestFile | Message::WorkerError { .. } => {
                    let error_message =
                        format!("unexpected `{}` message from coordinator", message.tag());
                    return self.fail(&mut writer, &task_name, error_message).await;
                }
            }
        }
    }

    /// 処理ステップを実行し、成果物ストリームの終端まで待つ
    async fn process_item(&self, item: WorkItem) -> Result<usize, String> {
        let step = Arc::clone(&self.step);
        let stream = catch_unwind(AssertUnwindSafe(move || step.process(item)))
            .map_err(|payload| format!("processing step panicked: {}", panic_message(payload)))?;

        stream.drain().await.map_err(|error| format!("{error:#}"))
    }

    async fn fail<W>(
        &mut self,
        writer: &mut MessageWriter<W>,
        task_name: &str,
        error_message: String,
    ) -> SwarmResult<WorkerSummary>
    where
        W: AsyncWrite + Unpin,
    {
        self.transition(WorkerState::Failed);
        tracing::error!(task = task_name, error = %error_message, "processing step failed");

        let report = Message::worker_error(task_name, error_message.clone());
        if let Err(error) = writer.send(&report).await {
            tracing::warn!(%error, "could not report failure to coordinator");
        }

        Err(SwarmError::worker_task(task_name, error_message))
    }

    fn summary(&self) -> WorkerSummary {
        WorkerSummary {
            worker_id: self.worker_id,
            items_processed: self.items_processed,
            artifacts_produced: self.artifacts_produced,
        }
    }
}
