// 同一プロセス内でワーカーを動かすランチャー
// メモリ上のパイプで接続するため、プロトコルは実プロセスと同一

use super::{Launcher, WorkerConnection, WorkerExit, WorkerProcess};
use crate::core::{ProcessingStep, SwarmError, SwarmResult, WorkerId};
use crate::protocol::{MessageReader, MessageWriter};
use crate::services::RunOptions;
use crate::worker::{WorkerDispatcher, WorkerSummary};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::task::JoinHandle;

const PIPE_CAPACITY: usize = 64 * 1024;

/// tokioタスクとしてワーカーを起動するランチャー
#[derive(Clone)]
pub struct InProcessLauncher {
    step: Arc<dyn ProcessingStep>,
}

impl InProcessLauncher {
    pub fn new(step: impl ProcessingStep + 'static) -> Self {
        Self::from_shared(Arc::new(step))
    }

    pub fn from_shared(step: Arc<dyn ProcessingStep>) -> Self {
        Self { step }
    }
}

#[async_trait]
impl Launcher for InProcessLauncher {
    async fn launch(
        &self,
        worker_id: WorkerId,
        _options: &RunOptions,
    ) -> SwarmResult<WorkerConnection> {
        let (coordinator_side, worker_side) = tokio::io::duplex(PIPE_CAPACITY);
        let (coordinator_read, coordinator_write) = tokio::io::split(coordinator_side);
        let (worker_read, worker_write) = tokio::io::split(worker_side);

        let dispatcher = WorkerDispatcher::new(worker_id, Arc::clone(&self.step));
        let handle = tokio::spawn(dispatcher.run(
            MessageReader::new(worker_read),
            MessageWriter::new(worker_write),
        ));

        Ok(WorkerConnection::new(
            Box::new(coordinator_read),
            Box::new(coordinator_write),
            Box::new(TaskProcess {
                handle: Some(handle),
            }),
        ))
    }
}

/// ワーカータスクのハンドル
struct TaskProcess {
    handle: Option<JoinHandle<SwarmResult<WorkerSummary>>>,
}

#[async_trait]
impl WorkerProcess for TaskProcess {
    async fn wait(&mut self) -> SwarmResult<WorkerExit> {
        let Some(handle) = self.handle.take() else {
            return Err(SwarmError::channel("worker task already reaped"));
        };

        Ok(match handle.await {
            Ok(Ok(summary)) => WorkerExit {
                success: true,
                description: format!("processed {} items", summary.items_processed),
            },
            Ok(Err(error)) => WorkerExit::failure(error.to_string()),
            Err(join_error) => WorkerExit::failure(join_error.to_string()),
        })
    }

    async fn kill(&mut self) -> SwarmResult<()> {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
        Ok(())
    }
}

// 子プロセスのkill_on_dropと同じく、ハンドル破棄時にワーカーを止める
impl Drop for TaskProcess {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::traits::MockProcessingStep;
    use crate::core::{ArtifactStream, WorkItem};
    use crate::protocol::Message;

    fn step() -> MockProcessingStep {
        let mut step = MockProcessingStep::new();
        step.expect_name().return_const("noop".to_string());
        step.expect_process()
            .returning(|_| ArtifactStream::empty());
        step
    }

    #[tokio::test]
    async fn test_in_process_worker_speaks_protocol() {
        let launcher = InProcessLauncher::new(step());
        let mut connection = launcher.launch(0, &RunOptions::default()).await.unwrap();

        assert_eq!(
            connection.reader.recv().await.unwrap(),
            Some(Message::RequestFile)
        );
        connection
            .writer
            .send(&Message::file(WorkItem::file("a")))
            .await
            .unwrap();
        assert_eq!(
            connection.reader.recv().await.unwrap(),
            Some(Message::RequestFile)
        );
        connection.writer.send(&Message::End).await.unwrap();
        assert_eq!(connection.reader.recv().await.unwrap(), None);

        let exit = connection.process.wait().await.unwrap();
        assert!(exit.success);
        assert_eq!(exit.description, "processed 1 items");
    }

    #[tokio::test]
    async fn test_kill_aborts_worker_task() {
        let launcher = InProcessLauncher::new(step());
        let mut connection = launcher.launch(0, &RunOptions::default()).await.unwrap();

        connection.process.kill().await.unwrap();
        assert!(connection.process.wait().await.is_err());
    }
}
