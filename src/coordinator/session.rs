// ワーカーセッション - 起動済みワーカー一つ分の通信ループ
// ワーカーのメッセージを共有ディスパッチャーに渡し、応答を書き戻す

use super::dispatcher::{CoordinatorDispatcher, Reply};
use super::outcome::RunFailure;
use crate::core::{RunReporter, WorkerId, WorkerReport};
use crate::launcher::WorkerConnection;
use crate::protocol::Message;
use std::sync::Arc;

/// ワーカープロセス一つに対応するセッション
///
/// ワーカーの終了・エラー・全体切断のいずれかで完了する。
/// 失敗は戻り値ではなくディスパッチャーの失敗セルへ記録される。
pub struct WorkerSession<R: ?Sized> {
    worker_id: WorkerId,
    connection: WorkerConnection,
    dispatcher: Arc<CoordinatorDispatcher>,
    reporter: Arc<R>,
}

/// セッションループの終わり方
enum LoopExit {
    /// ワーカーがチャンネルを閉じた
    ChannelClosed { end_sent: bool },
    /// 実行が失敗したため強制切断する
    Disconnect,
}

impl<R> WorkerSession<R>
where
    R: RunReporter + ?Sized,
{
    pub fn new(
        worker_id: WorkerId,
        connection: WorkerConnection,
        dispatcher: Arc<CoordinatorDispatcher>,
        reporter: Arc<R>,
    ) -> Self {
        Self {
            worker_id,
            connection,
            dispatcher,
            reporter,
        }
    }

    #[tracing::instrument(name = "session", skip_all, fields(worker = self.worker_id))]
    pub async fn run(self) -> WorkerReport {
        let Self {
            worker_id,
            connection,
            dispatcher,
            reporter,
        } = self;
        let WorkerConnection {
            mut reader,
            mut writer,
            mut process,
        } = connection;

        let mut failure_signal = dispatcher.subscribe_failure();
        let mut end_sent = false;

        let exit = loop {
            // 購読前に確定した失敗はchanged()では検知できない
            if dispatcher.is_failed() {
                break LoopExit::Disconnect;
            }

            tokio::select! {
                _ = failure_signal.changed() => {
                    break LoopExit::Disconnect;
                }
                received = reader.recv() => match received {
                    Ok(Some(message)) => {
                        tracing::trace!(tag = message.tag(), "received");
                        match dispatcher.handle(worker_id, message) {
                            Reply::Send(reply) => {
                                if let Message::File { file } = &reply {
                                    reporter.report_dispatched(worker_id, file).await;
                                }
                                let is_end = matches!(reply, Message::End);
                                if let Err(error) = writer.send(&reply).await {
                                    dispatcher.fail(RunFailure::Process {
                                        worker_id,
                                        message: error.to_string(),
                                    });
                                    break LoopExit::Disconnect;
                                }
                                end_sent |= is_end;
                            }
                            Reply::Disconnect => break LoopExit::Disconnect,
                        }
                    }
                    Ok(None) => break LoopExit::ChannelClosed { end_sent },
                    Err(error) => {
                        dispatcher.fail(RunFailure::Process {
                            worker_id,
                            message: error.to_string(),
                        });
                        break LoopExit::Disconnect;
                    }
                }
            }
        };

        match exit {
            LoopExit::Disconnect => {
                tracing::debug!("disconnecting worker");
                if let Err(error) = process.kill().await {
                    tracing::warn!(%error, "failed to terminate worker");
                }
            }
            LoopExit::ChannelClosed { end_sent } => match process.wait().await {
                Ok(status) if status.success && end_sent => {
                    let report = dispatcher.report_for(worker_id);
                    tracing::debug!(items = report.items_processed, "worker finished");
                    reporter.report_worker_finished(&report).await;
                }
                Ok(status) => {
                    let message = if end_sent {
                        format!("worker exited abnormally ({})", status.description)
                    } else {
                        format!(
                            "worker exited before the queue was drained ({})",
                            status.description
                        )
                    };
                    dispatcher.fail(RunFailure::Process { worker_id, message });
                }
                Err(error) => {
                    dispatcher.fail(RunFailure::Process {
                        worker_id,
                        message: error.to_string(),
                    });
                }
            },
        }

        dispatcher.report_for(worker_id)
    }
}
