// コーディネーター側のメッセージディスパッチャー
// 共有キューを保持し、全ワーカーからのメッセージに応答する

use super::outcome::{FailureCell, FailureSignal, RunFailure};
use super::queue::WorkQueue;
use crate::core::{WorkItem, WorkerId, WorkerReport};
use crate::protocol::{Direction, Message};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

/// 受信メッセージに対するディスパッチャーの応答
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// 送信元ワーカーへメッセージを返す
    Send(Message),
    /// 実行が失敗したため全ワーカーを切断する
    Disconnect,
}

/// 実行一回分のキューを保持するディスパッチャー
///
/// 全ワーカーセッションで一つのインスタンスを共有する。
/// キューの操作は同期的でブロックしない。
#[derive(Debug)]
pub struct CoordinatorDispatcher {
    queue: Mutex<WorkQueue>,
    requests: AtomicUsize,
    workers: Mutex<BTreeMap<WorkerId, WorkerReport>>,
    failure: FailureCell,
}

impl CoordinatorDispatcher {
    pub fn new(items: Vec<WorkItem>) -> Self {
        Self {
            queue: Mutex::new(WorkQueue::new(items)),
            requests: AtomicUsize::new(0),
            workers: Mutex::new(BTreeMap::new()),
            failure: FailureCell::new(),
        }
    }

    pub fn shared(items: Vec<WorkItem>) -> Arc<Self> {
        Arc::new(Self::new(items))
    }

    /// ワーカーからのメッセージを処理する
    pub fn handle(&self, worker_id: WorkerId, message: Message) -> Reply {
        if message.direction() != Direction::ToCoordinator {
            let tag = message.tag();
            tracing::error!(worker = worker_id, tag, "worker sent a coordinator-bound message");
            self.fail(RunFailure::Process {
                worker_id,
                message: format!("unexpected `{tag}` message from worker"),
            });
            return Reply::Disconnect;
        }

        match message {
            Message::WorkerError {
                task_name,
                error_message,
            } => {
                tracing::error!(
                    worker = worker_id,
                    task = %task_name,
                    error = %error_message,
                    "worker reported a task failure; disconnecting all workers"
                );
                self.fail(RunFailure::Task {
                    worker_id,
                    task_name,
                    message: error_message,
                });
                Reply::Disconnect
            }
            _ => self.handle_request_file(worker_id),
        }
    }

    fn handle_request_file(&self, worker_id: WorkerId) -> Reply {
        self.requests.fetch_add(1, Ordering::SeqCst);

        // 失敗後は新しい作業単位を配らない。判定とpopはキューのロック内で行う
        let next = {
            let mut queue = self.lock_queue();
            if self.failure.is_failed() {
                None
            } else {
                queue.pop()
            }
        };

        let mut workers = self.lock_workers();
        let report = workers.entry(worker_id).or_insert_with(|| WorkerReport {
            worker_id,
            ..WorkerReport::default()
        });
        report.requests += 1;

        match next {
            Some(item) => {
                report.items_processed += 1;
                Reply::Send(Message::file(item))
            }
            None => Reply::Send(Message::End),
        }
    }

    /// 実行を失敗として確定させる。二度目以降は無視される
    pub fn fail(&self, failure: RunFailure) -> bool {
        // popと排他にし、確定後にFileが出ていかないようにする
        let _queue = self.lock_queue();
        self.failure.fail(failure)
    }

    pub fn failure(&self) -> Option<Arc<RunFailure>> {
        self.failure.failure()
    }

    pub fn is_failed(&self) -> bool {
        self.failure.is_failed()
    }

    pub fn subscribe_failure(&self) -> FailureSignal {
        self.failure.subscribe()
    }

    /// 受信したRequestFileの総数
    pub fn requests_received(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    pub fn remaining(&self) -> usize {
        self.lock_queue().len()
    }

    pub fn total_items(&self) -> usize {
        self.lock_queue().initial_len()
    }

    pub fn report_for(&self, worker_id: WorkerId) -> WorkerReport {
        self.lock_workers()
            .get(&worker_id)
            .cloned()
            .unwrap_or(WorkerReport {
                worker_id,
                ..WorkerReport::default()
            })
    }

    /// ワーカーID順のレポート一覧
    pub fn reports(&self) -> Vec<WorkerReport> {
        self.lock_workers().values().cloned().collect()
    }

    fn lock_queue(&self) -> MutexGuard<'_, WorkQueue> {
        // キュー操作中にpanicしても中身は整合しているため、poisonは無視する
        self.queue.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lock_workers(&self) -> MutexGuard<'_, BTreeMap<WorkerId, WorkerReport>> {
        self.workers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
