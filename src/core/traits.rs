// タスク分散システムのトレイト定義
// 差し替え可能な処理ステップと実行報告のインターフェース

use super::error::SwarmError;
use super::stream::ArtifactStream;
use super::types::{RunSummary, WorkItem, WorkerId, WorkerReport};
use async_trait::async_trait;
use mockall::automock;
use std::sync::Arc;

/// 作業単位を一つ受け取り、成果物のストリームを返す処理ステップ
///
/// ワーカーはストリームの終端を待ってから次の作業単位を要求する。
/// ストリーム中の失敗やpanicは実行全体の失敗として扱われる。
#[automock]
pub trait ProcessingStep: Send + Sync {
    /// 失敗時の報告に使われるタスク名
    fn name(&self) -> String;

    /// 作業単位の処理を開始する
    fn process(&self, item: WorkItem) -> ArtifactStream;
}

impl<T: ProcessingStep + ?Sized> ProcessingStep for Arc<T> {
    fn name(&self) -> String {
        self.as_ref().name()
    }

    fn process(&self, item: WorkItem) -> ArtifactStream {
        self.as_ref().process(item)
    }
}

impl ProcessingStep for Box<dyn ProcessingStep> {
    fn name(&self) -> String {
        self.as_ref().name()
    }

    fn process(&self, item: WorkItem) -> ArtifactStream {
        self.as_ref().process(item)
    }
}

/// コーディネーター側の実行報告
#[automock]
#[async_trait]
pub trait RunReporter: Send + Sync {
    /// ワーカー起動前の報告
    async fn report_spawning(&self, worker_count: usize, total_items: usize);

    /// 作業単位をワーカーへ送信した時の報告
    async fn report_dispatched(&self, worker_id: WorkerId, item: &WorkItem);

    /// ワーカーが正常終了した時の報告
    async fn report_worker_finished(&self, report: &WorkerReport);

    /// 実行全体が失敗した時の報告
    async fn report_failed(&self, error: &SwarmError);

    /// 実行全体が完了した時の報告
    async fn report_completed(&self, summary: &RunSummary);
}

#[async_trait]
impl<T: RunReporter + ?Sized> RunReporter for Arc<T> {
    async fn report_spawning(&self, worker_count: usize, total_items: usize) {
        self.as_ref().report_spawning(worker_count, total_items).await
    }

    async fn report_dispatched(&self, worker_id: WorkerId, item: &WorkItem) {
        self.as_ref().report_dispatched(worker_id, item).await
    }

    async fn report_worker_finished(&self, report: &WorkerReport) {
        self.as_ref().report_worker_finished(report).await
    }

    async fn report_failed(&self, error: &SwarmError) {
        self.as_ref().report_failed(error).await
    }

    async fn report_completed(&self, summary: &RunSummary) {
        self.as_ref().report_completed(summary).await
    }
}
