// 実行報告の具象実装

use crate::core::{RunReporter, RunSummary, SwarmError, WorkItem, WorkerId, WorkerReport};
use async_trait::async_trait;

/// tracingによる実行報告実装
///
/// 報告は全て標準エラー側のログに出る。ワーカーの標準出力はチャンネル専用のため使わない。
#[derive(Debug, Default, Clone)]
pub struct TracingRunReporter {
    quiet: bool,
}

impl TracingRunReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn quiet() -> Self {
        Self { quiet: true }
    }

    /// `silent` オプションに従って生成する
    pub fn for_silent(silent: bool) -> Self {
        Self { quiet: silent }
    }

    pub fn is_quiet(&self) -> bool {
        self.quiet
    }
}

#[async_trait]
impl RunReporter for TracingRunReporter {
    async fn report_spawning(&self, worker_count: usize, total_items: usize) {
        if !self.quiet {
            tracing::info!(workers = worker_count, items = total_items, "spawning workers");
        }
    }

    async fn report_dispatched(&self, worker_id: WorkerId, item: &WorkItem) {
        if !self.quiet {
            tracing::debug!(worker = worker_id, %item, "dispatched");
        }
    }

    async fn report_worker_finished(&self, report: &WorkerReport) {
        if !self.quiet {
            tracing::info!(
                worker = report.worker_id,
                items = report.items_processed,
                "worker finished"
            );
        }
    }

    async fn report_failed(&self, error: &SwarmError) {
        // 失敗はsilentでも出す
        let context = error.context();
        tracing::error!(
            severity = error.severity().as_str(),
            operation = %context.operation,
            resource = context.resource.as_deref().unwrap_or("-"),
            suggestion = context.suggestion.as_deref().unwrap_or("-"),
            %error,
            "run failed"
        );
    }

    async fn report_completed(&self, summary: &RunSummary) {
        if !self.quiet {
            tracing::info!(
                items = summary.total_items,
                workers = summary.worker_count,
                requests = summary.requests_received,
                elapsed_ms = summary.elapsed_ms,
                "run completed"
            );
        }
    }
}

/// 何もしない実行報告実装（テスト・ベンチマーク用）
#[derive(Debug, Default, Clone)]
pub struct NoOpRunReporter;

impl NoOpRunReporter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl RunReporter for NoOpRunReporter {
    async fn report_spawning(&self, _worker_count: usize, _total_items: usize) {}

    async fn report_dispatched(&self, _worker_id: WorkerId, _item: &WorkItem) {}

    async fn report_worker_finished(&self, _report: &WorkerReport) {}

    async fn report_failed(&self, _error: &SwarmError) {}

    async fn report_completed(&self, _summary: &RunSummary) {}
}
