// テストユーティリティ
// 処理内容を記録するステップ、呼び出し回数を数えるレポーター、一時ファイルのヘルパー

#![allow(dead_code)]

use async_trait::async_trait;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use task_swarm::{
    ArtifactStream, ProcessingStep, RunReporter, RunSummary, SwarmError, WorkItem, WorkerId,
    WorkerReport,
};

/// 受け取った作業単位を記録し、指定された作業単位で失敗する処理ステップ
#[derive(Clone, Default)]
pub struct RecordingStep {
    processed: Arc<Mutex<Vec<WorkItem>>>,
    fail_on: Option<WorkItem>,
}

impl RecordingStep {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(item: WorkItem) -> Self {
        Self {
            fail_on: Some(item),
            ..Self::default()
        }
    }

    pub fn processed(&self) -> Vec<WorkItem> {
        self.processed.lock().unwrap().clone()
    }
}

impl ProcessingStep for RecordingStep {
    fn name(&self) -> String {
        "record".to_string()
    }

    fn process(&self, item: WorkItem) -> ArtifactStream {
        if self.fail_on.as_ref() == Some(&item) {
            return ArtifactStream::from_result(Err(anyhow::anyhow!("cannot process {item}")));
        }
        self.processed.lock().unwrap().push(item.clone());
        ArtifactStream::from_result(Ok(vec![format!("done:{item}")]))
    }
}

/// 各報告の回数を数えるレポーター
#[derive(Default)]
pub struct CountingReporter {
    pub spawning: AtomicUsize,
    pub dispatched: AtomicUsize,
    pub finished: AtomicUsize,
    pub failed: AtomicUsize,
    pub completed: AtomicUsize,
}

impl CountingReporter {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RunReporter for CountingReporter {
    async fn report_spawning(&self, _worker_count: usize, _total_items: usize) {
        self.spawning.fetch_add(1, Ordering::SeqCst);
    }

    async fn report_dispatched(&self, _worker_id: WorkerId, _item: &WorkItem) {
        self.dispatched.fetch_add(1, Ordering::SeqCst);
    }

    async fn report_worker_finished(&self, _report: &WorkerReport) {
        self.finished.fetch_add(1, Ordering::SeqCst);
    }

    async fn report_failed(&self, _error: &SwarmError) {
        self.failed.fetch_add(1, Ordering::SeqCst);
    }

    async fn report_completed(&self, _summary: &RunSummary) {
        self.completed.fetch_add(1, Ordering::SeqCst);
    }
}

/// `count` 個の単一ファイル作業単位
pub fn file_items(count: usize) -> Vec<WorkItem> {
    (0..count)
        .map(|i| WorkItem::file(format!("file{i:02}.txt")))
        .collect()
}

/// 一時ディレクトリにファイルを作成し、そのパスを返す
pub fn create_files(root: &Path, names: &[&str]) -> Vec<String> {
    names
        .iter()
        .map(|name| {
            let path = root.join(name);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).unwrap();
            }
            std::fs::write(&path, name.as_bytes()).unwrap();
            path.to_string_lossy().into_owned()
        })
        .collect()
}

pub fn glob(root: &Path, pattern: &str) -> String {
    format!("{}/{pattern}", root.display())
}
