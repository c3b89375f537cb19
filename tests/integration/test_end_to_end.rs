// 同一プロセス内ワーカーによるエンドツーエンドテスト
use crate::fixtures::{create_files, file_items, glob, CountingReporter, RecordingStep};
use std::collections::HashSet;
use task_swarm::{
    InProcessLauncher, NoOpRunReporter, RunOptions, SwarmEngine, WorkItem, WorkList,
};
use tempfile::TempDir;

#[tokio::test]
async fn test_requests_equal_items_plus_workers() {
    for (items, workers) in [(1, 1), (5, 1), (5, 5), (20, 3), (64, 8)] {
        let engine = SwarmEngine::new(
            InProcessLauncher::new(RecordingStep::new()),
            NoOpRunReporter::new(),
        );

        let summary = engine
            .run_items(file_items(items), &RunOptions::new().with_concurrency(workers))
            .await
            .unwrap();

        assert_eq!(summary.worker_count, workers);
        assert_eq!(summary.requests_received, items + workers, "K={items} W={workers}");
        for report in &summary.per_worker {
            assert_eq!(report.requests, report.items_processed + 1);
        }
    }
}

#[tokio::test]
async fn test_every_item_delivered_exactly_once() {
    let step = RecordingStep::new();
    let engine = SwarmEngine::new(InProcessLauncher::new(step.clone()), NoOpRunReporter::new());
    let items = file_items(50);

    let summary = engine
        .run_items(items.clone(), &RunOptions::new().with_concurrency(4))
        .await
        .unwrap();

    let processed = step.processed();
    assert_eq!(processed.len(), items.len());
    let unique: HashSet<_> = processed.iter().cloned().collect();
    assert_eq!(unique, items.into_iter().collect::<HashSet<_>>());
    assert_eq!(summary.items_dispatched(), 50);
}

#[tokio::test]
async fn test_empty_work_list_still_ends_workers() {
    let reporter = CountingReporter::shared();
    let engine = SwarmEngine::new(
        InProcessLauncher::new(RecordingStep::new()),
        std::sync::Arc::clone(&reporter),
    )
    .with_parallelism(4);

    let summary = engine
        .run(&WorkList::new(), &RunOptions::default())
        .await
        .unwrap();

    assert_eq!(summary.total_items, 0);
    assert_eq!(summary.worker_count, 1);
    assert_eq!(summary.requests_received, 1);
    assert_eq!(summary.items_dispatched(), 0);
    assert_eq!(CountingReporter::count(&reporter.finished), 1);
    assert_eq!(CountingReporter::count(&reporter.completed), 1);
}

#[tokio::test]
async fn test_concurrency_defaults_and_clamping() {
    let engine = SwarmEngine::new(
        InProcessLauncher::new(RecordingStep::new()),
        NoOpRunReporter::new(),
    )
    .with_parallelism(4);

    let summary = engine
        .run_items(file_items(10), &RunOptions::default())
        .await
        .unwrap();
    assert_eq!(summary.worker_count, 4);

    let summary = engine
        .run_items(file_items(2), &RunOptions::default())
        .await
        .unwrap();
    assert_eq!(summary.worker_count, 2);

    let summary = engine
        .run_items(file_items(5), &RunOptions::new().with_concurrency(16))
        .await
        .unwrap();
    assert_eq!(summary.worker_count, 5);
}

#[tokio::test]
async fn test_globs_and_groups() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    let files = create_files(root, &["a.js", "lib/b.js", "c.css"]);

    let mut work_list = WorkList::from_patterns([glob(root, "**/*.js"), glob(root, "*.none")]);
    work_list.push_group(["x.css", "y.css"]);

    let step = RecordingStep::new();
    let engine = SwarmEngine::new(InProcessLauncher::new(step.clone()), NoOpRunReporter::new());

    let summary = engine
        .run(&work_list, &RunOptions::new().with_concurrency(2))
        .await
        .unwrap();

    assert_eq!(summary.total_items, 3);
    let processed: HashSet<_> = step.processed().into_iter().collect();
    assert!(processed.contains(&WorkItem::file(files[0].clone())));
    assert!(processed.contains(&WorkItem::file(files[1].clone())));
    assert!(processed.contains(&WorkItem::group(["x.css", "y.css"])));
    assert!(!processed.contains(&WorkItem::file(files[2].clone())));
}

#[tokio::test]
async fn test_run_from_json_work_list() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    create_files(root, &["one.txt", "two.txt", "skip.txt"]);

    let work_list = WorkList::from_value(serde_json::json!([
        glob(root, "*.txt"),
        format!("!{}", glob(root, "skip.txt")),
        ["grouped-a", "grouped-b"],
    ]))
    .unwrap();
    let options = RunOptions::from_value(serde_json::json!({"concurrency": 2})).unwrap();

    let step = RecordingStep::new();
    let summary = SwarmEngine::new(InProcessLauncher::new(step.clone()), NoOpRunReporter::new())
        .run(&work_list, &options)
        .await
        .unwrap();

    assert_eq!(summary.total_items, 3);
    assert_eq!(summary.requests_received, 5);
    assert_eq!(step.processed().len(), 3);
}
