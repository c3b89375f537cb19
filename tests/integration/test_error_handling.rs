// 失敗時の挙動のテスト
use crate::fixtures::{file_items, CountingReporter, RecordingStep};
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use task_swarm::launcher::{MockWorkerProcess, WorkerConnection, WorkerExit};
use task_swarm::{
    ArtifactStream, FnStep, InProcessLauncher, Launcher, NoOpRunReporter, ProcessLauncher,
    ProcessingStep, RunOptions, SwarmEngine, SwarmError, SwarmResult, WorkItem, WorkList,
    WorkerId,
};

#[test]
fn test_work_list_must_be_an_array() {
    let error = WorkList::from_value(json!("src/*.js")).unwrap_err();
    assert!(error.is_configuration());
    assert!(error.to_string().contains("work list should be an array"));
}

#[test]
fn test_work_list_elements_must_be_strings() {
    let error = WorkList::from_value(json!(["a.js", 42])).unwrap_err();
    assert!(error.to_string().contains("only supports a collection of strings"));
}

#[tokio::test]
async fn test_invalid_options_spawn_nothing() {
    let reporter = CountingReporter::shared();
    let engine = SwarmEngine::new(
        InProcessLauncher::new(RecordingStep::new()),
        Arc::clone(&reporter),
    );

    let error = engine
        .run(&WorkList::new(), &RunOptions::new().with_concurrency(0))
        .await
        .unwrap_err();

    assert!(error.is_configuration());
    assert_eq!(CountingReporter::count(&reporter.spawning), 0);
    assert!(RunOptions::from_value(json!({"fakeOption": false})).is_err());
}

#[tokio::test]
async fn test_step_failure_rejects_once_and_stops_delivery() {
    let reporter = CountingReporter::shared();
    let step = RecordingStep::failing_on(WorkItem::file("file01.txt"));
    let engine = SwarmEngine::new(InProcessLauncher::new(step.clone()), Arc::clone(&reporter));

    let error = engine
        .run_items(file_items(5), &RunOptions::new().with_concurrency(1))
        .await
        .unwrap_err();

    match error {
        SwarmError::WorkerTaskError { task_name, message } => {
            assert_eq!(task_name, "record");
            assert!(message.contains("cannot process file01.txt"));
        }
        other => panic!("unexpected error: {other:?}"),
    }

    assert_eq!(step.processed(), vec![WorkItem::file("file00.txt")]);
    assert_eq!(CountingReporter::count(&reporter.dispatched), 2);
    assert_eq!(CountingReporter::count(&reporter.failed), 1);
    assert_eq!(CountingReporter::count(&reporter.completed), 0);
}

#[tokio::test]
async fn test_failure_with_many_workers_is_reported_once() {
    let reporter = CountingReporter::shared();
    let step = FnStep::new("always-fails", |item: WorkItem| async move {
        Err::<Vec<String>, _>(anyhow::anyhow!("broken {item}"))
    });
    let engine = SwarmEngine::new(InProcessLauncher::new(step), Arc::clone(&reporter));

    let error = engine
        .run_items(file_items(20), &RunOptions::new().with_concurrency(4))
        .await
        .unwrap_err();

    assert!(matches!(error, SwarmError::WorkerTaskError { .. }));
    assert_eq!(CountingReporter::count(&reporter.failed), 1);
    // 失敗した時点で各ワーカーは高々一つしか受け取っていない
    assert!(CountingReporter::count(&reporter.dispatched) <= 4);
}

#[tokio::test]
async fn test_panicking_step_fails_run() {
    let step = FnStep::new("panics", |_item: WorkItem| async move {
        if true {
            panic!("step blew up");
        }
        Ok::<Vec<String>, anyhow::Error>(Vec::new())
    });
    let engine = SwarmEngine::new(InProcessLauncher::new(step), NoOpRunReporter::new());

    let error = engine
        .run_items(file_items(2), &RunOptions::new().with_concurrency(1))
        .await
        .unwrap_err();

    assert!(error.to_string().contains("step blew up"));
}

/// 自前で起動したタスクの中でpanicする処理ステップ
struct DetachedPanicStep;

impl ProcessingStep for DetachedPanicStep {
    fn name(&self) -> String {
        "detached".to_string()
    }

    fn process(&self, _item: WorkItem) -> ArtifactStream {
        let (sink, stream) = ArtifactStream::channel(4);
        tokio::spawn(async move {
            let _sink = sink;
            if "detached".len() == 8 {
                panic!("helper task died");
            }
        });
        stream
    }
}

#[tokio::test]
async fn test_panic_in_step_owned_task_fails_run() {
    let reporter = CountingReporter::shared();
    let engine = SwarmEngine::new(
        InProcessLauncher::new(DetachedPanicStep),
        Arc::clone(&reporter),
    );

    let error = engine
        .run_items(file_items(2), &RunOptions::new().with_concurrency(1))
        .await
        .unwrap_err();

    match error {
        SwarmError::WorkerTaskError { task_name, message } => {
            assert_eq!(task_name, "detached");
            assert!(message.contains("closed before the step finished"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(CountingReporter::count(&reporter.failed), 1);
    assert_eq!(CountingReporter::count(&reporter.completed), 0);
}

/// 何も送らずに異常終了するワーカーを起動するランチャー
struct VanishingLauncher;

#[async_trait]
impl Launcher for VanishingLauncher {
    async fn launch(
        &self,
        _worker_id: WorkerId,
        _options: &RunOptions,
    ) -> SwarmResult<WorkerConnection> {
        let (coordinator_side, worker_side) = tokio::io::duplex(64);
        drop(worker_side);
        let (reader, writer) = tokio::io::split(coordinator_side);

        let mut process = MockWorkerProcess::new();
        process
            .expect_wait()
            .returning(|| Ok(WorkerExit::failure("exit status: 2")));
        process.expect_kill().returning(|| Ok(()));

        Ok(WorkerConnection::new(
            Box::new(reader),
            Box::new(writer),
            Box::new(process),
        ))
    }
}

#[tokio::test]
async fn test_worker_exit_without_end_is_process_error() {
    let reporter = CountingReporter::shared();
    let engine = SwarmEngine::new(VanishingLauncher, Arc::clone(&reporter));

    let error = engine
        .run_items(file_items(3), &RunOptions::new().with_concurrency(2))
        .await
        .unwrap_err();

    match error {
        SwarmError::WorkerProcessError { message, .. } => {
            assert!(message.contains("exit status: 2"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(CountingReporter::count(&reporter.failed), 1);
}

#[tokio::test]
async fn test_spawn_failure_fails_run() {
    let reporter = CountingReporter::shared();
    let engine = SwarmEngine::new(
        ProcessLauncher::new("/nonexistent/task-swarm-worker", Vec::<String>::new()),
        Arc::clone(&reporter),
    );

    let error = engine
        .run_items(file_items(3), &RunOptions::new().with_silent(true))
        .await
        .unwrap_err();

    assert!(matches!(error, SwarmError::SpawnError { worker_id: 0, .. }));
    assert_eq!(CountingReporter::count(&reporter.failed), 1);
}
