// ワーカー層 - ワーカープロセス内で動く処理ループ

pub mod dispatcher;
pub mod entry;

// 公開API
pub use dispatcher::{WorkerDispatcher, WorkerState, WorkerSummary};
pub use entry::{run_worker, worker_id_from_env, WORKER_ID_ENV};
