// サービス層 - 実行を支える設定と報告

pub mod config;
pub mod monitoring;

pub use config::{available_parallelism, resolve_concurrency, RunOptions, WorkList};
pub use monitoring::{NoOpRunReporter, TracingRunReporter};
