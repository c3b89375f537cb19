// 実行監視機能
// ワーカー起動、配信、完了、失敗の報告

pub mod implementations;

pub use implementations::{NoOpRunReporter, TracingRunReporter};
