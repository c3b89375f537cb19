// 設定管理機能
// 実行オプションと作業リストの読み込み・検証

pub mod options;
pub mod work_list;

pub use options::{available_parallelism, resolve_concurrency, RunOptions};
pub use work_list::WorkList;
