// エンジン層 - ワーカー群のオーケストレーション
// コーディネーター、ランチャー、レポーターを組み合わせて実行全体を管理する

pub mod api;
pub mod swarm_engine;

pub use api::{run, run_in_process, RunOutcome};
pub use swarm_engine::SwarmEngine;
