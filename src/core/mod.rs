// コアレイヤー - 基盤となるトレイト、型、エラー定義
// 他のレイヤーから参照される基本的な抽象化を提供

pub mod error;
pub mod stream;
pub mod traits;
pub mod types;

// 公開API
pub use error::{SwarmError, SwarmResult};
pub use stream::{Artifact, ArtifactSink, ArtifactStream};
pub use traits::{ProcessingStep, RunReporter};
pub use types::{RunSummary, WorkItem, WorkListEntry, WorkerId, WorkerReport};
