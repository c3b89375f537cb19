// コーディネーター層 - キューの所有とワーカーセッションの管理
//
// キューはコーディネーターだけが保持し、ワーカーにはpopした結果のみを送る。

pub mod dispatcher;
pub mod outcome;
pub mod queue;
pub mod session;

pub use dispatcher::{CoordinatorDispatcher, Reply};
pub use outcome::{FailureCell, FailureSignal, RunFailure};
pub use queue::WorkQueue;
pub use session::WorkerSession;
