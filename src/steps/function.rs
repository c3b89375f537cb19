// 非同期クロージャを処理ステップとして使うアダプター

use crate::core::{ArtifactStream, ProcessingStep, WorkItem};
use std::fmt;
use std::future::Future;

/// `Fn(WorkItem) -> Future<Output = anyhow::Result<Vec<String>>>` を包む処理ステップ
pub struct FnStep<F> {
    name: String,
    func: F,
}

impl<F, Fut> FnStep<F>
where
    F: Fn(WorkItem) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<Vec<String>>> + Send + 'static,
{
    pub fn new(name: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            func,
        }
    }
}

impl<F> fmt::Debug for FnStep<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnStep").field("name", &self.name).finish()
    }
}

impl<F, Fut> ProcessingStep for FnStep<F>
where
    F: Fn(WorkItem) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<Vec<String>>> + Send + 'static,
{
    fn name(&self) -> String {
        self.name.clone()
    }

    fn process(&self, item: WorkItem) -> ArtifactStream {
        let future = (self.func)(item);
        ArtifactStream::spawn(move |sink| async move {
            for artifact in future.await? {
                if !sink.emit(artifact).await {
                    break;
                }
            }
            Ok(())
        })
    }
}
