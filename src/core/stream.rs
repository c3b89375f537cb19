// 処理ステップが生成する成果物のストリーム
// 有限・再開不可のシーケンスで、終端または失敗を一度だけ通知する

use std::any::Any;
use std::future::Future;
use tokio::sync::mpsc;

/// 処理ステップが生成する成果物（出力ファイルパスやログ行など）
pub type Artifact = String;

const DEFAULT_STREAM_BUFFER: usize = 16;

#[derive(Debug)]
enum Frame {
    Artifact(Artifact),
    Failed(anyhow::Error),
    Finished,
}

/// 成果物を受け取る側
///
/// `next()` が `None` を返した時点でシーケンスは終端。
/// `Some(Err(_))` は処理ステップの失敗を表す。
/// 送信側が `finish()` を呼ばずに全て破棄された場合も失敗として扱う。
#[derive(Debug)]
pub struct ArtifactStream {
    rx: mpsc::Receiver<Frame>,
    done: bool,
}

/// 成果物を送り出す側
///
/// 正常終了は `finish()` で明示する。
#[derive(Debug, Clone)]
pub struct ArtifactSink {
    tx: mpsc::Sender<Frame>,
}

impl ArtifactSink {
    /// 成果物を一つ送出する。受信側が閉じていれば `false`
    pub async fn emit(&self, artifact: impl Into<Artifact>) -> bool {
        self.tx.send(Frame::Artifact(artifact.into())).await.is_ok()
    }

    /// 失敗を送出する
    pub async fn fail(&self, error: anyhow::Error) -> bool {
        self.tx.send(Frame::Failed(error)).await.is_ok()
    }

    /// 正常終了を送出する
    pub async fn finish(self) -> bool {
        self.tx.send(Frame::Finished).await.is_ok()
    }
}

impl ArtifactStream {
    /// 送信側と受信側のペアを作成
    pub fn channel(buffer: usize) -> (ArtifactSink, ArtifactStream) {
        let (tx, rx) = mpsc::channel(buffer.max(1));
        (ArtifactSink { tx }, ArtifactStream { rx, done: false })
    }

    /// 成果物を持たずに即座に終端するストリーム
    pub fn empty() -> Self {
        Self::from_result(Ok(Vec::new()))
    }

    /// 既に確定した結果からストリームを作成
    pub fn from_result(result: anyhow::Result<Vec<Artifact>>) -> Self {
        let frames: Vec<Frame> = match result {
            Ok(artifacts) => artifacts
                .into_iter()
                .map(Frame::Artifact)
                .chain(std::iter::once(Frame::Finished))
                .collect(),
            Err(error) => vec![Frame::Failed(error)],
        };
        let (tx, rx) = mpsc::channel(frames.len());
        for frame in frames {
            // 容量を確保済みのため失敗しない
            let _ = tx.try_send(frame);
        }
        Self { rx, done: false }
    }

    /// 非同期タスクとして処理を起動し、その出力をストリームとして返す
    ///
    /// タスクが `Err` を返した場合やpanicした場合は、終端の前に失敗が一つ流れる。
    pub fn spawn<F, Fut>(producer: F) -> Self
    where
        F: FnOnce(ArtifactSink) -> Fut,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let (sink, stream) = Self::channel(DEFAULT_STREAM_BUFFER);
        let supervisor = sink.clone();
        let task = tokio::spawn(producer(sink));

        tokio::spawn(async move {
            match task.await {
                Ok(Ok(())) => {
                    supervisor.finish().await;
                }
                Ok(Err(error)) => {
                    supervisor.fail(error).await;
                }
                Err(join_error) if join_error.is_panic() => {
                    let message = panic_message(join_error.into_panic());
                    supervisor
                        .fail(anyhow::anyhow!("processing step panicked: {message}"))
                        .await;
                }
                Err(join_error) => {
                    supervisor
                        .fail(anyhow::anyhow!("processing step was cancelled: {join_error}"))
                        .await;
                }
            }
        });

        stream
    }

    /// 次の成果物を待つ
    pub async fn next(&mut self) -> Option<anyhow::Result<Artifact>> {
        if self.done {
            return None;
        }
        match self.rx.recv().await {
            Some(Frame::Artifact(artifact)) => Some(Ok(artifact)),
            Some(Frame::Failed(error)) => {
                self.done = true;
                Some(Err(error))
            }
            Some(Frame::Finished) => {
                self.done = true;
                None
            }
            None => {
                self.done = true;
                Some(Err(anyhow::anyhow!(
                    "artifact stream closed before the step finished"
                )))
            }
        }
    }

    /// 終端まで読み切り、成果物の数を返す。最初の失敗で中断する
    pub async fn drain(mut self) -> anyhow::Result<usize> {
        let mut count = 0;
        while let Some(result) = self.next().await {
            result?;
            count += 1;
        }
        Ok(count)
    }
}

/// panicのペイロードから表示用メッセージを取り出す
pub fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
