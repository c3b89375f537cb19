// 1行1メッセージのJSONフレーミング

use super::message::Message;
use crate::core::{SwarmError, SwarmResult};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, Lines};

/// 型消去された読み取り側
pub type BoxedReader = Box<dyn AsyncRead + Send + Unpin>;
/// 型消去された書き込み側
pub type BoxedWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// チャンネルからメッセージを読み出す
pub struct MessageReader<R> {
    lines: Lines<BufReader<R>>,
}

impl<R: AsyncRead + Unpin> MessageReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            lines: BufReader::new(inner).lines(),
        }
    }

    /// 次のメッセージを受信する。相手が切断していれば `None`
    ///
    /// 空行は読み飛ばす。デコードできない行はプロトコルエラー。
    pub async fn recv(&mut self) -> SwarmResult<Option<Message>> {
        loop {
            let line = self
                .lines
                .next_line()
                .await
                .map_err(|e| SwarmError::channel(format!("read failed: {e}")))?;

            let Some(line) = line else {
                return Ok(None);
            };

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            let message = serde_json::from_str(trimmed).map_err(|e| {
                SwarmError::protocol(format!("undecodable frame {trimmed:?}: {e}"))
            })?;
            return Ok(Some(message));
        }
    }
}

/// チャンネルへメッセージを書き込む
pub struct MessageWriter<W> {
    inner: W,
}

impl<W: AsyncWrite + Unpin> MessageWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    /// メッセージを一つ送信してフラッシュする
    pub async fn send(&mut self, message: &Message) -> SwarmResult<()> {
        let mut frame = serde_json::to_vec(message)
            .map_err(|e| SwarmError::protocol(format!("encode failed: {e}")))?;
        frame.push(b'\n');

        self.inner
            .write_all(&frame)
            .await
            .map_err(|e| SwarmError::channel(format!("write failed: {e}")))?;
        self.inner
            .flush()
            .await
            .map_err(|e| SwarmError::channel(format!("flush failed: {e}")))
    }

    /// 書き込み側を閉じる
    pub async fn close(mut self) -> SwarmResult<()> {
        self.inner
            .shutdown()
            .await
            .map_err(|e| SwarmError::channel(format!("shutdown failed: {e}")))
    }
}
