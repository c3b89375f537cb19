// 実プロセスとしてワーカーを起動する
// 現在の実行ファイルを同じ引数で再実行し、環境変数でワーカー役を指定する

use super::{Launcher, WorkerConnection, WorkerExit, WorkerProcess};
use crate::core::{SwarmError, SwarmResult, WorkerId};
use crate::services::RunOptions;
use crate::worker::WORKER_ID_ENV;
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::{Child, Command};

/// 子プロセスとしてワーカーを起動するランチャー
#[derive(Debug, Clone)]
pub struct ProcessLauncher {
    program: PathBuf,
    args: Vec<OsString>,
}

impl ProcessLauncher {
    pub fn new(program: impl Into<PathBuf>, args: impl IntoIterator<Item = impl Into<OsString>>) -> Self {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// 現在の実行ファイルを同じ引数で再実行するランチャー
    pub fn current_exe() -> SwarmResult<Self> {
        let program = std::env::current_exe()
            .map_err(|e| SwarmError::configuration(format!("cannot locate current executable: {e}")))?;
        Ok(Self::new(program, std::env::args_os().skip(1)))
    }

    fn command(&self, worker_id: WorkerId, options: &RunOptions) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .env(WORKER_ID_ENV, worker_id.to_string())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(if options.silent() {
                Stdio::null()
            } else {
                Stdio::inherit()
            })
            .kill_on_drop(true);
        command
    }
}

#[async_trait]
impl Launcher for ProcessLauncher {
    async fn launch(
        &self,
        worker_id: WorkerId,
        options: &RunOptions,
    ) -> SwarmResult<WorkerConnection> {
        let mut child = self
            .command(worker_id, options)
            .spawn()
            .map_err(|e| SwarmError::spawn(worker_id, e))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| SwarmError::channel(format!("worker {worker_id}: stdin not captured")))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| SwarmError::channel(format!("worker {worker_id}: stdout not captured")))?;

        tracing::debug!(worker = worker_id, pid = child.id(), "spawned worker process");

        Ok(WorkerConnection::new(
            Box::new(stdout),
            Box::new(stdin),
            Box::new(ChildProcess { child }),
        ))
    }
}

/// tokioの子プロセスハンドル
struct ChildProcess {
    child: Child,
}

#[async_trait]
impl WorkerProcess for ChildProcess {
    async fn wait(&mut self) -> SwarmResult<WorkerExit> {
        let status = self
            .child
            .wait()
            .await
            .map_err(|e| SwarmError::channel(format!("wait failed: {e}")))?;

        Ok(WorkerExit {
            success: status.success(),
            description: status.to_string(),
        })
    }

    async fn kill(&mut self) -> SwarmResult<()> {
        match self.child.kill().await {
            Ok(()) => Ok(()),
            // 既に回収済みのプロセス
            Err(e) if e.kind() == std::io::ErrorKind::InvalidInput => Ok(()),
            Err(e) => Err(SwarmError::channel(format!("kill failed: {e}"))),
        }
    }
}
