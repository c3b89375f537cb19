// 外部コマンドを処理ステップとして実行する
// 作業単位のパスを引数の末尾に追加し、標準出力の各行を成果物とする

use crate::core::{ArtifactStream, ProcessingStep, WorkItem};
use crate::worker::WORKER_ID_ENV;
use anyhow::{bail, Context};
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;

/// 作業単位ごとに外部プログラムを起動する処理ステップ
#[derive(Debug, Clone)]
pub struct CommandStep {
    program: PathBuf,
    args: Vec<OsString>,
}

impl CommandStep {
    pub fn new(
        program: impl Into<PathBuf>,
        args: impl IntoIterator<Item = impl Into<OsString>>,
    ) -> Self {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    fn command(&self, item: &WorkItem) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .args(item.paths())
            // ワーカー役の指定を子コマンドに引き継がない
            .env_remove(WORKER_ID_ENV)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        command
    }
}

impl ProcessingStep for CommandStep {
    /// プログラムのファイル名
    fn name(&self) -> String {
        self.program
            .file_name()
            .unwrap_or(self.program.as_os_str())
            .to_string_lossy()
            .into_owned()
    }

    fn process(&self, item: WorkItem) -> ArtifactStream {
        let mut command = self.command(&item);
        let name = self.name();

        ArtifactStream::spawn(move |sink| async move {
            let output = command
                .output()
                .await
                .with_context(|| format!("failed to start `{name}` for {item}"))?;

            if !output.status.success() {
                let stderr = String::from_utf8_lossy(&output.stderr);
                bail!("`{name}` {} for {item}: {}", output.status, stderr.trim());
            }

            let stdout = String::from_utf8_lossy(&output.stdout);
            for line in stdout.lines().map(str::trim).filter(|l| !l.is_empty()) {
                if !sink.emit(line).await {
                    break;
                }
            }
            Ok(())
        })
    }
}
