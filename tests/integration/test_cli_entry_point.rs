// 実行ファイルを使ったテスト（実プロセスのワーカー）
use crate::fixtures::{create_files, glob};
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn task_swarm(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_task_swarm"))
        .args(args)
        .env_remove("TASK_SWARM_WORKER_ID")
        .env("TASK_SWARM_LOG", "info")
        .output()
        .expect("failed to run task_swarm")
}

#[test]
fn test_cli_help() {
    let output = task_swarm(&["--help"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--concurrency"));
    assert!(stdout.contains("--group"));
}

#[test]
fn test_invalid_concurrency_exits_with_failure() {
    let output = task_swarm(&["--concurrency", "0", "*.txt", "--", "true"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("concurrency"));
}

#[cfg(unix)]
#[test]
fn test_runs_command_in_worker_processes() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    let files = create_files(root, &["a.txt", "b.txt", "nested/c.txt", "d.md"]);
    let pattern = glob(root, "**/*.txt");

    let output = task_swarm(&[
        "--concurrency",
        "2",
        "--silent",
        &pattern,
        "--",
        "sh",
        "-c",
        r#"cp "$1" "$1.done""#,
        "sh",
    ]);

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    for file in &files[..3] {
        assert!(Path::new(&format!("{file}.done")).exists(), "{file} not processed");
    }
    assert!(!Path::new(&format!("{}.done", files[3])).exists());
}

#[cfg(unix)]
#[test]
fn test_group_is_passed_as_one_invocation() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    let marker = root.join("args");
    let marker = marker.to_string_lossy().into_owned();
    let script = format!(r#"echo "$#" > {marker}"#);

    let output = task_swarm(&["--silent", "--group", "x,y,z", "--", "sh", "-c", &script, "sh"]);

    assert!(output.status.success());
    let recorded = std::fs::read_to_string(&marker).unwrap();
    assert_eq!(recorded.trim(), "3");
}

#[cfg(unix)]
#[test]
fn test_failing_command_exits_with_failure() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    create_files(root, &["a.txt", "b.txt", "c.txt"]);
    let pattern = glob(root, "*.txt");

    let output = task_swarm(&[
        "--concurrency",
        "2",
        &pattern,
        "--",
        "sh",
        "-c",
        "echo cannot handle $1 >&2; exit 4",
        "sh",
    ]);

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("run failed"));
}

#[cfg(unix)]
#[test]
fn test_no_matching_files_succeeds() {
    let temp_dir = TempDir::new().unwrap();
    let pattern = glob(temp_dir.path(), "*.nothing");

    let output = task_swarm(&["--silent", &pattern, "--", "false"]);

    assert!(output.status.success());
}
