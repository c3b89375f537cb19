// タスク分散システムのエラー型定義
// 設定エラー・ワーカーのタスクエラー・プロセスレベルのエラーを区別する

use thiserror::Error;

/// タスク分散システム固有のエラー型
#[derive(Error, Debug)]
pub enum SwarmError {
    /// 起動前に検出される設定エラー（ワーカーは一つも起動されない）
    #[error("設定エラー: {message}")]
    ConfigurationError { message: String },

    #[error("バリデーションエラー: {field} - {reason}")]
    ValidationError { field: String, reason: String },

    #[error("ファイル発見エラー: {pattern} - {source}")]
    FileDiscoveryError {
        pattern: String,
        #[source]
        source: anyhow::Error,
    },

    /// ワーカーが報告した処理ステップの失敗
    #[error("ワーカータスクエラー: {task_name} - {message}")]
    WorkerTaskError { task_name: String, message: String },

    /// プロトコル外でのワーカープロセスの異常終了
    #[error("ワーカープロセスエラー: worker {worker_id} - {message}")]
    WorkerProcessError { worker_id: usize, message: String },

    #[error("ワーカー起動エラー: worker {worker_id} - {source}")]
    SpawnError {
        worker_id: usize,
        #[source]
        source: std::io::Error,
    },

    #[error("チャンネルエラー: {message}")]
    ChannelError { message: String },

    #[error("プロトコルエラー: {message}")]
    ProtocolError { message: String },

    #[error("タスクエラー: {source}")]
    TaskError {
        #[source]
        source: tokio::task::JoinError,
    },
}

impl SwarmError {
    /// 設定エラーの作成
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::ConfigurationError {
            message: message.into(),
        }
    }

    /// バリデーションエラーの作成
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// ファイル発見エラーの作成
    pub fn file_discovery(pattern: impl Into<String>, source: anyhow::Error) -> Self {
        Self::FileDiscoveryError {
            pattern: pattern.into(),
            source,
        }
    }

    /// ワーカータスクエラーの作成
    pub fn worker_task(task_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::WorkerTaskError {
            task_name: task_name.into(),
            message: message.into(),
        }
    }

    /// ワーカープロセスエラーの作成
    pub fn worker_process(worker_id: usize, message: impl Into<String>) -> Self {
        Self::WorkerProcessError {
            worker_id,
            message: message.into(),
        }
    }

    pub fn spawn(worker_id: usize, source: std::io::Error) -> Self {
        Self::SpawnError { worker_id, source }
    }

    /// チャンネルエラーの作成
    pub fn channel(message: impl Into<String>) -> Self {
        Self::ChannelError {
            message: message.into(),
        }
    }

    pub fn protocol(message: impl Into<String>) -> Self {
        Self::ProtocolError {
            message: message.into(),
        }
    }

    /// タスクエラーの作成
    pub fn task(source: tokio::task::JoinError) -> Self {
        Self::TaskError { source }
    }

    /// 起動前に発生する設定系のエラーかどうか
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::ConfigurationError { .. }
                | Self::ValidationError { .. }
                | Self::FileDiscoveryError { .. }
        )
    }

    /// エラーの重要度を取得
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::ConfigurationError { .. } | Self::ValidationError { .. } => ErrorSeverity::High,
            Self::FileDiscoveryError { .. } => ErrorSeverity::Medium,
            Self::WorkerTaskError { .. } => ErrorSeverity::High,
            Self::WorkerProcessError { .. } | Self::SpawnError { .. } => ErrorSeverity::Critical,
            Self::ChannelError { .. } | Self::ProtocolError { .. } => ErrorSeverity::High,
            Self::TaskError { .. } => ErrorSeverity::Medium,
        }
    }

    /// エラーコンテキストを取得
    pub fn context(&self) -> ErrorContext {
        match self {
            Self::FileDiscoveryError { pattern, .. } => ErrorContext::new("file_discovery")
                .with_resource(pattern.clone())
                .with_suggestion("globパターンとアクセス権限を確認してください"),
            Self::ConfigurationError { message } => ErrorContext::new("configuration")
                .with_suggestion(format!("設定を確認してください: {message}")),
            Self::ValidationError { field, .. } => ErrorContext::new("option_validation")
                .with_resource(field.clone())
                .with_suggestion("オプションの型と値を確認してください"),
            Self::WorkerTaskError { task_name, .. } => ErrorContext::new("worker_task")
                .with_resource(task_name.clone())
                .with_suggestion("処理ステップの出力を確認してください"),
            Self::WorkerProcessError { worker_id, .. } | Self::SpawnError { worker_id, .. } => {
                ErrorContext::new("worker_process").with_resource(format!("worker {worker_id}"))
            }
            Self::ChannelError { .. } | Self::ProtocolError { .. } | Self::TaskError { .. } => {
                ErrorContext::new("unknown")
            }
        }
    }
}

/// エラーの重要度レベル
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// 低重要度 - ログ出力程度
    Low,
    /// 中重要度 - 警告レベル
    Medium,
    /// 高重要度 - 要対応
    High,
    /// 致命的 - システム停止レベル
    Critical,
}

impl ErrorSeverity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Critical => "CRITICAL",
        }
    }
}

/// エラーコンテキスト情報
#[derive(Debug, Clone)]
pub struct ErrorContext {
    /// 実行していた操作
    pub operation: String,
    /// 関連するリソース（パターン・タスク名等）
    pub resource: Option<String>,
    /// エラー解決のための提案
    pub suggestion: Option<String>,
}

impl ErrorContext {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            resource: None,
            suggestion: None,
        }
    }

    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

/// タスク分散の結果型
pub type SwarmResult<T> = std::result::Result<T, SwarmError>;
