// 作業リスト - globパターンとグループの順序付きコレクション

use crate::core::{SwarmError, SwarmResult, WorkListEntry};
use serde_json::Value;

/// 展開前の作業リスト
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkList {
    entries: Vec<WorkListEntry>,
}

impl WorkList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_patterns<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entries: patterns
                .into_iter()
                .map(|p| WorkListEntry::Pattern(p.into()))
                .collect(),
        }
    }

    pub fn push_pattern(&mut self, pattern: impl Into<String>) -> &mut Self {
        self.entries.push(WorkListEntry::Pattern(pattern.into()));
        self
    }

    pub fn push_group<I, S>(&mut self, paths: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entries
            .push(WorkListEntry::Group(paths.into_iter().map(Into::into).collect()));
        self
    }

    pub fn entries(&self) -> &[WorkListEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// JSON値から作業リストを構築する
    ///
    /// 配列以外、または文字列・文字列配列以外の要素を含む場合は設定エラー。
    pub fn from_value(value: Value) -> SwarmResult<Self> {
        let Value::Array(elements) = value else {
            return Err(SwarmError::configuration("work list should be an array"));
        };

        let entries = elements
            .into_iter()
            .map(|element| match element {
                Value::String(pattern) => Ok(WorkListEntry::Pattern(pattern)),
                Value::Array(paths) => paths
                    .into_iter()
                    .map(|path| match path {
                        Value::String(path) => Ok(path),
                        _ => Err(unsupported_element()),
                    })
                    .collect::<SwarmResult<Vec<_>>>()
                    .map(WorkListEntry::Group),
                _ => Err(unsupported_element()),
            })
            .collect::<SwarmResult<Vec<_>>>()?;

        Ok(Self { entries })
    }
}

fn unsupported_element() -> SwarmError {
    SwarmError::configuration("work list only supports a collection of strings")
}

impl FromIterator<WorkListEntry> for WorkList {
    fn from_iter<T: IntoIterator<Item = WorkListEntry>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
