use crate::core::{SwarmError, SwarmResult, WorkItem, WorkListEntry};
use crate::services::WorkList;
use globset::{GlobBuilder, GlobMatcher};
use std::collections::HashSet;
use std::path::Path;
use walkdir::WalkDir;

pub struct FileScanner;

impl FileScanner {
    /// Expands one glob pattern into the regular files it matches, sorted.
    ///
    /// The literal directory prefix of the pattern is the walk root. A root that does not
    /// exist yields no files. Hidden files and directories below the root are skipped unless
    /// some wildcard component of the pattern itself starts with a dot.
    pub fn expand_pattern(pattern: &str) -> SwarmResult<Vec<String>> {
        let components: Vec<&str> = pattern.split('/').collect();
        let Some(first_glob) = components.iter().position(|c| Self::is_glob(c)) else {
            return Ok(Self::literal_file(pattern));
        };

        let literal = components[..first_glob].join("/");
        let (root, implicit_root) = match literal.as_str() {
            "" if pattern.starts_with('/') => ("/".to_string(), false),
            "" => (".".to_string(), true),
            _ => (literal, false),
        };

        if !Path::new(&root).is_dir() {
            return Ok(Vec::new());
        }

        let matcher = Self::compile(pattern)?;
        let rest = &components[first_glob..];
        let mut walker = WalkDir::new(&root);
        if !rest.contains(&"**") {
            walker = walker.max_depth(rest.len());
        }

        let include_hidden = rest.iter().any(|c| c.starts_with('.'));
        let visible = |entry: &walkdir::DirEntry| {
            include_hidden || entry.depth() == 0 || !Self::is_hidden(entry.file_name())
        };

        let mut files = Vec::new();
        for entry in walker.into_iter().filter_entry(visible) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(error) => {
                    tracing::warn!(pattern, %error, "skipping unreadable path");
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path().to_string_lossy();
            let candidate = if implicit_root {
                path.strip_prefix("./").unwrap_or(&path).to_string()
            } else {
                path.into_owned()
            };

            if matcher.is_match(&candidate) {
                files.push(candidate);
            }
        }

        files.sort();
        files.dedup();
        Ok(files)
    }

    /// Expands every pattern of the work list in order.
    ///
    /// Files already gathered by an earlier pattern are not added twice. A pattern prefixed
    /// with `!` removes previously gathered files it matches. Groups pass through as-is.
    pub fn expand_work_list(work_list: &WorkList) -> SwarmResult<Vec<WorkItem>> {
        let mut items = Vec::new();
        let mut seen = HashSet::new();

        for entry in work_list.entries() {
            match entry {
                WorkListEntry::Pattern(pattern) => {
                    if let Some(negated) = pattern.strip_prefix('!') {
                        let excluded: HashSet<String> =
                            Self::expand_pattern(negated)?.into_iter().collect();
                        items.retain(|item| match item {
                            WorkItem::File(path) => !excluded.contains(path),
                            WorkItem::Group(_) => true,
                        });
                        seen.retain(|path| !excluded.contains(path));
                        continue;
                    }

                    let files = Self::expand_pattern(pattern)?;
                    if files.is_empty() {
                        tracing::debug!(pattern = pattern.as_str(), "pattern matched no files");
                    }
                    for file in files {
                        if seen.insert(file.clone()) {
                            items.push(WorkItem::File(file));
                        }
                    }
                }
                WorkListEntry::Group(paths) => items.push(WorkItem::Group(paths.clone())),
            }
        }

        Ok(items)
    }

    fn compile(pattern: &str) -> SwarmResult<GlobMatcher> {
        GlobBuilder::new(pattern)
            .literal_separator(true)
            .backslash_escape(true)
            .build()
            .map(|glob| glob.compile_matcher())
            .map_err(|e| SwarmError::file_discovery(pattern, e.into()))
    }

    fn literal_file(pattern: &str) -> Vec<String> {
        if Path::new(pattern).is_file() {
            vec![pattern.to_string()]
        } else {
            Vec::new()
        }
    }

    fn is_hidden(name: &std::ffi::OsStr) -> bool {
        name.to_string_lossy().starts_with('.')
    }

    fn is_glob(component: &str) -> bool {
        component.contains(['*', '?', '[', '{'])
    }
}
