// src/watch/patterns.rs

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use globset::{GlobBuilder, GlobMatcher};

const GLOB_META: &[char] = &['*', '?', '[', '{'];

/// A compiled watch pattern, relative to the project root.
///
/// A literal path (`dev/content/main.scss`) watches its parent directory
/// non-recursively. A glob (`dev/content/**/*.js`) watches the longest
/// directory prefix without glob characters, recursively.
#[derive(Clone)]
pub struct WatchPattern {
    pattern: String,
    matcher: GlobMatcher,
    watch_dir: PathBuf,
    recursive: bool,
}

impl fmt::Debug for WatchPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchPattern")
            .field("pattern", &self.pattern)
            .field("watch_dir", &self.watch_dir)
            .field("recursive", &self.recursive)
            .finish_non_exhaustive()
    }
}

impl WatchPattern {
    pub fn compile(pattern: &str) -> Result<Self> {
        let pattern = normalise(pattern);
        if pattern.is_empty() {
            anyhow::bail!("empty watch pattern");
        }

        let matcher = GlobBuilder::new(&pattern)
            .literal_separator(true)
            .build()
            .with_context(|| format!("invalid watch pattern: {pattern}"))?
            .compile_matcher();

        let (watch_dir, recursive) = watch_root(&pattern);
        Ok(Self {
            pattern,
            matcher,
            watch_dir,
            recursive,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.pattern
    }

    /// Directory handed to the watcher, relative to the project root.
    pub fn watch_dir(&self) -> &Path {
        &self.watch_dir
    }

    pub fn is_recursive(&self) -> bool {
        self.recursive
    }

    pub fn is_literal(&self) -> bool {
        !self.recursive
    }

    /// `rel_path` uses forward slashes and is relative to the project root.
    pub fn matches(&self, rel_path: &str) -> bool {
        self.matcher.is_match(rel_path)
    }
}

fn normalise(pattern: &str) -> String {
    let pattern = pattern.trim().replace('\\', "/");
    let mut rest = pattern.as_str();
    while let Some(stripped) = rest.strip_prefix("./") {
        rest = stripped;
    }
    rest.to_string()
}

fn has_glob_meta(segment: &str) -> bool {
    segment.contains(GLOB_META)
}

fn watch_root(pattern: &str) -> (PathBuf, bool) {
    let segments: Vec<&str> = pattern.split('/').filter(|s| !s.is_empty()).collect();

    match segments.iter().position(|s| has_glob_meta(s)) {
        Some(first_glob) => (join_or_dot(&segments[..first_glob]), true),
        None => (join_or_dot(&segments[..segments.len().saturating_sub(1)]), false),
    }
}

fn join_or_dot(segments: &[&str]) -> PathBuf {
    if segments.is_empty() {
        PathBuf::from(".")
    } else {
        segments.iter().collect()
    }
}

/// `path` relative to `root`, with forward slashes.
///
/// Falls back to comparing canonical forms, since some platforms report
/// events under a different absolute prefix (`/private/var` on macOS).
pub fn relative_str(root: &Path, path: &Path) -> Option<String> {
    if let Ok(rel) = path.strip_prefix(root) {
        return Some(rel.to_string_lossy().replace('\\', "/"));
    }

    let root = root.canonicalize().ok()?;
    let path = path
        .canonicalize()
        .or_else(|_| {
            // Removed files cannot be canonicalised; their parent usually can.
            let parent = path.parent().context("no parent")?.canonicalize()?;
            Ok::<_, anyhow::Error>(parent.join(path.file_name().context("no file name")?))
        })
        .ok()?;
    path.strip_prefix(&root)
        .ok()
        .map(|rel| rel.to_string_lossy().replace('\\', "/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_path_watches_parent_directory() {
        let pattern = WatchPattern::compile("./dev/content-layer/main.scss").unwrap();
        assert_eq!(pattern.as_str(), "dev/content-layer/main.scss");
        assert_eq!(pattern.watch_dir(), Path::new("dev/content-layer"));
        assert!(pattern.is_literal());
        assert!(pattern.matches("dev/content-layer/main.scss"));
        assert!(!pattern.matches("dev/content-layer/other.scss"));
    }

    #[test]
    fn glob_watches_longest_literal_prefix() {
        let pattern = WatchPattern::compile("dev/content-layer/**/*.js").unwrap();
        assert_eq!(pattern.watch_dir(), Path::new("dev/content-layer"));
        assert!(pattern.is_recursive());
        assert!(pattern.matches("dev/content-layer/a/b/main.js"));
        assert!(!pattern.matches("dev/settings-layer/main.js"));
    }

    #[test]
    fn single_star_does_not_cross_directories() {
        let pattern = WatchPattern::compile("dev/*.js").unwrap();
        assert!(pattern.matches("dev/main.js"));
        assert!(!pattern.matches("dev/nested/main.js"));
    }

    #[test]
    fn top_level_file_watches_root() {
        let pattern = WatchPattern::compile("index.html").unwrap();
        assert_eq!(pattern.watch_dir(), Path::new("."));
    }

    #[test]
    fn invalid_or_empty_patterns_are_rejected() {
        assert!(WatchPattern::compile("dev/[unclosed").is_err());
        assert!(WatchPattern::compile("  ").is_err());
    }

    #[test]
    fn relative_paths_use_forward_slashes() {
        let root = Path::new("/project");
        assert_eq!(
            relative_str(root, Path::new("/project/dev/main.js")).as_deref(),
            Some("dev/main.js")
        );
    }
}
