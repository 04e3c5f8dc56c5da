//! File watching for stylesheet hot-reload.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::time::Duration;

use cartograph_core::logging::targets;
use notify::{RecommendedWatcher, RecursiveMode};
use notify_debouncer_mini::{DebouncedEvent, DebouncedEventKind, Debouncer, new_debouncer};

use crate::parser::Parser;
use crate::resolve::StyleResolver;
use crate::rules::Stylesheet;
use crate::{Error, Result};

/// Event indicating a stylesheet file changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StylesheetChangeEvent {
    /// Path to the changed file.
    pub path: PathBuf,
    pub kind: ChangeKind,
}

/// Type of file change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// File was written or created.
    Modified,
    /// File was removed.
    Removed,
}

type EventResult = std::result::Result<Vec<DebouncedEvent>, notify::Error>;

/// Watches stylesheet files for changes.
///
/// # Example
///
/// ```ignore
/// let mut watcher = StylesheetWatcher::new()?;
/// watcher.watch("styles/roads.mss")?;
///
/// // In the render loop:
/// let changes = watcher.poll();
/// if !changes.is_empty() {
///     watcher.apply_changes(&mut resolver, &changes);
/// }
/// ```
pub struct StylesheetWatcher {
    debouncer: Debouncer<RecommendedWatcher>,
    rx: Receiver<EventResult>,
    watched_paths: HashSet<PathBuf>,
    parser: Parser,
}

impl StylesheetWatcher {
    /// Create a watcher that reparses with the default parser.
    pub fn new() -> Result<Self> {
        Self::with_parser(Parser::new())
    }

    /// Create a watcher that reparses with `parser`.
    pub fn with_parser(parser: Parser) -> Result<Self> {
        let (tx, rx) = mpsc::channel();

        let debouncer = new_debouncer(Duration::from_millis(100), tx)
            .map_err(|e| Error::HotReload(e.to_string()))?;

        Ok(Self {
            debouncer,
            rx,
            watched_paths: HashSet::new(),
            parser,
        })
    }

    /// Start watching a stylesheet file.
    pub fn watch(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path
            .as_ref()
            .canonicalize()
            .map_err(|e| Error::io(path.as_ref(), e))?;

        if !self.watched_paths.contains(&path) {
            self.debouncer
                .watcher()
                .watch(&path, RecursiveMode::NonRecursive)
                .map_err(|e| Error::HotReload(e.to_string()))?;

            tracing::info!(target: targets::RELOAD, path = %path.display(), "watching stylesheet");
            self.watched_paths.insert(path);
        }

        Ok(())
    }

    /// Stop watching a stylesheet file.
    pub fn unwatch(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = match path.as_ref().canonicalize() {
            Ok(p) => p,
            // already gone, nothing is watching it
            Err(_) => return Ok(()),
        };

        if self.watched_paths.remove(&path) {
            let _ = self.debouncer.watcher().unwatch(&path);
            tracing::info!(target: targets::RELOAD, path = %path.display(), "stopped watching stylesheet");
        }

        Ok(())
    }

    /// Drain pending file events.
    ///
    /// Returns one event per changed file, sorted by path.
    pub fn poll(&mut self) -> Vec<StylesheetChangeEvent> {
        let mut changes = vec![];

        loop {
            match self.rx.try_recv() {
                Ok(Ok(events)) => {
                    for event in events {
                        if event.kind != DebouncedEventKind::Any
                            || !self.watched_paths.contains(&event.path)
                        {
                            continue;
                        }
                        let kind = if event.path.exists() {
                            ChangeKind::Modified
                        } else {
                            ChangeKind::Removed
                        };
                        changes.push(StylesheetChangeEvent {
                            path: event.path,
                            kind,
                        });
                    }
                }
                Ok(Err(e)) => {
                    tracing::warn!(target: targets::RELOAD, error = %e, "file watcher error");
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    tracing::error!(target: targets::RELOAD, "file watcher disconnected");
                    break;
                }
            }
        }

        changes.sort_by(|a, b| a.path.cmp(&b.path));
        changes.dedup_by(|a, b| a.path == b.path);
        changes
    }

    /// Apply changes to a resolver.
    ///
    /// Modified files are reparsed and replace their previous version;
    /// removed files are dropped. A file that fails to parse keeps its
    /// previous version loaded. Returns the number of stylesheets reloaded.
    pub fn apply_changes(
        &self,
        resolver: &mut StyleResolver,
        changes: &[StylesheetChangeEvent],
    ) -> usize {
        let mut reloaded = 0;
        for change in changes {
            let path = change.path.as_path();
            match change.kind {
                ChangeKind::Modified => match Stylesheet::from_file_with(path, &self.parser) {
                    Ok(sheet) => {
                        resolver.replace_stylesheet_by_path(path, sheet);
                        reloaded += 1;
                        tracing::info!(
                            target: targets::RELOAD,
                            path = %path.display(),
                            rules = resolver.rule_count(),
                            "reloaded stylesheet"
                        );
                    }
                    Err(e) => {
                        tracing::error!(
                            target: targets::RELOAD,
                            path = %path.display(),
                            error = %e,
                            "failed to reload stylesheet"
                        );
                    }
                },
                ChangeKind::Removed => {
                    tracing::info!(target: targets::RELOAD, path = %path.display(), "stylesheet removed");
                    resolver.remove_stylesheet_by_path(path);
                }
            }
        }
        reloaded
    }

    /// Get the number of watched files.
    pub fn watched_count(&self) -> usize {
        self.watched_paths.len()
    }

    /// Get the watched paths.
    pub fn watched_paths(&self) -> impl Iterator<Item = &Path> {
        self.watched_paths.iter().map(|p| p.as_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    use cartograph_core::Feature;
    use tempfile::tempdir;

    #[test]
    fn watch_and_unwatch() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("roads.mss");
        fs::write(&file_path, "#roads { line-width: 1; }").unwrap();

        let mut watcher = StylesheetWatcher::new().unwrap();
        watcher.watch(&file_path).unwrap();
        watcher.watch(&file_path).unwrap();
        assert_eq!(watcher.watched_count(), 1);

        watcher.unwatch(&file_path).unwrap();
        assert_eq!(watcher.watched_count(), 0);
    }

    #[test]
    fn watch_missing_file() {
        let dir = tempdir().unwrap();
        let mut watcher = StylesheetWatcher::new().unwrap();
        let err = watcher.watch(dir.path().join("missing.mss")).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn apply_changes_reloads_and_removes() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("roads.mss");
        fs::write(&file_path, "#roads { line-width: 1; }").unwrap();

        let mut resolver = StyleResolver::new();
        resolver.add_stylesheet(Stylesheet::from_file(&file_path).unwrap());

        fs::write(&file_path, "#roads { line-width: 3; }").unwrap();
        let watcher = StylesheetWatcher::new().unwrap();
        let modified = [StylesheetChangeEvent {
            path: file_path.clone(),
            kind: ChangeKind::Modified,
        }];
        assert_eq!(watcher.apply_changes(&mut resolver, &modified), 1);
        assert_eq!(resolver.stylesheet_count(), 1);
        let passes = resolver.resolve(Some("roads"), &Feature::new());
        assert_eq!(
            passes[0].properties.get("line-width").and_then(|v| v.as_f64()),
            Some(3.0)
        );

        // a broken edit keeps the previous version
        fs::write(&file_path, "#roads { line-width: 5; ").unwrap();
        assert_eq!(watcher.apply_changes(&mut resolver, &modified), 0);
        assert_eq!(resolver.stylesheet_count(), 1);

        let removed = [StylesheetChangeEvent {
            path: file_path,
            kind: ChangeKind::Removed,
        }];
        watcher.apply_changes(&mut resolver, &removed);
        assert_eq!(resolver.stylesheet_count(), 0);
    }

    #[test]
    fn reload_keeps_stylesheet_precedence() {
        let dir = tempdir().unwrap();
        let base = dir.path().join("base.mss");
        let overrides = dir.path().join("overrides.mss");
        fs::write(&base, "#roads { line-width: 1; }").unwrap();
        fs::write(&overrides, "#roads { line-width: 2; }").unwrap();

        let mut resolver = StyleResolver::new();
        resolver.add_stylesheet(Stylesheet::from_file(&base).unwrap());
        resolver.add_stylesheet(Stylesheet::from_file(&overrides).unwrap());

        let width = |resolver: &StyleResolver| {
            resolver.resolve(Some("roads"), &Feature::new())[0]
                .properties
                .get("line-width")
                .and_then(|v| v.as_f64())
        };
        assert_eq!(width(&resolver), Some(2.0));

        let watcher = StylesheetWatcher::new().unwrap();
        let modified = [StylesheetChangeEvent {
            path: base.clone(),
            kind: ChangeKind::Modified,
        }];
        assert_eq!(watcher.apply_changes(&mut resolver, &modified), 1);
        assert_eq!(resolver.stylesheet_count(), 2);
        assert_eq!(width(&resolver), Some(2.0));
        assert_eq!(
            resolver.stylesheets()[0].source_path.as_deref(),
            Some(base.as_path())
        );
    }
}
