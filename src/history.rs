use crate::error::{ShellError, ShellResult};
use std::borrow::Cow;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Ordered log of submitted lines with a navigation cursor.
///
/// The cursor ranges over `0..=len`; `cursor == len` is the blank line past the
/// newest entry. Every submission resets the cursor there.
#[derive(Debug, Clone, Default)]
pub struct HistoryStore {
    entries: Vec<String>,
    cursor: usize,
    path: Option<PathBuf>,
}

impl HistoryStore {
    /// A store with no backing file; `save` is a no-op.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Start from `entries` with no backing file.
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entries: Vec<String> = entries.into_iter().map(Into::into).collect();
        Self {
            cursor: entries.len(),
            entries,
            path: None,
        }
    }

    /// Read the history persisted at `path`.
    ///
    /// Blank lines are skipped and surrounding whitespace is trimmed. A missing
    /// file is an empty history. The store remembers `path` for [`save`](Self::save)
    /// even when loading fails.
    pub fn load(path: impl Into<PathBuf>) -> (Self, Option<ShellError>) {
        let path = path.into();
        let mut store = Self {
            path: Some(path.clone()),
            ..Self::default()
        };
        match fs::read(&path) {
            Ok(bytes) => {
                // A stray non-UTF-8 byte must not cost the rest of the history.
                let content = String::from_utf8_lossy(&bytes);
                if let Cow::Owned(_) = content {
                    tracing::warn!(path = %path.display(), "history contains invalid UTF-8");
                }
                store.entries = content
                    .lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty())
                    .map(str::to_owned)
                    .collect();
                store.cursor = store.entries.len();
                tracing::info!(
                    path = %path.display(),
                    entries = store.entries.len(),
                    "history loaded"
                );
                (store, None)
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => (store, None),
            Err(source) => (store, Some(ShellError::History { path, source })),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Record a submitted line and move the cursor past the end.
    pub fn append(&mut self, line: impl Into<String>) {
        self.entries.push(line.into());
        self.reset_cursor();
    }

    pub fn reset_cursor(&mut self) {
        self.cursor = self.entries.len();
    }

    /// Step towards older entries and return the text the input buffer should show.
    pub fn back(&mut self) -> &str {
        self.cursor = self.cursor.saturating_sub(1);
        self.current()
    }

    /// Step towards newer entries and return the text the input buffer should show.
    /// Stepping past the newest entry yields the blank line.
    pub fn forward(&mut self) -> &str {
        if self.cursor < self.entries.len() {
            self.cursor += 1;
        }
        self.current()
    }

    fn current(&self) -> &str {
        self.entries
            .get(self.cursor)
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Overwrite the backing file with every entry, one per line.
    pub fn save(&self) -> ShellResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let history_error = |source| ShellError::History {
            path: path.clone(),
            source,
        };
        let mut file = io::BufWriter::new(fs::File::create(path).map_err(history_error)?);
        for entry in &self.entries {
            writeln!(file, "{}", entry).map_err(history_error)?;
        }
        file.flush().map_err(history_error)?;
        tracing::info!(path = %path.display(), entries = self.entries.len(), "history saved");
        Ok(())
    }
}
