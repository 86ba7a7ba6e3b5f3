// src/store.rs
use anyhow::{Context, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

/// Persists the bounded, newest-first list of already-notified item
/// identifiers, one list per source. Read/write only; no pipeline logic.
pub trait SeenStore: Send + Sync {
    /// Load the persisted seen set. A missing entry is an empty list,
    /// never an error; errors are real I/O failures.
    fn load(&self, source_key: &str) -> Result<Vec<String>>;

    /// Persist `ids` (newest first), truncated to `max_retained`.
    fn save(&self, source_key: &str, ids: &[String], max_retained: usize) -> Result<()>;
}

/// File-backed store: one flat text file per source under `dir`,
/// newline-delimited identifiers, newest first, no header.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, source_key: &str) -> PathBuf {
        self.dir.join(format!("{}_ids.txt", sanitize_key(source_key)))
    }
}

/// Keys come from source names; keep filenames portable.
fn sanitize_key(key: &str) -> String {
    key.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}

fn truncate_ids(ids: &[String], max_retained: usize) -> Vec<&String> {
    ids.iter().take(max_retained).collect()
}

impl SeenStore for FileStore {
    fn load(&self, source_key: &str) -> Result<Vec<String>> {
        let path = self.path_for(source_key);
        let content = match fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(e).with_context(|| format!("reading seen ids from {}", path.display()))
            }
        };
        Ok(content
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect())
    }

    fn save(&self, source_key: &str, ids: &[String], max_retained: usize) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("creating data dir {}", self.dir.display()))?;

        let path = self.path_for(source_key);
        let content = truncate_ids(ids, max_retained)
            .iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join("\n");

        // Temp file + rename so a crash mid-write keeps the previous state.
        let tmp = path.with_extension("txt.tmp");
        fs::write(&tmp, content)
            .with_context(|| format!("writing seen ids to {}", tmp.display()))?;
        fs::rename(&tmp, &path)
            .with_context(|| format!("replacing seen ids at {}", path.display()))?;
        Ok(())
    }
}

// --- Test helper ---
pub struct MemoryStore {
    inner: std::sync::Mutex<std::collections::HashMap<String, Vec<String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: std::sync::Mutex::new(std::collections::HashMap::new()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SeenStore for MemoryStore {
    fn load(&self, source_key: &str) -> Result<Vec<String>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .get(source_key)
            .cloned()
            .unwrap_or_default())
    }

    fn save(&self, source_key: &str, ids: &[String], max_retained: usize) -> Result<()> {
        let truncated = truncate_ids(ids, max_retained)
            .into_iter()
            .cloned()
            .collect();
        self.inner
            .lock()
            .unwrap()
            .insert(source_key.to_string(), truncated);
        Ok(())
    }
}
