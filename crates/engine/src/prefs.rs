use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{EngineError, Result};
use crate::range::Range;

/// Key-value store for per-media trim ranges.
pub trait PreferenceStore {
    fn get(&self, media_id: &str) -> Option<Range>;

    fn set(&mut self, media_id: &str, range: Range) -> Result<()>;
}

impl<S> PreferenceStore for Box<S>
where
    S: PreferenceStore + ?Sized,
{
    fn get(&self, media_id: &str) -> Option<Range> {
        (**self).get(media_id)
    }

    fn set(&mut self, media_id: &str, range: Range) -> Result<()> {
        (**self).set(media_id, range)
    }
}

/// Process-local store that forgets everything on exit.
#[derive(Debug, Clone, Default)]
pub struct MemoryPreferenceStore {
    entries: HashMap<String, Range>,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn get(&self, media_id: &str) -> Option<Range> {
        self.entries.get(media_id).copied()
    }

    fn set(&mut self, media_id: &str, range: Range) -> Result<()> {
        self.entries.insert(media_id.to_owned(), range);
        Ok(())
    }
}

/// Store persisted as one JSON object mapping media ids to `[start, end]`.
///
/// The whole file is loaded on open and rewritten on every `set`. A failed
/// write keeps the new value in memory.
///
/// # Example
/// ```no_run
/// use engine::{JsonFilePreferenceStore, PreferenceStore, Range};
///
/// let mut store = JsonFilePreferenceStore::open("trim-ranges.json").expect("open store");
/// store.set("dQw4w9WgXcQ", Range::new(10.0, 90.0)).expect("persist range");
/// ```
#[derive(Debug)]
pub struct JsonFilePreferenceStore {
    path: PathBuf,
    entries: BTreeMap<String, Range>,
}

impl JsonFilePreferenceStore {
    /// Opens the store at `path`. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(contents) if contents.trim().is_empty() => BTreeMap::new(),
            Ok(contents) => serde_json::from_str(&contents).map_err(|source| {
                EngineError::PreferenceSerialization {
                    path: path.clone(),
                    source,
                }
            })?,
            Err(error) if error.kind() == ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => {
                return Err(EngineError::PreferenceIo {
                    context: "failed to read trim preferences",
                    path,
                    source,
                });
            }
        };
        debug!(path = ?path, entries = entries.len(), "trim preferences loaded");

        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| EngineError::PreferenceIo {
                context: "failed to create trim preference directory",
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let json = serde_json::to_string_pretty(&self.entries).map_err(|source| {
            EngineError::PreferenceSerialization {
                path: self.path.clone(),
                source,
            }
        })?;
        fs::write(&self.path, json).map_err(|source| EngineError::PreferenceIo {
            context: "failed to write trim preferences",
            path: self.path.clone(),
            source,
        })
    }
}

impl PreferenceStore for JsonFilePreferenceStore {
    fn get(&self, media_id: &str) -> Option<Range> {
        self.entries.get(media_id).copied()
    }

    fn set(&mut self, media_id: &str, range: Range) -> Result<()> {
        self.entries.insert(media_id.to_owned(), range);
        self.write()
    }
}
