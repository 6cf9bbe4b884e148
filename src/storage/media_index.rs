//! Managed picture index.
//!
//! Mirrors how a platform media store owns shared pictures: callers insert an
//! entry with a display name and MIME type, get back a writable stream, and the
//! index decides the file name on disk. Entries stay pending until published.
//! The index file itself lives in an app-private directory, apart from the
//! pictures it describes.

use crate::error::{MemeError, MemeResult};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub const INDEX_FILE_NAME: &str = ".meme_gallery_index.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaEntry {
    pub id: u64,
    pub display_name: String,
    pub mime_type: String,
    pub relative_path: String,
    /// Name of the file on disk, unique within the index root
    pub file_name: String,
    #[serde(default)]
    pub pending: bool,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct IndexFile {
    next_id: u64,
    entries: Vec<MediaEntry>,
}

pub struct MediaIndex {
    root: PathBuf,
    index_dir: PathBuf,
    lock: Mutex<()>,
}

impl std::fmt::Debug for MediaIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaIndex")
            .field("root", &self.root)
            .field("index_dir", &self.index_dir)
            .finish()
    }
}

impl MediaIndex {
    /// Index of pictures stored under `root`, bookkept in `index_dir`
    pub fn new(root: impl Into<PathBuf>, index_dir: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            index_dir: index_dir.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_of(&self, entry: &MediaEntry) -> PathBuf {
        self.root.join(&entry.file_name)
    }

    pub fn index_path(&self) -> PathBuf {
        self.index_dir.join(INDEX_FILE_NAME)
    }

    fn load(&self) -> MemeResult<IndexFile> {
        let path = self.index_path();
        if !path.exists() {
            return Ok(IndexFile::default());
        }
        let content = std::fs::read_to_string(&path)?;
        serde_json::from_str(&content)
            .map_err(|e| MemeError::Index(format!("corrupt index {:?}: {}", path, e)))
    }

    fn store(&self, index: &IndexFile) -> MemeResult<()> {
        std::fs::create_dir_all(&self.index_dir)?;
        let path = self.index_path();
        let tmp = self.index_dir.join(format!("{}.tmp", INDEX_FILE_NAME));
        std::fs::write(&tmp, serde_json::to_string_pretty(index)?)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn lock(&self) -> MemeResult<std::sync::MutexGuard<'_, ()>> {
        self.lock
            .lock()
            .map_err(|_| MemeError::Index("index lock poisoned".to_string()))
    }

    fn with_index<T>(&self, f: impl FnOnce(&mut IndexFile) -> MemeResult<T>) -> MemeResult<T> {
        let _guard = self.lock()?;
        let mut index = self.load()?;
        let result = f(&mut index)?;
        self.store(&index)?;
        Ok(result)
    }

    /// All entries, including pending ones
    pub fn entries(&self) -> MemeResult<Vec<MediaEntry>> {
        let _guard = self.lock()?;
        Ok(self.load()?.entries)
    }

    /// Insert a pending entry and open its file for writing.
    /// A display name already in use gets a ` (n)` suffix on disk.
    pub fn insert(
        &self,
        display_name: &str,
        mime_type: &str,
        relative_path: &str,
    ) -> MemeResult<(MediaEntry, File)> {
        std::fs::create_dir_all(&self.root)?;

        let _guard = self.lock()?;
        let mut index = self.load()?;
        let (file_name, file) = self.create_unique(display_name, &index)?;
        let entry = MediaEntry {
            id: index.next_id,
            display_name: display_name.to_string(),
            mime_type: mime_type.to_string(),
            relative_path: relative_path.to_string(),
            file_name,
            pending: true,
        };
        index.next_id += 1;
        index.entries.push(entry.clone());

        // an unrecorded file would be an orphan nobody cleans up
        if let Err(e) = self.store(&index) {
            drop(file);
            let path = self.path_of(&entry);
            if let Err(remove_err) = std::fs::remove_file(&path) {
                log::warn!("Failed to remove {:?}: {}", path, remove_err);
            }
            return Err(e);
        }

        log::debug!("Inserted media entry {} as {}", entry.id, entry.file_name);
        Ok((entry, file))
    }

    fn create_unique(&self, display_name: &str, index: &IndexFile) -> MemeResult<(String, File)> {
        let (stem, ext) = match display_name.rsplit_once('.') {
            Some((stem, ext)) => (stem, Some(ext)),
            None => (display_name, None),
        };

        for n in 0u32.. {
            let candidate = match (n, ext) {
                (0, _) => display_name.to_string(),
                (n, Some(ext)) => format!("{} ({}).{}", stem, n, ext),
                (n, None) => format!("{} ({})", stem, n),
            };
            if index.entries.iter().any(|e| e.file_name == candidate) {
                continue;
            }
            match OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(self.root.join(&candidate))
            {
                Ok(file) => return Ok((candidate, file)),
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Err(MemeError::Index(format!("no free file name for {}", display_name)))
    }

    /// Mark an entry as complete
    pub fn publish(&self, id: u64) -> MemeResult<()> {
        self.with_index(|index| {
            match index.entries.iter_mut().find(|e| e.id == id) {
                Some(entry) => {
                    entry.pending = false;
                    Ok(())
                }
                None => Err(MemeError::Index(format!("unknown entry {}", id))),
            }
        })
    }

    /// Drop an entry and its file, e.g. after a failed write
    pub fn discard(&self, id: u64) -> MemeResult<()> {
        self.with_index(|index| {
            if let Some(pos) = index.entries.iter().position(|e| e.id == id) {
                let entry = index.entries.remove(pos);
                let path = self.root.join(&entry.file_name);
                if let Err(e) = std::fs::remove_file(&path) {
                    log::warn!("Failed to remove {:?}: {}", path, e);
                }
            }
            Ok(())
        })
    }
}
