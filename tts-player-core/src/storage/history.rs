use std::fs;
use std::path::{Path, PathBuf};

use crate::models::audio_models::Voice;
use crate::models::error::StudioError;
use crate::models::history_entry::HistoryEntry;

/// Most-recent-first list of past generation requests.
///
/// Backed by a JSON file when a path is given; otherwise kept in memory.
#[derive(Debug)]
pub struct HistoryStore {
    path: Option<PathBuf>,
    capacity: usize,
    entries: Vec<HistoryEntry>,
}

impl HistoryStore {
    pub fn in_memory(capacity: usize) -> Self {
        Self {
            path: None,
            capacity: capacity.max(1),
            entries: Vec::new(),
        }
    }

    /// Open a file-backed history. A missing file starts empty; an unreadable
    /// or corrupt file is logged and treated as empty.
    pub fn open(path: impl Into<PathBuf>, capacity: usize) -> Self {
        let path = path.into();
        let mut entries = match read_entries(&path) {
            Ok(entries) => entries,
            Err(e) => {
                log::error!("Error loading request history: {}", e);
                Vec::new()
            }
        };
        let capacity = capacity.max(1);
        entries.truncate(capacity);

        Self {
            path: Some(path),
            capacity,
            entries,
        }
    }

    /// Record a request at the front, evicting the oldest past capacity.
    pub fn record(&mut self, text: &str, voice: Voice) -> Result<&HistoryEntry, StudioError> {
        self.push(HistoryEntry::new(text, voice))?;
        self.entries
            .first()
            .ok_or_else(|| StudioError::StorageError("history is empty after insert".into()))
    }

    pub fn push(&mut self, entry: HistoryEntry) -> Result<(), StudioError> {
        self.entries.insert(0, entry);
        self.entries.truncate(self.capacity);
        self.save()
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) -> Result<(), StudioError> {
        self.entries.clear();
        self.save()
    }

    fn save(&self) -> Result<(), StudioError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| StudioError::StorageError(format!("failed to create directory: {}", e)))?;
        }
        let json = serde_json::to_string_pretty(&self.entries)
            .map_err(|e| StudioError::StorageError(format!("failed to serialize history: {}", e)))?;
        fs::write(path, json)
            .map_err(|e| StudioError::StorageError(format!("failed to write history: {}", e)))?;
        Ok(())
    }
}

fn read_entries(path: &Path) -> Result<Vec<HistoryEntry>, String> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let json = fs::read_to_string(path).map_err(|e| format!("failed to read history: {}", e))?;
    serde_json::from_str(&json).map_err(|e| format!("failed to parse history: {}", e))
}
