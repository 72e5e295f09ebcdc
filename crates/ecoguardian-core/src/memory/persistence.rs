//! JSON export and import of a memory bank.
//!
//! The document carries values and metadata only. The context index is
//! always rebuilt from the imported metadata.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use super::bank::MemoryBank;
use super::entry::EntryMetadata;
use super::error::MemoryResult;
use super::stats::MemoryStatistics;
use crate::obs;

/// On-disk form of a memory bank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportDocument {
    #[serde(default)]
    pub memory_store: BTreeMap<String, Value>,
    #[serde(default)]
    pub memory_metadata: BTreeMap<String, EntryMetadata>,
    pub export_timestamp: DateTime<Utc>,
    /// Informational; ignored on import.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statistics: Option<MemoryStatistics>,
}

impl ExportDocument {
    /// Read and parse a document without touching any bank.
    pub fn read(path: &Path) -> MemoryResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write the document as pretty-printed JSON.
    pub fn write(&self, path: &Path) -> MemoryResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

impl MemoryBank {
    /// Snapshot the bank into an [`ExportDocument`].
    pub fn to_document(&self) -> ExportDocument {
        ExportDocument {
            memory_store: self.memory_store.clone(),
            memory_metadata: self.memory_metadata.clone(),
            export_timestamp: self.clock.now(),
            statistics: Some(self.get_statistics()),
        }
    }

    /// Write the whole bank to `path`.
    pub fn export(&self, path: impl AsRef<Path>) -> MemoryResult<()> {
        let path = path.as_ref();
        match self.to_document().write(path) {
            Ok(()) => {
                obs::emit_memory_exported(path, self.memory_store.len());
                Ok(())
            }
            Err(e) => {
                obs::emit_persistence_error("export", path, &e);
                Err(e)
            }
        }
    }

    /// Load a document from `path`.
    ///
    /// With `merge == false` the bank is emptied first; otherwise imported
    /// entries overwrite same-named ones. On any read or parse failure the
    /// bank is left unchanged.
    pub fn import(&mut self, path: impl AsRef<Path>, merge: bool) -> MemoryResult<()> {
        let path = path.as_ref();
        let document = match ExportDocument::read(path) {
            Ok(document) => document,
            Err(e) => {
                obs::emit_persistence_error("import", path, &e);
                return Err(e);
            }
        };

        self.apply_document(document, merge);
        obs::emit_memory_imported(path, self.memory_store.len(), merge);
        Ok(())
    }

    /// Install the contents of an already parsed document.
    ///
    /// Values without a metadata record get a fresh one; metadata without a
    /// value is dropped, so every stored key keeps exactly one record.
    pub fn apply_document(&mut self, document: ExportDocument, merge: bool) {
        if !merge {
            self.memory_store.clear();
            self.memory_metadata.clear();
        }

        let now = self.clock.now();
        let ExportDocument {
            memory_store,
            mut memory_metadata,
            ..
        } = document;

        for (key, value) in memory_store {
            let metadata = memory_metadata.remove(&key).unwrap_or_else(|| {
                EntryMetadata::fresh(
                    now,
                    None,
                    Default::default(),
                    super::bank::value_size(&value),
                )
            });
            self.memory_metadata.insert(key.clone(), metadata);
            self.memory_store.insert(key, value);
        }
        if !memory_metadata.is_empty() {
            warn!(
                event = "memory.import_orphan_metadata",
                dropped = memory_metadata.len(),
            );
        }

        self.context_index.rebuild(
            self.memory_metadata
                .iter()
                .map(|(key, meta)| (key, &meta.context)),
        );

        let len = self.memory_store.len();
        let max = self.config.max_memory_size;
        if len > max {
            warn!(event = "memory.import_over_capacity", entries = len, max = max);
            self.evict_lowest(len - max);
        }
    }
}
