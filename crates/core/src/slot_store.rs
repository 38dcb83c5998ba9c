//! Save-slot storage. The battlefield only needs `put`/`get`; the file store
//! adds listing and deletion for the CLI.
//!
//! Each file slot is a JSON envelope holding the save blob and its SHA-256,
//! written to a temp file and renamed into place.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::SlotStoreError;

pub trait SlotStore {
    fn put(&mut self, slot: &str, blob: &str) -> Result<(), SlotStoreError>;

    /// `Ok(None)` when nothing has been saved under `slot`.
    fn get(&self, slot: &str) -> Result<Option<String>, SlotStoreError>;
}

#[derive(Debug, Default, Clone)]
pub struct MemorySlotStore {
    slots: BTreeMap<String, String>,
}

impl MemorySlotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl SlotStore for MemorySlotStore {
    fn put(&mut self, slot: &str, blob: &str) -> Result<(), SlotStoreError> {
        self.slots.insert(slot.to_string(), blob.to_string());
        Ok(())
    }

    fn get(&self, slot: &str) -> Result<Option<String>, SlotStoreError> {
        Ok(self.slots.get(slot).cloned())
    }
}

const ENVELOPE_VERSION: u16 = 1;
const SLOT_EXTENSION: &str = "json";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
struct SlotEnvelope {
    format_version: u16,
    slot: String,
    sha256_hex: String,
    payload: String,
}

fn payload_sha256(payload: &str) -> String {
    let digest = Sha256::digest(payload.as_bytes());
    format!("{digest:064x}")
}

/// Slot names become file stems, so they are restricted to a safe alphabet.
fn validate_slot_name(slot: &str) -> Result<(), SlotStoreError> {
    let valid = !slot.is_empty()
        && slot.len() <= 64
        && slot.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid { Ok(()) } else { Err(SlotStoreError::InvalidSlotName(slot.to_string())) }
}

#[derive(Debug, Clone)]
pub struct FileSlotStore {
    root: PathBuf,
}

impl FileSlotStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn slot_path(&self, slot: &str) -> Result<PathBuf, SlotStoreError> {
        validate_slot_name(slot)?;
        Ok(self.root.join(format!("{slot}.{SLOT_EXTENSION}")))
    }

    /// Slot names present on disk, sorted.
    pub fn list_slots(&self) -> Result<Vec<String>, SlotStoreError> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }
        let mut slots = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(SLOT_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str())
                && validate_slot_name(stem).is_ok()
            {
                slots.push(stem.to_string());
            }
        }
        slots.sort();
        Ok(slots)
    }

    /// Returns whether a slot existed.
    pub fn delete_slot(&self, slot: &str) -> Result<bool, SlotStoreError> {
        let path = self.slot_path(slot)?;
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(path)?;
        Ok(true)
    }
}

impl SlotStore for FileSlotStore {
    fn put(&mut self, slot: &str, blob: &str) -> Result<(), SlotStoreError> {
        let path = self.slot_path(slot)?;
        fs::create_dir_all(&self.root)?;

        let envelope = SlotEnvelope {
            format_version: ENVELOPE_VERSION,
            slot: slot.to_string(),
            sha256_hex: payload_sha256(blob),
            payload: blob.to_string(),
        };
        let json = serde_json::to_string_pretty(&envelope)?;
        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, json)?;
        fs::rename(&tmp_path, &path)?;
        debug!(target: "auspex::slots", slot, path = %path.display(), "slot written");
        Ok(())
    }

    fn get(&self, slot: &str) -> Result<Option<String>, SlotStoreError> {
        let path = self.slot_path(slot)?;
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)?;
        let envelope: SlotEnvelope = serde_json::from_str(&content)?;
        if payload_sha256(&envelope.payload) != envelope.sha256_hex {
            return Err(SlotStoreError::ChecksumMismatch(slot.to_string()));
        }
        Ok(Some(envelope.payload))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn memory_store_overwrites_and_misses_cleanly() {
        let mut store = MemorySlotStore::new();
        assert_eq!(store.get("alpha").expect("get"), None);
        store.put("alpha", "one").expect("put");
        store.put("alpha", "two").expect("put");
        assert_eq!(store.get("alpha").expect("get").as_deref(), Some("two"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn file_store_writes_atomically_and_lists_slots() {
        let dir = tempdir().expect("tempdir");
        let mut store = FileSlotStore::new(dir.path().join("saves"));
        assert!(store.list_slots().expect("list").is_empty());

        store.put("beta", "{\"round\":2}").expect("put");
        store.put("alpha", "{\"round\":1}").expect("put");
        assert_eq!(store.get("beta").expect("get").as_deref(), Some("{\"round\":2}"));
        assert_eq!(store.list_slots().expect("list"), vec!["alpha", "beta"]);
        assert!(!dir.path().join("saves").join("beta.json.tmp").exists());

        assert!(store.delete_slot("alpha").expect("delete"));
        assert!(!store.delete_slot("alpha").expect("delete"));
        assert_eq!(store.list_slots().expect("list"), vec!["beta"]);
    }

    #[test]
    fn tampered_payload_fails_checksum() {
        let dir = tempdir().expect("tempdir");
        let mut store = FileSlotStore::new(dir.path());
        store.put("gamma", "original").expect("put");

        let path = dir.path().join("gamma.json");
        let raw = fs::read_to_string(&path).expect("read");
        fs::write(&path, raw.replace("original", "modified")).expect("write");

        assert!(matches!(store.get("gamma"), Err(SlotStoreError::ChecksumMismatch(_))));
    }

    #[test]
    fn slot_names_cannot_escape_the_root() {
        let dir = tempdir().expect("tempdir");
        let mut store = FileSlotStore::new(dir.path());
        for bad in ["", "../up", "a/b", "name.json"] {
            assert!(matches!(store.put(bad, "x"), Err(SlotStoreError::InvalidSlotName(_))));
        }
    }
}
