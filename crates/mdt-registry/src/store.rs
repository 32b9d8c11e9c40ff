//! RegistryStore - the persisted agent registry.
//!
//! Readers take a cheap snapshot (`Arc<RegistryDocument>`) and never observe a
//! half-applied mutation. Writers are serialized through a gate; a mutation is
//! written to disk first and only then swapped in, so a failed write leaves
//! the visible state untouched.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use tracing::{debug, info, warn};

use crate::atomic::{atomic_write_json, read_optional};
use crate::descriptor::{AgentDescriptor, RegistryDocument, RegistrySettings};
use crate::error::{RegistryError, Result};

/// Thread-safe registry backed by an optional JSON file.
pub struct RegistryStore {
    /// Backing file, `None` for a purely in-memory registry.
    path: Option<PathBuf>,
    current: RwLock<Arc<RegistryDocument>>,
    write_gate: Mutex<()>,
    /// Bumped on every visible change; resolvers use it to drop stale handles.
    generation: AtomicU64,
}

impl RegistryStore {
    /// Open the registry stored at `path`.
    ///
    /// A missing file yields an empty registry. A malformed file is an error.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let doc = load_document(&path)?;
        info!(path = %path.display(), agents = doc.agents.len(), "Loaded agent registry");
        Ok(Self::build(Some(path), doc))
    }

    /// Registry that lives only in memory. `persist` is a no-op.
    pub fn in_memory(mut doc: RegistryDocument) -> Self {
        doc.normalize();
        Self::build(None, doc)
    }

    fn build(path: Option<PathBuf>, doc: RegistryDocument) -> Self {
        Self {
            path,
            current: RwLock::new(Arc::new(doc)),
            write_gate: Mutex::new(()),
            generation: AtomicU64::new(0),
        }
    }

    /// Backing file, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Counter that changes whenever the visible document changes.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Current document.
    pub fn snapshot(&self) -> Result<Arc<RegistryDocument>> {
        let guard = self
            .current
            .read()
            .map_err(|e| RegistryError::LockPoisoned(e.to_string()))?;
        Ok(Arc::clone(&guard))
    }

    /// All agents in enumeration order.
    pub fn list(&self) -> Result<Vec<AgentDescriptor>> {
        Ok(self.snapshot()?.agents.values().cloned().collect())
    }

    /// One agent by name.
    pub fn get(&self, name: &str) -> Result<Option<AgentDescriptor>> {
        Ok(self.snapshot()?.agents.get(name).cloned())
    }

    /// Global settings.
    pub fn settings(&self) -> Result<RegistrySettings> {
        Ok(self.snapshot()?.settings.clone())
    }

    /// Insert or replace an agent in memory without writing the file.
    pub fn upsert(&self, name: &str, descriptor: AgentDescriptor) -> Result<()> {
        self.mutate(false, |doc| {
            doc.insert(name, descriptor);
            Ok(())
        })
    }

    /// Write the current document to the backing file.
    pub fn persist(&self) -> Result<()> {
        let _gate = self.lock_gate()?;
        let doc = self.snapshot()?;
        if let Some(path) = &self.path {
            atomic_write_json(path, doc.as_ref())?;
            debug!(path = %path.display(), "Persisted agent registry");
        }
        Ok(())
    }

    /// Insert or replace an agent and persist, as one step.
    ///
    /// Either both happen or neither is observed.
    pub fn upsert_and_persist(&self, name: &str, descriptor: AgentDescriptor) -> Result<()> {
        self.mutate(true, |doc| {
            doc.insert(name, descriptor);
            Ok(())
        })
    }

    /// Add a new agent, failing if the name is taken.
    pub fn add(&self, name: &str, descriptor: AgentDescriptor) -> Result<()> {
        self.mutate(true, |doc| {
            if doc.agents.contains_key(name) {
                return Err(RegistryError::AgentExists(name.to_string()));
            }
            doc.insert(name, descriptor);
            Ok(())
        })
    }

    /// Apply `update` to an existing agent and persist.
    pub fn update<F>(&self, name: &str, update: F) -> Result<AgentDescriptor>
    where
        F: FnOnce(&mut AgentDescriptor),
    {
        let mut updated = None;
        self.mutate(true, |doc| {
            let descriptor = doc
                .agents
                .get_mut(name)
                .ok_or_else(|| RegistryError::AgentNotFound(name.to_string()))?;
            update(descriptor);
            descriptor.name = name.to_string();
            updated = Some(descriptor.clone());
            Ok(())
        })?;
        updated.ok_or_else(|| RegistryError::AgentNotFound(name.to_string()))
    }

    /// Set an agent's enabled flag and persist.
    pub fn set_enabled(&self, name: &str, enabled: bool) -> Result<AgentDescriptor> {
        self.update(name, |d| d.enabled = enabled)
    }

    /// Remove an agent and persist. Returns the removed descriptor.
    pub fn remove(&self, name: &str) -> Result<AgentDescriptor> {
        let mut removed = None;
        self.mutate(true, |doc| {
            removed = doc.agents.remove(name);
            if removed.is_none() {
                return Err(RegistryError::AgentNotFound(name.to_string()));
            }
            Ok(())
        })?;
        removed.ok_or_else(|| RegistryError::AgentNotFound(name.to_string()))
    }

    /// Replace the settings section and persist.
    pub fn update_settings<F>(&self, update: F) -> Result<RegistrySettings>
    where
        F: FnOnce(&mut RegistrySettings),
    {
        let mut settings = None;
        self.mutate(true, |doc| {
            update(&mut doc.settings);
            settings = Some(doc.settings.clone());
            Ok(())
        })?;
        Ok(settings.unwrap_or_default())
    }

    /// Re-read the backing file.
    ///
    /// On failure the previous document stays visible and the error is
    /// returned. In-memory registries only bump the generation.
    pub fn reload(&self) -> Result<()> {
        let _gate = self.lock_gate()?;
        if let Some(path) = &self.path {
            let doc = load_document(path)?;
            info!(path = %path.display(), agents = doc.agents.len(), "Reloaded agent registry");
            self.swap(doc)?;
        } else {
            self.generation.fetch_add(1, Ordering::AcqRel);
        }
        Ok(())
    }

    fn mutate<F>(&self, persist: bool, apply: F) -> Result<()>
    where
        F: FnOnce(&mut RegistryDocument) -> Result<()>,
    {
        let _gate = self.lock_gate()?;
        let mut next = self.snapshot()?.as_ref().clone();
        apply(&mut next)?;

        if persist {
            if let Some(path) = &self.path {
                atomic_write_json(path, &next)?;
                debug!(path = %path.display(), "Persisted agent registry");
            }
        }

        self.swap(next)
    }

    fn swap(&self, doc: RegistryDocument) -> Result<()> {
        let mut guard = self
            .current
            .write()
            .map_err(|e| RegistryError::LockPoisoned(e.to_string()))?;
        *guard = Arc::new(doc);
        self.generation.fetch_add(1, Ordering::AcqRel);
        Ok(())
    }

    fn lock_gate(&self) -> Result<std::sync::MutexGuard<'_, ()>> {
        self.write_gate
            .lock()
            .map_err(|e| RegistryError::LockPoisoned(e.to_string()))
    }
}

fn load_document(path: &Path) -> Result<RegistryDocument> {
    match read_optional(path)? {
        Some(data) => RegistryDocument::from_json(&data).map_err(|source| RegistryError::Parse {
            path: path.to_path_buf(),
            source,
        }),
        None => {
            warn!(path = %path.display(), "Agent registry file not found, starting empty");
            Ok(RegistryDocument::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::LoadRef;
    use tempfile::tempdir;

    fn descriptor(description: &str) -> AgentDescriptor {
        AgentDescriptor::new("", LoadRef::new("echo"), description)
    }

    #[test]
    fn test_open_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let store = RegistryStore::open(dir.path().join("agents.json")).unwrap();
        assert!(store.list().unwrap().is_empty());
        assert_eq!(store.settings().unwrap().summary_agent_name, "SummaryAgent");
    }

    #[test]
    fn test_open_malformed_file_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("agents.json");
        std::fs::write(&path, "{not json").unwrap();

        assert!(matches!(
            RegistryStore::open(&path),
            Err(RegistryError::Parse { .. })
        ));
    }

    #[test]
    fn test_upsert_and_persist_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("agents.json");
        let store = RegistryStore::open(&path).unwrap();

        store
            .upsert_and_persist("CardiologistAgent", descriptor("heart"))
            .unwrap();

        let reopened = RegistryStore::open(&path).unwrap();
        let agent = reopened.get("CardiologistAgent").unwrap().unwrap();
        assert_eq!(agent.name, "CardiologistAgent");
        assert_eq!(agent.description_text(), "heart");
    }

    #[test]
    fn test_upsert_without_persist_is_memory_only() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("agents.json");
        let store = RegistryStore::open(&path).unwrap();

        store.upsert("A", descriptor("a")).unwrap();
        assert!(store.get("A").unwrap().is_some());
        assert!(!path.exists());

        store.persist().unwrap();
        assert!(RegistryStore::open(&path).unwrap().get("A").unwrap().is_some());
    }

    #[test]
    fn test_failed_persist_leaves_state_unchanged() {
        let dir = tempdir().unwrap();
        let sub = dir.path().join("sub");
        std::fs::create_dir(&sub).unwrap();
        let store = RegistryStore::open(sub.join("agents.json")).unwrap();
        // parent becomes a regular file, so the write cannot succeed
        std::fs::remove_dir(&sub).unwrap();
        std::fs::write(&sub, "x").unwrap();

        let before = store.generation();
        assert!(store.upsert_and_persist("A", descriptor("a")).is_err());
        assert!(store.get("A").unwrap().is_none());
        assert_eq!(store.generation(), before);
    }

    #[test]
    fn test_add_rejects_duplicates() {
        let store = RegistryStore::in_memory(RegistryDocument::default());
        store.add("A", descriptor("a")).unwrap();
        assert!(matches!(
            store.add("A", descriptor("b")),
            Err(RegistryError::AgentExists(_))
        ));
    }

    #[test]
    fn test_enable_disable_remove() {
        let store = RegistryStore::in_memory(RegistryDocument::default());
        store.add("A", descriptor("a")).unwrap();

        let disabled = store.set_enabled("A", false).unwrap();
        assert!(!disabled.enabled);
        assert!(!store.get("A").unwrap().unwrap().enabled);

        let removed = store.remove("A").unwrap();
        assert_eq!(removed.name, "A");
        assert!(matches!(
            store.remove("A"),
            Err(RegistryError::AgentNotFound(_))
        ));
    }

    #[test]
    fn test_reload_picks_up_external_edit() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("agents.json");
        let store = RegistryStore::open(&path).unwrap();
        store.upsert_and_persist("A", descriptor("a")).unwrap();

        let mut doc = store.snapshot().unwrap().as_ref().clone();
        doc.insert("B", descriptor("b"));
        atomic_write_json(&path, &doc).unwrap();

        let before = store.generation();
        store.reload().unwrap();
        assert!(store.generation() > before);
        assert_eq!(store.list().unwrap().len(), 2);
    }

    #[test]
    fn test_reload_malformed_keeps_previous_state() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("agents.json");
        let store = RegistryStore::open(&path).unwrap();
        store.upsert_and_persist("A", descriptor("a")).unwrap();

        std::fs::write(&path, "{\"agents\": 42").unwrap();
        assert!(store.reload().is_err());
        assert!(store.get("A").unwrap().is_some());
    }

    #[test]
    fn test_snapshot_isolated_from_later_writes() {
        let store = RegistryStore::in_memory(RegistryDocument::default());
        let snapshot = store.snapshot().unwrap();
        store.upsert("A", descriptor("a")).unwrap();
        assert!(snapshot.agents.is_empty());
    }

    #[test]
    fn test_update_settings() {
        let store = RegistryStore::in_memory(RegistryDocument::default());
        let settings = store
            .update_settings(|s| s.summary_agent_name = "Merger".into())
            .unwrap();
        assert_eq!(settings.summary_agent_name, "Merger");
        assert_eq!(store.settings().unwrap().summary_agent_name, "Merger");
    }
}
