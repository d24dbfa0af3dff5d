//! World state - the key-value store a contract reads and writes
//!
//! The host platform owns the world state and hands the contract a handle
//! for the duration of one transaction. [`WorldState`] is that handle.
//!
//! Two key spaces share one ordered map:
//! - **Simple keys**: plain strings, visible to range queries
//! - **Composite keys**: `\u{0}` + object type + `\u{0}` + each attribute + `\u{0}`,
//!   visible only to partial composite key queries
//!
//! Implementations:
//! - [`MemoryWorldState`]: ordered in-memory map with JSON snapshots
//! - [`StagedState`]: transaction overlay with read-your-writes, applied on commit

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Write;
use std::ops::Bound;
use std::path::Path;

use crate::error::{StateError, StateResult};

const COMPOSITE_KEY_NAMESPACE: char = '\u{0}';
const MAX_UNICODE_RUNE: char = '\u{10FFFF}';

/// Storage handle threaded through every contract operation.
pub trait WorldState {
    /// Returns the value at `key`, or `None` when absent.
    fn get_state(&self, key: &str) -> StateResult<Option<Vec<u8>>>;

    fn put_state(&mut self, key: &str, value: Vec<u8>) -> StateResult<()>;

    /// Deleting an absent key is not an error.
    fn del_state(&mut self, key: &str) -> StateResult<()>;

    /// Simple keys in `[start, end)`, in lexicographic byte order.
    ///
    /// An empty `start` or `end` leaves that side of the range open.
    /// Composite keys are never returned.
    fn get_state_by_range(&self, start: &str, end: &str) -> StateResult<Vec<(String, Vec<u8>)>>;

    /// Composite keys starting with the given object type and attributes.
    fn get_state_by_partial_composite_key(
        &self,
        object_type: &str,
        attributes: &[&str],
    ) -> StateResult<Vec<(String, Vec<u8>)>>;
}

// =============================================================================
// Composite Keys
// =============================================================================

/// Builds a composite key from an object type and attributes.
pub fn create_composite_key(object_type: &str, attributes: &[&str]) -> StateResult<String> {
    validate_composite_key_component(object_type)?;

    let mut key = String::with_capacity(
        2 + object_type.len() + attributes.iter().map(|a| a.len() + 1).sum::<usize>(),
    );
    key.push(COMPOSITE_KEY_NAMESPACE);
    key.push_str(object_type);
    key.push(COMPOSITE_KEY_NAMESPACE);

    for attribute in attributes {
        validate_composite_key_component(attribute)?;
        key.push_str(attribute);
        key.push(COMPOSITE_KEY_NAMESPACE);
    }

    Ok(key)
}

fn validate_composite_key_component(component: &str) -> StateResult<()> {
    if component.contains(COMPOSITE_KEY_NAMESPACE) || component.contains(MAX_UNICODE_RUNE) {
        return Err(StateError::InvalidKey(format!(
            "component {component:?} contains a reserved character"
        )));
    }
    Ok(())
}

fn is_composite_key(key: &str) -> bool {
    key.starts_with(COMPOSITE_KEY_NAMESPACE)
}

fn range_bounds<'a>(start: &'a str, end: &'a str) -> (Bound<&'a str>, Bound<&'a str>) {
    let lower = if start.is_empty() {
        Bound::Unbounded
    } else {
        Bound::Included(start)
    };
    let upper = if end.is_empty() {
        Bound::Unbounded
    } else {
        Bound::Excluded(end)
    };
    (lower, upper)
}

fn in_range(key: &str, start: &str, end: &str) -> bool {
    !is_composite_key(key) && (start.is_empty() || key >= start) && (end.is_empty() || key < end)
}

// =============================================================================
// Memory World State
// =============================================================================

/// Ordered in-memory world state.
///
/// Keys are kept in a [`BTreeMap`], so every query returns entries in
/// lexicographic byte order regardless of insertion order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MemoryWorldState {
    entries: BTreeMap<String, Vec<u8>>,
}

/// On-disk form of a [`MemoryWorldState`]. Values are stored as UTF-8 text.
#[derive(Debug, Default, Serialize, Deserialize)]
struct Snapshot {
    entries: BTreeMap<String, String>,
}

impl MemoryWorldState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Loads a snapshot file. A missing file yields an empty state.
    pub fn load(path: &Path) -> StateResult<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let content = std::fs::read_to_string(path)?;
        let snapshot: Snapshot = serde_json::from_str(&content)
            .map_err(|e| StateError::Snapshot(format!("{}: {}", path.display(), e)))?;

        Ok(Self {
            entries: snapshot
                .entries
                .into_iter()
                .map(|(k, v)| (k, v.into_bytes()))
                .collect(),
        })
    }

    /// Writes the state to a snapshot file, replacing it atomically.
    pub fn save(&self, path: &Path) -> StateResult<()> {
        let mut snapshot = Snapshot::default();
        for (key, value) in &self.entries {
            let text = String::from_utf8(value.clone()).map_err(|_| {
                StateError::Snapshot(format!("value at {key:?} is not valid UTF-8"))
            })?;
            snapshot.entries.insert(key.clone(), text);
        }

        let json = serde_json::to_string_pretty(&snapshot)
            .map_err(|e| StateError::Snapshot(e.to_string()))?;

        // Uniquely named sibling of the snapshot
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(json.as_bytes())?;
        tmp.persist(path).map_err(|e| StateError::Io(e.error))?;
        Ok(())
    }
}

impl WorldState for MemoryWorldState {
    fn get_state(&self, key: &str) -> StateResult<Option<Vec<u8>>> {
        Ok(self.entries.get(key).cloned())
    }

    fn put_state(&mut self, key: &str, value: Vec<u8>) -> StateResult<()> {
        if key.is_empty() {
            return Err(StateError::InvalidKey("key must not be empty".to_string()));
        }
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn del_state(&mut self, key: &str) -> StateResult<()> {
        self.entries.remove(key);
        Ok(())
    }

    fn get_state_by_range(&self, start: &str, end: &str) -> StateResult<Vec<(String, Vec<u8>)>> {
        if !start.is_empty() && !end.is_empty() && start > end {
            return Err(StateError::InvalidKey(format!(
                "range start {start:?} is after end {end:?}"
            )));
        }

        Ok(self
            .entries
            .range::<str, _>(range_bounds(start, end))
            .filter(|(k, _)| !is_composite_key(k))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    fn get_state_by_partial_composite_key(
        &self,
        object_type: &str,
        attributes: &[&str],
    ) -> StateResult<Vec<(String, Vec<u8>)>> {
        let prefix = create_composite_key(object_type, attributes)?;

        Ok(self
            .entries
            .range::<str, _>((Bound::Included(prefix.as_str()), Bound::Unbounded))
            .take_while(|(k, _)| k.starts_with(&prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }
}

// =============================================================================
// Staged State (transaction overlay)
// =============================================================================

/// Buffers writes over another world state until [`StagedState::commit`].
///
/// Reads observe the buffered writes. Dropping the overlay without committing
/// discards everything, so a failed operation leaves the underlying state
/// untouched.
pub struct StagedState<'a, S: WorldState> {
    inner: &'a mut S,
    /// `None` marks a pending delete.
    writes: BTreeMap<String, Option<Vec<u8>>>,
}

impl<'a, S: WorldState> StagedState<'a, S> {
    pub fn new(inner: &'a mut S) -> Self {
        Self {
            inner,
            writes: BTreeMap::new(),
        }
    }

    /// Number of keys touched by this transaction.
    pub fn pending_writes(&self) -> usize {
        self.writes.len()
    }

    /// Applies every buffered write and delete to the underlying state.
    pub fn commit(self) -> StateResult<()> {
        for (key, value) in self.writes {
            match value {
                Some(value) => self.inner.put_state(&key, value)?,
                None => self.inner.del_state(&key)?,
            }
        }
        Ok(())
    }

    fn overlay(
        &self,
        base: Vec<(String, Vec<u8>)>,
        matches: impl Fn(&str) -> bool,
    ) -> Vec<(String, Vec<u8>)> {
        let mut merged: BTreeMap<String, Vec<u8>> = base.into_iter().collect();
        for (key, value) in self.writes.iter().filter(|(k, _)| matches(k.as_str())) {
            match value {
                Some(value) => {
                    merged.insert(key.clone(), value.clone());
                }
                None => {
                    merged.remove(key);
                }
            }
        }
        merged.into_iter().collect()
    }
}

impl<S: WorldState> WorldState for StagedState<'_, S> {
    fn get_state(&self, key: &str) -> StateResult<Option<Vec<u8>>> {
        match self.writes.get(key) {
            Some(staged) => Ok(staged.clone()),
            None => self.inner.get_state(key),
        }
    }

    fn put_state(&mut self, key: &str, value: Vec<u8>) -> StateResult<()> {
        if key.is_empty() {
            return Err(StateError::InvalidKey("key must not be empty".to_string()));
        }
        self.writes.insert(key.to_string(), Some(value));
        Ok(())
    }

    fn del_state(&mut self, key: &str) -> StateResult<()> {
        self.writes.insert(key.to_string(), None);
        Ok(())
    }

    fn get_state_by_range(&self, start: &str, end: &str) -> StateResult<Vec<(String, Vec<u8>)>> {
        let base = self.inner.get_state_by_range(start, end)?;
        Ok(self.overlay(base, |k| in_range(k, start, end)))
    }

    fn get_state_by_partial_composite_key(
        &self,
        object_type: &str,
        attributes: &[&str],
    ) -> StateResult<Vec<(String, Vec<u8>)>> {
        let prefix = create_composite_key(object_type, attributes)?;
        let base = self
            .inner
            .get_state_by_partial_composite_key(object_type, attributes)?;
        Ok(self.overlay(base, |k| k.starts_with(&prefix)))
    }
}
