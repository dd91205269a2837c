use std::collections::HashMap;

use thiserror::Error;

use super::RegistryKey;

#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum RegistryError {
    #[error("{kind}: {key} already owns an instance")]
    DuplicateKey { kind: &'static str, key: String },
}

/// Keyed table of uniquely owned subsystem instances.
///
/// Precondition: render thread only. There is no internal locking and no
/// runtime check; the registry lives inside render-thread state and is never
/// shared.
pub struct SystemRegistry<K: RegistryKey, S> {
    kind: &'static str,
    systems: HashMap<K, Box<S>>,
}

impl<K: RegistryKey, S> SystemRegistry<K, S> {
    /// `kind` names the subsystem in diagnostics ("window", "scene").
    pub fn new(kind: &'static str) -> Self {
        Self {
            kind,
            systems: HashMap::new(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.systems.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }

    #[inline]
    pub fn contains(&self, key: K) -> bool {
        self.systems.contains_key(&key)
    }

    /// Takes ownership of `system` under `key`.
    ///
    /// If `key` is already owned, logs a warning, drops `system` and keeps
    /// the existing instance.
    pub fn create_new(&mut self, key: K, system: S) -> Result<&mut S, RegistryError> {
        use std::collections::hash_map::Entry;

        match self.systems.entry(key) {
            Entry::Occupied(_) => {
                log::warn!("{}: create rejected, {key} already exists", self.kind);
                Err(RegistryError::DuplicateKey {
                    kind: self.kind,
                    key: key.to_string(),
                })
            }
            Entry::Vacant(slot) => {
                log::debug!("{}: created {key}", self.kind);
                Ok(slot.insert(Box::new(system)).as_mut())
            }
        }
    }

    /// Removes and returns the instance for `key`. No-op if absent.
    pub fn erase(&mut self, key: K) -> Option<S> {
        let removed = self.systems.remove(&key).map(|b| *b);
        if removed.is_some() {
            log::debug!("{}: erased {key}", self.kind);
        }
        removed
    }

    pub fn get_system(&mut self, key: K) -> Option<&mut S> {
        self.systems.get_mut(&key).map(|b| b.as_mut())
    }

    pub fn get(&self, key: K) -> Option<&S> {
        self.systems.get(&key).map(|b| b.as_ref())
    }

    pub fn keys(&self) -> impl Iterator<Item = K> + '_ {
        self.systems.keys().copied()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (K, &mut S)> + '_ {
        self.systems.iter_mut().map(|(k, s)| (*k, s.as_mut()))
    }

    /// Erases every instance.
    pub fn clear(&mut self) {
        if !self.systems.is_empty() {
            log::debug!("{}: clearing {} instance(s)", self.kind, self.systems.len());
        }
        self.systems.clear();
    }
}
