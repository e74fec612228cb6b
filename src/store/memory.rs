use std::collections::{BTreeSet, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::{KeyValueStore, StoreError};

#[derive(Debug, Default)]
struct Inner {
    values: HashMap<String, Vec<u8>>,
    sets: HashMap<String, BTreeSet<String>>,
}

/// In-process store. Sets are ordered so listings are stable.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Inner>, StoreError> {
        self.inner
            .read()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Inner>, StoreError> {
        self.inner
            .write()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".into()))
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.read()?.values.get(key).cloned())
    }

    fn set(&self, key: &str, value: Vec<u8>) -> Result<(), StoreError> {
        self.write()?.values.insert(key.to_string(), value);
        Ok(())
    }

    fn exists(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.read()?.values.contains_key(key))
    }

    fn delete(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.write()?.values.remove(key).is_some())
    }

    fn add_to_set(&self, set_key: &str, member: &str) -> Result<(), StoreError> {
        self.write()?
            .sets
            .entry(set_key.to_string())
            .or_default()
            .insert(member.to_string());
        Ok(())
    }

    fn set_members(&self, set_key: &str) -> Result<Vec<String>, StoreError> {
        Ok(self
            .read()?
            .sets
            .get(set_key)
            .map(|members| members.iter().cloned().collect())
            .unwrap_or_default())
    }

    fn remove_from_set(&self, set_key: &str, member: &str) -> Result<(), StoreError> {
        let mut inner = self.write()?;
        if let Some(members) = inner.sets.get_mut(set_key) {
            members.remove(member);
            if members.is_empty() {
                inner.sets.remove(set_key);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_round_trip_and_delete() {
        let store = MemoryStore::new();
        assert_eq!(store.get("k").unwrap(), None);
        store.set("k", b"v1".to_vec()).unwrap();
        store.set("k", b"v2".to_vec()).unwrap();
        assert_eq!(store.get("k").unwrap(), Some(b"v2".to_vec()));
        assert!(store.exists("k").unwrap());
        assert!(store.delete("k").unwrap());
        assert!(!store.delete("k").unwrap());
    }

    #[test]
    fn set_membership() {
        let store = MemoryStore::new();
        store.add_to_set("games", "b").unwrap();
        store.add_to_set("games", "a").unwrap();
        store.add_to_set("games", "a").unwrap();
        assert_eq!(store.set_members("games").unwrap(), vec!["a", "b"]);
        store.remove_from_set("games", "a").unwrap();
        store.remove_from_set("games", "missing").unwrap();
        assert_eq!(store.set_members("games").unwrap(), vec!["b"]);
        assert!(store.set_members("nothing").unwrap().is_empty());
    }
}
