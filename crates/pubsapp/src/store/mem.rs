use super::{FileStats, RecordStore};
use crate::error::{PubsError, Result};
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

/// In-memory record store for testing.
///
/// Uses `RefCell` for interior mutability since the repository is
/// single-threaded, which lets [`RecordStore`] keep `&self` receivers.
pub struct MemRecordStore<T> {
    records: RefCell<BTreeMap<String, T>>,
    simulate_write_error: Cell<bool>,
}

impl<T> Default for MemRecordStore<T> {
    fn default() -> Self {
        Self {
            records: RefCell::new(BTreeMap::new()),
            simulate_write_error: Cell::new(false),
        }
    }
}

impl<T> MemRecordStore<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent `save` fail.
    pub fn set_simulate_write_error(&self, simulate: bool) {
        self.simulate_write_error.set(simulate);
    }

    pub fn len(&self) -> usize {
        self.records.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.borrow().is_empty()
    }
}

impl<T: Clone> RecordStore<T> for MemRecordStore<T> {
    fn load(&self, citekey: &str) -> Result<Option<T>> {
        Ok(self.records.borrow().get(citekey).cloned())
    }

    fn save(&self, citekey: &str, record: &T) -> Result<()> {
        if self.simulate_write_error.get() {
            return Err(PubsError::Store("Simulated write error".to_string()));
        }
        self.records
            .borrow_mut()
            .insert(citekey.to_string(), record.clone());
        Ok(())
    }

    fn delete(&self, citekey: &str) -> Result<bool> {
        Ok(self.records.borrow_mut().remove(citekey).is_some())
    }

    fn exists(&self, citekey: &str) -> bool {
        self.records.borrow().contains_key(citekey)
    }

    fn citekeys(&self) -> Result<Vec<String>> {
        Ok(self.records.borrow().keys().cloned().collect())
    }

    fn stats(&self, citekey: &str) -> Result<Option<FileStats>> {
        Ok(self.exists(citekey).then_some(FileStats {
            size: 0,
            modified: None,
        }))
    }
}

// Shared handles let a test keep a store while the broker owns a box of it.
impl<T, S: RecordStore<T>> RecordStore<T> for std::rc::Rc<S> {
    fn load(&self, citekey: &str) -> Result<Option<T>> {
        (**self).load(citekey)
    }

    fn save(&self, citekey: &str, record: &T) -> Result<()> {
        (**self).save(citekey, record)
    }

    fn delete(&self, citekey: &str) -> Result<bool> {
        (**self).delete(citekey)
    }

    fn exists(&self, citekey: &str) -> bool {
        (**self).exists(citekey)
    }

    fn citekeys(&self) -> Result<Vec<String>> {
        (**self).citekeys()
    }

    fn stats(&self, citekey: &str) -> Result<Option<FileStats>> {
        (**self).stats(citekey)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulated_write_error() {
        let store: MemRecordStore<String> = MemRecordStore::new();
        store.save("a", &"x".to_string()).unwrap();

        store.set_simulate_write_error(true);
        assert!(store.save("b", &"y".to_string()).is_err());
        assert_eq!(store.citekeys().unwrap(), vec!["a"]);
    }

    #[test]
    fn test_delete_reports_presence() {
        let store: MemRecordStore<u32> = MemRecordStore::new();
        store.save("k", &1).unwrap();
        assert!(store.delete("k").unwrap());
        assert!(!store.delete("k").unwrap());
        assert!(store.is_empty());
    }
}
