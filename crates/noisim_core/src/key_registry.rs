//! Reference-key registry for NoiSim
//!
//! Gantree: L2_Bookkeeping → KeyRegistry
//!
//! One registry per instance category maps reference keys to instances.
//! Keys are unique within the category and listed in insertion order.
//! Every mutating call checks before it mutates.

use crate::error::{InsError, InsResult};
use crate::types::InstanceCategory;
use indexmap::IndexMap;

/// Insertion-ordered key → instance mapping for one category
/// Gantree: KeyRegistry<T> // 키 레지스트리
#[derive(Debug, Clone)]
pub struct KeyRegistry<T> {
    /// Gantree: category: InstanceCategory // 소속 종류
    category: InstanceCategory,

    /// Gantree: entries: IndexMap<String, T> // 키 → 인스턴스 (삽입 순서)
    entries: IndexMap<String, T>,
}

impl<T> KeyRegistry<T> {
    /// Gantree: new(category) -> Self // 생성자
    pub fn new(category: InstanceCategory) -> Self {
        Self {
            category,
            entries: IndexMap::new(),
        }
    }

    pub fn category(&self) -> InstanceCategory {
        self.category
    }

    // ========================================================================
    // Existence Checks
    // ========================================================================

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Fail with `DuplicateKey` if the key is taken
    /// Gantree: ensure_absent(key) -> Result // 중복 검사
    pub fn ensure_absent(&self, key: &str) -> InsResult<()> {
        if self.contains(key) {
            return Err(InsError::DuplicateKey {
                instance_type: self.category.label().to_string(),
                key: key.to_string(),
            });
        }
        Ok(())
    }

    /// Fail with `MissingKey` if the key is unknown
    /// Gantree: ensure_present(key) -> Result // 존재 검사
    pub fn ensure_present(&self, key: &str) -> InsResult<()> {
        if !self.contains(key) {
            return Err(self.missing(key));
        }
        Ok(())
    }

    fn missing(&self, key: &str) -> InsError {
        InsError::MissingKey {
            instance_type: self.category.label().to_string(),
            key: key.to_string(),
        }
    }

    // ========================================================================
    // Mutation
    // ========================================================================

    /// Gantree: register(key, T) -> Result // 등록
    pub fn register(&mut self, key: impl Into<String>, instance: T) -> InsResult<()> {
        let key = key.into();
        self.ensure_absent(&key)?;
        self.entries.insert(key, instance);
        Ok(())
    }

    /// Remove and return the instance; the order of the others is kept
    /// Gantree: remove(key) -> Result<T> // 제거
    pub fn remove(&mut self, key: &str) -> InsResult<T> {
        self.entries
            .shift_remove(key)
            .ok_or_else(|| self.missing(key))
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    /// Gantree: lookup(key) -> Result<&T> // 조회
    pub fn lookup(&self, key: &str) -> InsResult<&T> {
        self.entries.get(key).ok_or_else(|| self.missing(key))
    }

    pub fn lookup_mut(&mut self, key: &str) -> InsResult<&mut T> {
        let category = self.category;
        self.entries
            .get_mut(key)
            .ok_or_else(|| InsError::MissingKey {
                instance_type: category.label().to_string(),
                key: key.to_string(),
            })
    }

    /// Keys in insertion order
    pub fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    /// Entries in insertion order
    /// Gantree: iter() -> impl Iterator // 순회
    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> KeyRegistry<u32> {
        KeyRegistry::new(InstanceCategory::NoiseData)
    }

    #[test]
    fn test_register_and_lookup() {
        let mut reg = registry();
        reg.register("d1", 7).unwrap();
        assert_eq!(*reg.lookup("d1").unwrap(), 7);
        assert!(reg.contains("d1"));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn test_duplicate_key_leaves_original() {
        let mut reg = registry();
        reg.register("d1", 1).unwrap();
        let err = reg.register("d1", 2).unwrap_err();
        assert_eq!(
            err,
            InsError::DuplicateKey {
                instance_type: "noise data instance".into(),
                key: "d1".into()
            }
        );
        assert_eq!(*reg.lookup("d1").unwrap(), 1);
    }

    #[test]
    fn test_missing_key() {
        let mut reg = registry();
        assert!(matches!(reg.lookup("x"), Err(InsError::MissingKey { .. })));
        assert!(matches!(reg.remove("x"), Err(InsError::MissingKey { .. })));
        assert!(reg.ensure_present("x").is_err());
        assert!(reg.ensure_absent("x").is_ok());
    }

    #[test]
    fn test_insertion_order_survives_removal() {
        let mut reg = registry();
        for (i, k) in ["c", "a", "b"].iter().enumerate() {
            reg.register(*k, i as u32).unwrap();
        }
        assert_eq!(reg.remove("a").unwrap(), 1);
        assert_eq!(reg.keys(), vec!["c".to_string(), "b".to_string()]);
        let listed: Vec<(&str, u32)> = reg.iter().map(|(k, v)| (k, *v)).collect();
        assert_eq!(listed, vec![("c", 0), ("b", 2)]);
    }

    #[test]
    fn test_reregistered_key_moves_to_end() {
        let mut reg = registry();
        for k in ["a", "b", "c"] {
            reg.register(k, 0).unwrap();
        }
        reg.remove("b").unwrap();
        reg.register("b", 1).unwrap();
        assert_eq!(reg.keys(), vec!["a", "c", "b"]);
        assert_eq!(reg.len(), 3);
    }

    #[test]
    fn test_key_reuse_after_removal() {
        let mut reg = registry();
        reg.register("k", 1).unwrap();
        reg.remove("k").unwrap();
        reg.register("k", 2).unwrap();
        assert_eq!(*reg.lookup("k").unwrap(), 2);
    }

    #[test]
    fn test_lookup_mut() {
        let mut reg = registry();
        reg.register("k", 1).unwrap();
        *reg.lookup_mut("k").unwrap() = 5;
        assert_eq!(*reg.lookup("k").unwrap(), 5);
    }
}
