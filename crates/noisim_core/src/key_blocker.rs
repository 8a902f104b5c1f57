//! Cross-category key blocking for NoiSim
//!
//! Gantree: L2_Bookkeeping → KeyBlocker
//!
//! A key of one category stays blocked while an instance of the dependent
//! category was built from it. Blocked keys can be neither removed nor
//! reused. Several dependents may pin the same key; the key is released
//! when the last of them unblocks it.

use crate::error::{InsError, InsResult};
use crate::types::InstanceCategory;
use std::collections::{BTreeMap, HashMap};

/// Lock tables for every lockable category
/// Gantree: KeyBlocker // 키 차단 관리자
#[derive(Debug, Clone, Default)]
pub struct KeyBlocker {
    /// Gantree: tables: HashMap<Category, BTreeMap<key, blockers>> // 잠금 테이블
    tables: HashMap<InstanceCategory, BTreeMap<String, Vec<String>>>,
}

impl KeyBlocker {
    /// Gantree: new() -> Self // 생성자
    pub fn new() -> Self {
        Self::default()
    }

    fn lockable(category: InstanceCategory) -> InsResult<InstanceCategory> {
        category.dependent().ok_or_else(|| {
            InsError::InvalidParameter(format!(
                "keys of a {} cannot be blocked: nothing is built from it",
                category.label()
            ))
        })
    }

    // ========================================================================
    // Block / Unblock
    // ========================================================================

    /// Pin `key` of `category` on behalf of `blocker`
    /// Gantree: block_key(key, category, blocker) -> Result // 차단
    ///
    /// Blocking again with the same blocker is a no-op.
    pub fn block_key(&mut self, key: &str, category: InstanceCategory, blocker: &str) -> InsResult<()> {
        Self::lockable(category)?;
        let blockers = self
            .tables
            .entry(category)
            .or_default()
            .entry(key.to_string())
            .or_default();
        if !blockers.iter().any(|b| b == blocker) {
            blockers.push(blocker.to_string());
        }
        log::debug!("{} '{}' blocked by '{}'", category.label(), key, blocker);
        Ok(())
    }

    /// Release the lock `blocker` holds on `key`
    /// Gantree: unblock_key(key, category, blocker) -> Result // 차단 해제
    pub fn unblock_key(&mut self, key: &str, category: InstanceCategory, blocker: &str) -> InsResult<()> {
        let missing = || InsError::MissingLock {
            key: key.to_string(),
            instance_type: category.label().to_string(),
            blocker: blocker.to_string(),
        };

        let table = self.tables.get_mut(&category).ok_or_else(missing)?;
        let blockers = table.get_mut(key).ok_or_else(missing)?;
        let position = blockers.iter().position(|b| b == blocker).ok_or_else(missing)?;

        blockers.remove(position);
        if blockers.is_empty() {
            table.remove(key);
        }
        log::debug!("{} '{}' released by '{}'", category.label(), key, blocker);
        Ok(())
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Fail with `BlockedKey` if any dependent still pins `key`
    /// Gantree: check_blocked_key(key, category) -> Result // 차단 검사
    pub fn check_blocked_key(&self, key: &str, category: InstanceCategory) -> InsResult<()> {
        match self.blocker_of(key, category) {
            None => Ok(()),
            Some(blocker) => {
                let blocker_type = category
                    .dependent()
                    .map(|c| c.label())
                    .unwrap_or("instance");
                Err(InsError::BlockedKey {
                    key: key.to_string(),
                    instance_type: category.label().to_string(),
                    blocker_type: blocker_type.to_string(),
                    blocker: blocker.to_string(),
                })
            }
        }
    }

    /// Most recently registered blocker of `key`
    pub fn blocker_of(&self, key: &str, category: InstanceCategory) -> Option<&str> {
        self.blockers_of(key, category).last().map(String::as_str)
    }

    /// Every blocker of `key`, oldest first
    pub fn blockers_of(&self, key: &str, category: InstanceCategory) -> &[String] {
        self.tables
            .get(&category)
            .and_then(|t| t.get(key))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn is_blocked(&self, key: &str, category: InstanceCategory) -> bool {
        self.blocker_of(key, category).is_some()
    }

    /// Blocked keys of a category, sorted
    pub fn blocked_keys(&self, category: InstanceCategory) -> Vec<String> {
        self.tables
            .get(&category)
            .map(|t| t.keys().cloned().collect())
            .unwrap_or_default()
    }
}
