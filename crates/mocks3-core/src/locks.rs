//! Keyed reader/writer locks for the request pipeline.
//!
//! Any number of reads may overlap; writes are serialized per bucket and per
//! (bucket, key). The registry maps lock keys to reference-counted
//! `tokio::sync::RwLock`s: entries are created on first use and removed when
//! the last guard drops, so the table stays proportional to the number of
//! keys currently under contention rather than growing without bound.

use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tokio::sync::{OwnedRwLockReadGuard, OwnedRwLockWriteGuard, RwLock};

/// One refcounted lock table entry. The count is mutated only while the
/// DashMap shard lock is held, so a plain usize suffices.
struct LockEntry {
    lock: Arc<RwLock<()>>,
    refs: usize,
}

/// The keyed lock registry.
#[derive(Clone, Default)]
pub struct LockRegistry {
    locks: Arc<DashMap<String, LockEntry>>,
}

impl std::fmt::Debug for LockRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LockRegistry")
            .field("active_keys", &self.locks.len())
            .finish()
    }
}

/// Lock key for bucket-level config mutations and reads.
#[must_use]
pub fn bucket_key(bucket: &str) -> String {
    format!("bucket/{bucket}")
}

/// Lock key for object reads and writes.
#[must_use]
pub fn object_key(bucket: &str, key: &str) -> String {
    format!("object/{bucket}/{key}")
}

/// Lock key for staging one part of one upload. Different parts of the same
/// upload get different keys, so they may proceed in parallel.
#[must_use]
pub fn part_key(bucket: &str, key: &str, upload_id: &str, part_number: u32) -> String {
    format!("part/{bucket}/{key}/{upload_id}/{part_number}")
}

impl LockRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently holding a lock entry. Exposed for tests.
    #[must_use]
    pub fn active_keys(&self) -> usize {
        self.locks.len()
    }

    /// Acquire a shared (read) lock on `key`.
    pub async fn read(&self, key: String) -> KeyLockGuard {
        let lock = self.checkout(&key);
        let guard = lock.read_owned().await;
        KeyLockGuard {
            guard: Some(GuardKind::Read(guard)),
            key,
            registry: Arc::clone(&self.locks),
        }
    }

    /// Acquire an exclusive (write) lock on `key`.
    pub async fn write(&self, key: String) -> KeyLockGuard {
        let lock = self.checkout(&key);
        let guard = lock.write_owned().await;
        KeyLockGuard {
            guard: Some(GuardKind::Write(guard)),
            key,
            registry: Arc::clone(&self.locks),
        }
    }

    /// Get the lock for `key`, creating the entry if needed and bumping its
    /// refcount. The refcount mutation happens under the shard lock.
    fn checkout(&self, key: &str) -> Arc<RwLock<()>> {
        let mut entry = self
            .locks
            .entry(key.to_owned())
            .or_insert_with(|| LockEntry {
                lock: Arc::new(RwLock::new(())),
                refs: 0,
            });
        entry.refs += 1;
        Arc::clone(&entry.lock)
    }
}

enum GuardKind {
    Read(OwnedRwLockReadGuard<()>),
    Write(OwnedRwLockWriteGuard<()>),
}

/// A held keyed lock. Dropping it releases the RwLock and decrements the
/// registry entry, removing the entry once idle.
pub struct KeyLockGuard {
    guard: Option<GuardKind>,
    key: String,
    registry: Arc<DashMap<String, LockEntry>>,
}

impl Drop for KeyLockGuard {
    fn drop(&mut self) {
        // The RwLock guard must be released before the entry can be retired,
        // otherwise a racing checkout could mint a fresh lock for the same
        // key while this one is still held.
        self.guard.take();
        if let Entry::Occupied(mut occupied) = self.registry.entry(std::mem::take(&mut self.key)) {
            occupied.get_mut().refs -= 1;
            if occupied.get().refs == 0 {
                occupied.remove();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn test_should_allow_concurrent_reads() {
        let registry = LockRegistry::new();
        let g1 = registry.read(object_key("b", "k")).await;
        let g2 = registry.read(object_key("b", "k")).await;
        drop(g1);
        drop(g2);
    }

    #[tokio::test]
    async fn test_should_serialize_writes_on_same_key() {
        let registry = LockRegistry::new();
        let guard = registry.write(object_key("b", "k")).await;

        let registry2 = registry.clone();
        let contender = tokio::spawn(async move {
            let _g = registry2.write(object_key("b", "k")).await;
        });

        // The contender cannot finish while the first guard is held.
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!contender.is_finished());

        drop(guard);
        tokio::time::timeout(Duration::from_secs(1), contender)
            .await
            .expect("contender should finish after release")
            .expect("no panic");
    }

    #[tokio::test]
    async fn test_should_not_block_different_keys() {
        let registry = LockRegistry::new();
        let _g1 = registry.write(object_key("b", "k1")).await;
        // A different key must be acquirable immediately.
        let acquired = tokio::time::timeout(
            Duration::from_millis(100),
            registry.write(object_key("b", "k2")),
        )
        .await;
        assert!(acquired.is_ok());
    }

    #[tokio::test]
    async fn test_should_reclaim_idle_entries() {
        let registry = LockRegistry::new();
        {
            let _g1 = registry.read(bucket_key("b")).await;
            let _g2 = registry.read(bucket_key("b")).await;
            assert_eq!(registry.active_keys(), 1);
        }
        assert_eq!(registry.active_keys(), 0);
    }

    #[tokio::test]
    async fn test_should_give_parts_independent_keys() {
        assert_ne!(part_key("b", "k", "u", 1), part_key("b", "k", "u", 2));
        let registry = LockRegistry::new();
        let _g1 = registry.write(part_key("b", "k", "u", 1)).await;
        let acquired = tokio::time::timeout(
            Duration::from_millis(100),
            registry.write(part_key("b", "k", "u", 2)),
        )
        .await;
        assert!(acquired.is_ok());
    }
}
