//! Per-task meeting locks
//!
//! An explicit, injected state store guaranteeing at most one active
//! meeting per task per variant. Keys are namespaced (`review:` /
//! `planned:`) so a kickoff approval can never collide with a review
//! consensus on the same task.
//!
//! Release is structural: the guard removes its key on `Drop`, so every
//! exit path — success, interruption, fault — releases exactly once.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// Lock namespace, one per protocol variant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockNamespace {
    Review,
    Planned,
}

impl LockNamespace {
    fn key(&self, task_id: &str) -> String {
        match self {
            LockNamespace::Review => format!("review:{}", task_id),
            LockNamespace::Planned => format!("planned:{}", task_id),
        }
    }
}

/// Process-wide set of held meeting locks
#[derive(Debug, Clone, Default)]
pub struct MeetingLocks {
    held: Arc<Mutex<HashSet<String>>>,
}

impl MeetingLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Try to acquire the lock for `(namespace, task_id)`.
    ///
    /// Returns `None` when a meeting for that key is already in flight.
    /// Acquisition is synchronous: it happens before any suspension point.
    pub fn try_acquire(&self, namespace: LockNamespace, task_id: &str) -> Option<MeetingLockGuard> {
        let key = namespace.key(task_id);
        let mut held = self.held.lock().expect("meeting lock set poisoned");
        if !held.insert(key.clone()) {
            return None;
        }
        Some(MeetingLockGuard {
            key,
            held: Arc::clone(&self.held),
        })
    }

    /// Whether the lock for `(namespace, task_id)` is currently held.
    pub fn is_held(&self, namespace: LockNamespace, task_id: &str) -> bool {
        self.held
            .lock()
            .expect("meeting lock set poisoned")
            .contains(&namespace.key(task_id))
    }
}

/// RAII guard for one held meeting lock
#[derive(Debug)]
pub struct MeetingLockGuard {
    key: String,
    held: Arc<Mutex<HashSet<String>>>,
}

impl Drop for MeetingLockGuard {
    fn drop(&mut self) {
        if let Ok(mut held) = self.held.lock() {
            held.remove(&self.key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquire_and_release() {
        let locks = MeetingLocks::new();

        let guard = locks.try_acquire(LockNamespace::Review, "t-1");
        assert!(guard.is_some());
        assert!(locks.is_held(LockNamespace::Review, "t-1"));

        drop(guard);
        assert!(!locks.is_held(LockNamespace::Review, "t-1"));
    }

    #[test]
    fn test_double_acquire_fails() {
        let locks = MeetingLocks::new();
        let _guard = locks.try_acquire(LockNamespace::Review, "t-1").unwrap();

        assert!(locks.try_acquire(LockNamespace::Review, "t-1").is_none());
    }

    #[test]
    fn test_namespaces_do_not_collide() {
        let locks = MeetingLocks::new();
        let _review = locks.try_acquire(LockNamespace::Review, "t-1").unwrap();

        // A planned approval on the same task is independent
        assert!(locks.try_acquire(LockNamespace::Planned, "t-1").is_some());
    }

    #[test]
    fn test_different_tasks_independent() {
        let locks = MeetingLocks::new();
        let _a = locks.try_acquire(LockNamespace::Review, "t-1").unwrap();
        assert!(locks.try_acquire(LockNamespace::Review, "t-2").is_some());
    }
}
