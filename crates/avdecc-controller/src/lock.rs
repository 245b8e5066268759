// ── Shared re-entrant lock ──
//
// One controller shares a single lock across all of its controlled
// entities: a controller operation frequently touches several entities
// and re-enters per-entity APIs while already holding the lock. The
// lock therefore tracks its owning thread and an acquisition count,
// and offers bulk release/restore for the one place the controller
// must drop it entirely (publishing to untrusted observers).

use std::sync::{Condvar, Mutex};
use std::thread::{self, ThreadId};

#[derive(Debug, Default)]
struct OwnerState {
    owner: Option<ThreadId>,
    count: u32,
}

/// Counted, owner-thread-tracking re-entrant mutex.
///
/// `lock`/`unlock` must be balanced on the owning thread. Unlocking
/// from a non-owning thread is a programmer error: it panics in debug
/// builds and is reported and ignored in release builds.
#[derive(Debug, Default)]
pub struct SharedLock {
    state: Mutex<OwnerState>,
    released: Condvar,
}

impl SharedLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the lock, waiting if another thread holds it. Re-entrant
    /// on the owning thread.
    pub fn lock(&self) {
        let me = thread::current().id();
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if state.owner == Some(me) {
            state.count += 1;
            return;
        }
        while state.owner.is_some() {
            state = self.released.wait(state).unwrap_or_else(|e| e.into_inner());
        }
        state.owner = Some(me);
        state.count = 1;
    }

    /// Release one acquisition. On the last release the lock becomes
    /// available to other threads.
    pub fn unlock(&self) {
        let me = thread::current().id();
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if state.owner != Some(me) {
            debug_assert!(false, "unlock called by a thread that does not hold the lock");
            tracing::error!("unlock called by a thread that does not hold the lock");
            return;
        }
        state.count -= 1;
        if state.count == 0 {
            state.owner = None;
            drop(state);
            self.released.notify_one();
        }
    }

    /// Re-acquire the lock `count` times; restores state saved by
    /// [`unlock_all`](Self::unlock_all).
    pub fn lock_all(&self, count: u32) {
        for _ in 0..count {
            self.lock();
        }
    }

    /// Release every acquisition held by the current thread and return
    /// how many there were.
    pub fn unlock_all(&self) -> u32 {
        let me = thread::current().id();
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if state.owner != Some(me) {
            debug_assert!(false, "unlock_all called by a thread that does not hold the lock");
            tracing::error!("unlock_all called by a thread that does not hold the lock");
            return 0;
        }
        let released = state.count;
        state.count = 0;
        state.owner = None;
        drop(state);
        self.released.notify_one();
        released
    }

    /// True iff the current thread owns the lock.
    pub fn is_self_locked(&self) -> bool {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.owner == Some(thread::current().id())
    }

    /// Current acquisition count of the owning thread (0 when free).
    pub fn locked_count(&self) -> u32 {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn reentrant_on_owning_thread() {
        let lock = SharedLock::new();
        lock.lock();
        lock.lock();
        assert!(lock.is_self_locked());
        assert_eq!(lock.locked_count(), 2);
        lock.unlock();
        assert!(lock.is_self_locked());
        lock.unlock();
        assert!(!lock.is_self_locked());
        assert_eq!(lock.locked_count(), 0);
    }

    #[test]
    fn unlock_all_returns_held_count_and_lock_all_restores() {
        let lock = SharedLock::new();
        lock.lock();
        lock.lock();
        lock.lock();

        let released = lock.unlock_all();
        assert_eq!(released, 3);
        assert!(!lock.is_self_locked());

        lock.lock_all(released);
        assert!(lock.is_self_locked());
        assert_eq!(lock.locked_count(), 3);
        lock.unlock_all();
    }

    #[test]
    fn other_thread_blocks_until_release() {
        let lock = Arc::new(SharedLock::new());
        lock.lock();

        let contender = {
            let lock = Arc::clone(&lock);
            std::thread::spawn(move || {
                lock.lock();
                let owned = lock.is_self_locked();
                lock.unlock();
                owned
            })
        };

        // The contender cannot own the lock while we hold it.
        std::thread::sleep(std::time::Duration::from_millis(20));
        assert!(lock.is_self_locked());

        lock.unlock();
        assert!(contender.join().unwrap());
    }

    #[test]
    fn is_self_locked_is_per_thread() {
        let lock = Arc::new(SharedLock::new());
        lock.lock();

        let lock2 = Arc::clone(&lock);
        let seen_by_other = std::thread::spawn(move || lock2.is_self_locked())
            .join()
            .unwrap();
        assert!(!seen_by_other);

        lock.unlock();
    }
}
