//! Table-granularity shared/exclusive lock
//!
//! Modes: Free, Shared(n), Exclusive.
//!
//! - `acquire(Shared)` proceeds while the lock is Free or Shared
//! - `acquire(Exclusive)` proceeds only while the lock is Free
//! - every release wakes all waiters; each re-checks its condition
//!
//! There is no timeout, no cancellation and no FIFO ordering. A steady
//! stream of shared holders can keep an exclusive waiter out indefinitely.

use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::observability::{Event, Logger};

/// Requested access mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockMode {
    /// Any number of concurrent holders
    Shared,
    /// A single holder, exclusive with Shared
    Exclusive,
}

impl LockMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            LockMode::Shared => "shared",
            LockMode::Exclusive => "exclusive",
        }
    }
}

impl fmt::Display for LockMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Current lock mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockState {
    Free,
    /// Number of shared holders, always > 0
    Shared(usize),
    Exclusive,
}

/// A named shared/exclusive lock guarding one table's state.
///
/// Admission is decided by the mode state machine above. The protected value
/// sits in a std `RwLock` that is only ever taken after admission, so it never
/// contends; it exists to hand out safe references.
pub struct TableLock<T> {
    name: String,
    state: Mutex<LockState>,
    released: Condvar,
    data: RwLock<T>,
}

impl<T> TableLock<T> {
    /// Creates a free lock around `value`.
    pub fn new(name: impl Into<String>, value: T) -> Self {
        Self {
            name: name.into(),
            state: Mutex::new(LockState::Free),
            released: Condvar::new(),
            data: RwLock::new(value),
        }
    }

    /// Snapshot of the current mode.
    pub fn state(&self) -> LockState {
        *self.lock_state()
    }

    /// Blocks until the lock is compatible with `mode`, then takes it.
    pub fn acquire(&self, mode: LockMode) {
        let mut state = self.lock_state();
        loop {
            match (mode, *state) {
                (LockMode::Shared, LockState::Free) => {
                    *state = LockState::Shared(1);
                    return;
                }
                (LockMode::Shared, LockState::Shared(n)) => {
                    *state = LockState::Shared(n + 1);
                    return;
                }
                (LockMode::Exclusive, LockState::Free) => {
                    *state = LockState::Exclusive;
                    return;
                }
                _ => {
                    state = self
                        .released
                        .wait(state)
                        .unwrap_or_else(PoisonError::into_inner);
                }
            }
        }
    }

    /// Releases one hold of `mode` and wakes every waiter.
    ///
    /// The caller is trusted to pass the mode it acquired with. Exclusive
    /// release frees the lock unconditionally; a shared release while the
    /// lock is not shared is ignored.
    pub fn release(&self, mode: LockMode) {
        let mut state = self.lock_state();
        match (mode, *state) {
            (LockMode::Shared, LockState::Shared(1)) => *state = LockState::Free,
            (LockMode::Shared, LockState::Shared(n)) => *state = LockState::Shared(n - 1),
            (LockMode::Exclusive, _) => *state = LockState::Free,
            (LockMode::Shared, current) => {
                Logger::warn(
                    Event::LockMisuse,
                    &[
                        ("lock", self.name.as_str()),
                        ("mode", mode.as_str()),
                        ("state", &format!("{:?}", current)),
                    ],
                );
            }
        }
        drop(state);
        self.released.notify_all();
    }

    /// Acquires Shared and returns a guard that releases it on drop.
    pub fn read(&self) -> ReadGuard<'_, T> {
        self.acquire(LockMode::Shared);
        let release = Release {
            lock: self,
            mode: LockMode::Shared,
        };
        let inner = self.data.read().unwrap_or_else(PoisonError::into_inner);
        ReadGuard {
            inner,
            _release: release,
        }
    }

    /// Acquires Exclusive and returns a guard that releases it on drop.
    pub fn write(&self) -> WriteGuard<'_, T> {
        self.acquire(LockMode::Exclusive);
        let release = Release {
            lock: self,
            mode: LockMode::Exclusive,
        };
        let inner = self.data.write().unwrap_or_else(PoisonError::into_inner);
        WriteGuard {
            inner,
            _release: release,
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, LockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T> fmt::Debug for TableLock<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableLock")
            .field("name", &self.name)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

/// Releases a mode hold when dropped.
struct Release<'a, T> {
    lock: &'a TableLock<T>,
    mode: LockMode,
}

impl<T> Drop for Release<'_, T> {
    fn drop(&mut self) {
        self.lock.release(self.mode);
    }
}

/// Shared access to a table's state.
///
/// Field order matters: the data borrow is dropped before the mode is released.
pub struct ReadGuard<'a, T> {
    inner: RwLockReadGuard<'a, T>,
    _release: Release<'a, T>,
}

impl<T> Deref for ReadGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.inner
    }
}

/// Exclusive access to a table's state.
pub struct WriteGuard<'a, T> {
    inner: RwLockWriteGuard<'a, T>,
    _release: Release<'a, T>,
}

impl<T> Deref for WriteGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.inner
    }
}

impl<T> DerefMut for WriteGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.inner
    }
}
