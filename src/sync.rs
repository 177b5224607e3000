//! Bounded read/write locking for the index catalogs.
//!
//! [`CatalogLock`] guards a catalog map with a `parking_lot::RwLock`. Acquisition
//! waits at most the configured timeout and reports [`QuiverError::LockFailure`]
//! afterwards, so callers can retry instead of blocking forever. Reader and
//! writer state is mirrored in atomics for diagnostics.

use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::{QuiverError, Result};

/// Default time a caller waits for a catalog lock.
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_millis(1000);

/// Read/write lock with a bounded wait and observable state.
#[derive(Debug)]
pub struct CatalogLock<T> {
    name: &'static str,
    inner: RwLock<T>,
    readers: AtomicUsize,
    writer: AtomicBool,
    timeout: Duration,
}

impl<T> CatalogLock<T> {
    pub fn new(name: &'static str, value: T) -> Self {
        Self::with_timeout(name, value, DEFAULT_LOCK_TIMEOUT)
    }

    pub fn with_timeout(name: &'static str, value: T, timeout: Duration) -> Self {
        CatalogLock {
            name,
            inner: RwLock::new(value),
            readers: AtomicUsize::new(0),
            writer: AtomicBool::new(false),
            timeout,
        }
    }

    /// Acquire shared access, failing once the timeout expires.
    pub fn read(&self) -> Result<CatalogReadGuard<'_, T>> {
        let guard = self.inner.try_read_for(self.timeout).ok_or_else(|| {
            QuiverError::lock_failure(format!("timed out acquiring {} read lock", self.name))
        })?;
        self.readers.fetch_add(1, Ordering::SeqCst);
        Ok(CatalogReadGuard {
            guard,
            readers: &self.readers,
        })
    }

    /// Acquire exclusive access, failing once the timeout expires.
    pub fn write(&self) -> Result<CatalogWriteGuard<'_, T>> {
        let guard = self.inner.try_write_for(self.timeout).ok_or_else(|| {
            QuiverError::lock_failure(format!("timed out acquiring {} write lock", self.name))
        })?;
        self.writer.store(true, Ordering::SeqCst);
        Ok(CatalogWriteGuard {
            guard,
            writer: &self.writer,
        })
    }

    /// Whether a writer currently holds the lock.
    pub fn is_locked(&self) -> bool {
        self.writer.load(Ordering::SeqCst)
    }

    /// Whether at least one reader currently holds the lock.
    pub fn is_read_locked(&self) -> bool {
        self.reader_count() > 0
    }

    pub fn reader_count(&self) -> usize {
        self.readers.load(Ordering::SeqCst)
    }

}

/// Shared guard returned by [`CatalogLock::read`].
pub struct CatalogReadGuard<'a, T> {
    guard: RwLockReadGuard<'a, T>,
    readers: &'a AtomicUsize,
}

impl<T> Deref for CatalogReadGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.guard
    }
}

impl<T> Drop for CatalogReadGuard<'_, T> {
    fn drop(&mut self) {
        self.readers.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Exclusive guard returned by [`CatalogLock::write`].
pub struct CatalogWriteGuard<'a, T> {
    guard: RwLockWriteGuard<'a, T>,
    writer: &'a AtomicBool,
}

impl<T> Deref for CatalogWriteGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.guard
    }
}

impl<T> DerefMut for CatalogWriteGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.guard
    }
}

impl<T> Drop for CatalogWriteGuard<'_, T> {
    fn drop(&mut self) {
        self.writer.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reader_and_writer_state() {
        let lock = CatalogLock::new("test", 5u32);
        assert!(!lock.is_locked());
        assert!(!lock.is_read_locked());

        {
            let first = lock.read().unwrap();
            let second = lock.read().unwrap();
            assert_eq!(*first + *second, 10);
            assert_eq!(lock.reader_count(), 2);
            assert!(lock.is_read_locked());
        }
        assert_eq!(lock.reader_count(), 0);

        {
            let mut guard = lock.write().unwrap();
            *guard = 7;
            assert!(lock.is_locked());
        }
        assert!(!lock.is_locked());
        assert_eq!(*lock.read().unwrap(), 7);
    }

    #[test]
    fn test_write_times_out_while_read_held() {
        let lock = CatalogLock::with_timeout("test", (), Duration::from_millis(10));
        let _reader = lock.read().unwrap();

        let err = lock.write().err().unwrap();
        assert!(err.is_transient());
        assert!(!lock.is_locked());
    }

    #[test]
    fn test_read_times_out_while_write_held() {
        let lock = CatalogLock::with_timeout("test", (), Duration::from_millis(10));
        let _writer = lock.write().unwrap();

        assert!(matches!(lock.read(), Err(QuiverError::LockFailure(_))));
        assert_eq!(lock.reader_count(), 0);
    }
}
