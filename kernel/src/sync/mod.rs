// Synchronization primitives for the minnow kernel
// Provides RawSpinLock, Mutex and CondVar.
//
// The process table is guarded by exactly one Mutex/CondVar pair; the
// condition variable here pairs with that mutex and nothing else in
// this crate.

use core::cell::UnsafeCell;
use core::ops::{Deref, DerefMut};
use core::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

// ============================================================================
// RawSpinLock
// ============================================================================

/// Raw spinlock for low-level synchronization
pub struct RawSpinLock {
    locked: AtomicBool,
    // Lock analytics (very lightweight)
    acquire_count: AtomicU64,
    contended_count: AtomicU64,
}

impl RawSpinLock {
    pub const fn new() -> Self {
        Self {
            locked: AtomicBool::new(false),
            acquire_count: AtomicU64::new(0),
            contended_count: AtomicU64::new(0),
        }
    }

    pub fn lock(&self) {
        let mut contended = false;
        while self.locked.swap(true, Ordering::Acquire) {
            contended = true;
            core::hint::spin_loop();
        }
        self.acquire_count.fetch_add(1, Ordering::Relaxed);
        if contended {
            self.contended_count.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn unlock(&self) {
        self.locked.store(false, Ordering::Release);
    }

    pub fn try_lock(&self) -> bool {
        !self.locked.swap(true, Ordering::Acquire)
    }

    /// Check if the lock is currently held
    pub fn is_locked(&self) -> bool {
        self.locked.load(Ordering::Acquire)
    }

    /// Get total lock acquisitions (for diagnostics)
    pub fn acquire_count(&self) -> u64 {
        self.acquire_count.load(Ordering::Relaxed)
    }

    /// Get total contended acquisitions (for diagnostics)
    pub fn contended_count(&self) -> u64 {
        self.contended_count.load(Ordering::Relaxed)
    }
}

impl Default for RawSpinLock {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Mutex<T> - Spinlock protecting data with RAII guard
// ============================================================================

/// A mutual exclusion primitive protecting data of type T
pub struct Mutex<T: ?Sized> {
    lock: RawSpinLock,
    data: UnsafeCell<T>,
}

// Safety: Mutex provides synchronized access
unsafe impl<T: ?Sized + Send> Sync for Mutex<T> {}
unsafe impl<T: ?Sized + Send> Send for Mutex<T> {}

impl<T> Mutex<T> {
    /// Creates a new mutex protecting the given data
    pub const fn new(data: T) -> Self {
        Self {
            lock: RawSpinLock::new(),
            data: UnsafeCell::new(data),
        }
    }

    /// Consumes the mutex and returns the inner data
    pub fn into_inner(self) -> T {
        self.data.into_inner()
    }
}

impl<T: ?Sized> Mutex<T> {
    /// Acquires the mutex, spinning until available
    pub fn lock(&self) -> MutexGuard<'_, T> {
        self.lock.lock();
        MutexGuard { mutex: self }
    }

    /// Attempts to acquire the mutex without spinning
    pub fn try_lock(&self) -> Option<MutexGuard<'_, T>> {
        if self.lock.try_lock() {
            Some(MutexGuard { mutex: self })
        } else {
            None
        }
    }

    pub fn is_locked(&self) -> bool {
        self.lock.is_locked()
    }
}

/// RAII guard releasing the mutex on drop
pub struct MutexGuard<'a, T: ?Sized> {
    mutex: &'a Mutex<T>,
}

impl<T: ?Sized> Deref for MutexGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        // Safety: We hold the lock
        unsafe { &*self.mutex.data.get() }
    }
}

impl<T: ?Sized> DerefMut for MutexGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        // Safety: We hold the exclusive lock
        unsafe { &mut *self.mutex.data.get() }
    }
}

impl<T: ?Sized> Drop for MutexGuard<'_, T> {
    fn drop(&mut self) {
        self.mutex.lock.unlock();
    }
}

// ============================================================================
// Condition Variable
// ============================================================================

/// Condition variable pairing with [`Mutex`].
///
/// Wakeups are tracked by a sequence count rather than a wait queue: a
/// waiter samples the count while still holding the mutex, so any
/// signal serialized after the waiter's predicate check is guaranteed
/// to change the sampled value. There are no lost wakeups, but there
/// may be spurious ones; callers must re-check their predicate in a
/// loop after every wait.
pub struct CondVar {
    seq: AtomicUsize,
    /// Number of waiting threads
    waiters: AtomicUsize,
}

impl CondVar {
    /// Create a new condition variable
    pub const fn new() -> Self {
        Self {
            seq: AtomicUsize::new(0),
            waiters: AtomicUsize::new(0),
        }
    }

    /// Atomically release the mutex and suspend until the next signal
    /// or broadcast, then reacquire the mutex before returning.
    pub fn wait<'a, T: ?Sized>(&self, guard: MutexGuard<'a, T>) -> MutexGuard<'a, T> {
        // Sample before releasing the lock; see the type-level comment.
        let ticket = self.seq.load(Ordering::Acquire);
        let mutex = guard.mutex;
        self.waiters.fetch_add(1, Ordering::SeqCst);
        drop(guard);

        while self.seq.load(Ordering::Acquire) == ticket {
            core::hint::spin_loop();
        }

        self.waiters.fetch_sub(1, Ordering::SeqCst);
        mutex.lock()
    }

    /// Wake at least one waiting thread.
    ///
    /// May wake more than one; waiters re-check their predicate anyway.
    pub fn signal(&self) {
        self.seq.fetch_add(1, Ordering::Release);
    }

    /// Wake every waiting thread
    pub fn broadcast(&self) {
        self.seq.fetch_add(1, Ordering::Release);
    }

    /// Get number of waiting threads
    pub fn waiter_count(&self) -> usize {
        self.waiters.load(Ordering::SeqCst)
    }
}

impl Default for CondVar {
    fn default() -> Self {
        Self::new()
    }
}
