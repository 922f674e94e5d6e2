//! Type aliases for the shared-state types used by the bridge.
//!
//! The bridge runs two threads of control (the serial client and the
//! intercept worker), so everything shared is `Send + Sync`.
//! Uses `parking_lot::Mutex` for better performance than `std::sync::Mutex`
//! and for its poison-free `lock()`.

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

/// A thread-safe, mutex-protected wrapper for cross-thread sharing.
///
/// # Example
/// ```rust,ignore
/// let sent: ThreadSafe<Vec<String>> = thread_safe(Vec::new());
/// sent.lock().push("M105".to_string());
/// ```
pub type ThreadSafe<T> = Arc<Mutex<T>>;

/// A thread-safe optional wrapper for state that is taken on shutdown.
pub type ThreadSafeOption<T> = Arc<Mutex<Option<T>>>;

/// A thread-safe deque for cross-thread queue/buffer management.
pub type ThreadSafeDeque<T> = Arc<Mutex<VecDeque<T>>>;

/// A one-way boolean flag shared between threads.
///
/// Used for the subscription latch: set once the machine model has been
/// fetched, cleared only on close.
pub type Latch = Arc<AtomicBool>;

/// Create a new `ThreadSafe<T>` from a value.
#[inline]
pub fn thread_safe<T>(value: T) -> ThreadSafe<T> {
    Arc::new(Mutex::new(value))
}

/// Create a new `ThreadSafeOption<T>` initialized to `None`.
#[inline]
pub fn thread_safe_none<T>() -> ThreadSafeOption<T> {
    Arc::new(Mutex::new(None))
}

/// Create a new empty `ThreadSafeDeque<T>`.
#[inline]
pub fn thread_safe_deque<T>() -> ThreadSafeDeque<T> {
    Arc::new(Mutex::new(VecDeque::new()))
}

/// Create a new, unset `Latch`.
#[inline]
pub fn latch() -> Latch {
    Arc::new(AtomicBool::new(false))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::Ordering;

    #[test]
    fn test_thread_safe_creation() {
        let value: ThreadSafe<i32> = thread_safe(42);
        assert_eq!(*value.lock(), 42);

        *value.lock() = 100;
        assert_eq!(*value.lock(), 100);
    }

    #[test]
    fn test_thread_safe_none() {
        let opt: ThreadSafeOption<String> = thread_safe_none();
        assert!(opt.lock().is_none());
        *opt.lock() = Some("handle".to_string());
        assert_eq!(opt.lock().take().as_deref(), Some("handle"));
        assert!(opt.lock().is_none());
    }

    #[test]
    fn test_thread_safe_deque() {
        let deque: ThreadSafeDeque<i32> = thread_safe_deque();
        deque.lock().push_back(1);
        deque.lock().push_back(2);
        deque.lock().push_front(0);

        assert_eq!(deque.lock().len(), 3);
        assert_eq!(deque.lock().pop_front(), Some(0));
    }

    #[test]
    fn test_latch_shared_between_clones() {
        let flag = latch();
        let other = flag.clone();
        assert!(!other.load(Ordering::SeqCst));
        flag.store(true, Ordering::SeqCst);
        assert!(other.load(Ordering::SeqCst));
    }
}
