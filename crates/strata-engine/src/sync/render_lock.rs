use std::sync::Arc;
use std::thread::{self, ThreadId};

use parking_lot::{Condvar, Mutex};

#[derive(Debug, Default)]
struct LockState {
    owner: Option<ThreadId>,
    depth: usize,
    acquisitions: u64,
}

#[derive(Debug)]
struct Inner {
    main_thread: ThreadId,
    state: Mutex<LockState>,
    released: Condvar,
}

/// Reentrant lock guarding shared render state.
///
/// Cloning yields another handle to the same lock. The thread that creates
/// the lock is the main (render) thread: [`RenderLock::lock_non_main`] is a
/// no-op there, since the render loop already serializes with itself.
#[derive(Debug, Clone)]
pub struct RenderLock {
    inner: Arc<Inner>,
}

impl Default for RenderLock {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderLock {
    /// Creates a lock whose main thread is the calling thread.
    pub fn new() -> Self {
        Self::with_main_thread(thread::current().id())
    }

    pub fn with_main_thread(main_thread: ThreadId) -> Self {
        Self {
            inner: Arc::new(Inner {
                main_thread,
                state: Mutex::new(LockState::default()),
                released: Condvar::new(),
            }),
        }
    }

    pub fn is_main_thread(&self) -> bool {
        thread::current().id() == self.inner.main_thread
    }

    /// Acquires the lock, blocking while another thread holds it.
    /// Reentrant for the holding thread.
    pub fn lock(&self) -> RenderLockGuard {
        self.acquire();
        RenderLockGuard { lock: self.clone() }
    }

    /// Acquires the lock unless another thread holds it.
    pub fn try_lock(&self) -> Option<RenderLockGuard> {
        let me = thread::current().id();
        let mut state = self.inner.state.lock();
        match state.owner {
            Some(owner) if owner != me => None,
            _ => {
                Self::enter(&mut state, me);
                Some(RenderLockGuard { lock: self.clone() })
            }
        }
    }

    /// Acquires the lock from a worker thread; does nothing on the main thread.
    ///
    /// Only the outermost call of a thread touches the underlying lock.
    pub fn lock_non_main(&self) -> NonMainGuard {
        if self.is_main_thread() {
            return NonMainGuard { lock: None };
        }
        self.acquire();
        NonMainGuard {
            lock: Some(self.clone()),
        }
    }

    /// Nesting depth of the calling thread; always 0 on the main thread.
    pub fn non_main_lock_count(&self) -> usize {
        if self.is_main_thread() {
            return 0;
        }
        self.depth_of(thread::current().id())
    }

    /// Times the lock went from free to held.
    pub fn acquisitions(&self) -> u64 {
        self.inner.state.lock().acquisitions
    }

    pub fn is_locked(&self) -> bool {
        self.inner.state.lock().owner.is_some()
    }

    fn depth_of(&self, thread: ThreadId) -> usize {
        let state = self.inner.state.lock();
        if state.owner == Some(thread) {
            state.depth
        } else {
            0
        }
    }

    fn enter(state: &mut LockState, me: ThreadId) {
        if state.owner == Some(me) {
            state.depth += 1;
        } else {
            state.owner = Some(me);
            state.depth = 1;
            state.acquisitions += 1;
        }
    }

    fn acquire(&self) {
        let me = thread::current().id();
        let mut state = self.inner.state.lock();
        while matches!(state.owner, Some(owner) if owner != me) {
            self.inner.released.wait(&mut state);
        }
        Self::enter(&mut state, me);
    }

    fn release(&self) {
        let mut state = self.inner.state.lock();
        debug_assert!(state.depth > 0, "render lock released more often than acquired");
        if state.owner != Some(thread::current().id()) {
            log::error!("render lock released by a thread that does not hold it");
        }
        state.depth = state.depth.saturating_sub(1);
        if state.depth == 0 {
            state.owner = None;
            self.inner.released.notify_one();
        }
    }
}

/// Held [`RenderLock`]; releases one nesting level on drop.
#[derive(Debug)]
pub struct RenderLockGuard {
    lock: RenderLock,
}

impl Drop for RenderLockGuard {
    fn drop(&mut self) {
        self.lock.release();
    }
}

/// Result of [`RenderLock::lock_non_main`]; empty on the main thread.
#[derive(Debug)]
pub struct NonMainGuard {
    lock: Option<RenderLock>,
}

impl NonMainGuard {
    /// Whether this guard holds the lock (false on the main thread).
    pub fn is_held(&self) -> bool {
        self.lock.is_some()
    }
}

impl Drop for NonMainGuard {
    fn drop(&mut self) {
        if let Some(lock) = self.lock.take() {
            lock.release();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::time::Duration;

    // ── main thread ───────────────────────────────────────────────────────

    #[test]
    fn main_thread_never_touches_the_lock() {
        let lock = RenderLock::new();
        let a = lock.lock_non_main();
        let b = lock.lock_non_main();

        assert!(!a.is_held() && !b.is_held());
        assert!(!lock.is_locked());
        assert_eq!(lock.acquisitions(), 0);
        assert_eq!(lock.non_main_lock_count(), 0);
    }

    #[test]
    fn lock_is_reentrant() {
        let lock = RenderLock::new();
        let outer = lock.lock();
        let inner = lock.lock();
        assert_eq!(lock.acquisitions(), 1);
        drop(inner);
        assert!(lock.is_locked());
        drop(outer);
        assert!(!lock.is_locked());
    }

    // ── worker threads ────────────────────────────────────────────────────

    #[test]
    fn nested_non_main_locks_acquire_once() {
        let lock = RenderLock::new();
        let worker = lock.clone();
        let (tx, rx) = mpsc::channel();
        let (resume_tx, resume_rx) = mpsc::channel::<()>();

        let handle = thread::spawn(move || {
            let outer = worker.lock_non_main();
            let inner = worker.lock_non_main();
            tx.send((worker.non_main_lock_count(), worker.acquisitions())).unwrap();

            drop(inner);
            tx.send((worker.non_main_lock_count(), worker.acquisitions())).unwrap();
            resume_rx.recv().unwrap();

            drop(outer);
            tx.send((worker.non_main_lock_count(), worker.acquisitions())).unwrap();
        });

        assert_eq!(rx.recv().unwrap(), (2, 1));
        assert_eq!(rx.recv().unwrap(), (1, 1));
        // Still held by the worker after one unlock.
        assert!(lock.try_lock().is_none());

        resume_tx.send(()).unwrap();
        assert_eq!(rx.recv().unwrap(), (0, 1));
        handle.join().unwrap();

        assert!(lock.try_lock().is_some());
    }

    #[test]
    fn worker_waits_for_the_main_thread() {
        let lock = RenderLock::new();
        let frame = lock.lock();

        let worker = lock.clone();
        let (tx, rx) = mpsc::channel();
        let handle = thread::spawn(move || {
            let _guard = worker.lock_non_main();
            tx.send(()).unwrap();
        });

        assert!(rx.recv_timeout(Duration::from_millis(50)).is_err());
        drop(frame);
        rx.recv_timeout(Duration::from_secs(5)).unwrap();
        handle.join().unwrap();
        assert!(!lock.is_locked());
    }

    #[test]
    fn guard_releases_on_panic() {
        let lock = RenderLock::new();
        let worker = lock.clone();
        let result = thread::spawn(move || {
            let _guard = worker.lock_non_main();
            panic!("worker failed while holding the lock");
        })
        .join();

        assert!(result.is_err());
        assert!(!lock.is_locked());
    }
}
