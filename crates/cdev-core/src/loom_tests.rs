//! Loom tests for the locked device discipline
//!
//! The driver guards its single `DeviceState` with a `spin::Mutex` so that
//! the zero-fill and the copy of a write are observed together. These models
//! explore every interleaving of sessions sharing that state.
//!
//! `LoomSpinLock` is a simplified version of that lock: the same
//! compare-exchange acquire and release store, built on loom's atomics so
//! loom can reorder around them.
//!
//! # Running Loom Tests
//!
//! ```bash
//! cargo test --package cdev-core --features loom -- --test-threads=1 loom
//! ```

#[cfg(all(test, feature = "loom"))]
mod tests {
    use alloc::vec;
    use alloc::vec::Vec;
    use loom::cell::UnsafeCell;
    use loom::sync::atomic::{AtomicBool, Ordering};
    use loom::sync::Arc;
    use loom::thread;

    use crate::state::DeviceState;

    const CAPACITY: usize = 8;

    /// Test-and-set lock with `spin::Mutex`'s orderings
    struct LoomSpinLock<T> {
        locked: AtomicBool,
        value: UnsafeCell<T>,
    }

    unsafe impl<T: Send> Sync for LoomSpinLock<T> {}

    impl<T> LoomSpinLock<T> {
        fn new(value: T) -> Self {
            Self {
                locked: AtomicBool::new(false),
                value: UnsafeCell::new(value),
            }
        }

        fn with<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
            while self
                .locked
                .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
                .is_err()
            {
                thread::yield_now();
            }
            // SAFETY: the flag grants exclusive access until the release store
            let result = self.value.with_mut(|ptr| f(unsafe { &mut *ptr }));
            self.locked.store(false, Ordering::Release);
            result
        }
    }

    fn shared_device() -> Arc<LoomSpinLock<DeviceState>> {
        Arc::new(LoomSpinLock::new(DeviceState::new(CAPACITY)))
    }

    fn image(data: &[u8], pos: usize) -> Vec<u8> {
        let mut buf = vec![0u8; CAPACITY];
        buf[pos..pos + data.len()].copy_from_slice(data);
        buf
    }

    /// Test: a reader sees the buffer before or after a write, never between
    #[test]
    fn loom_read_never_sees_torn_write() {
        loom::model(|| {
            let device = shared_device();
            device.with(|s| s.write(b"abcd", 0)).unwrap();

            let writer = device.clone();
            let t = thread::spawn(move || {
                writer.with(|s| s.write(b"wxyz", 4)).unwrap();
            });

            let seen = device.with(|s| s.read(CAPACITY, 0)).unwrap().data;
            t.join().unwrap();

            assert!(
                seen == image(b"abcd", 0) || seen == image(b"wxyz", 4),
                "reader observed a partial write: {:?}",
                seen
            );
        });
    }

    /// Test: concurrent writers leave exactly one writer's image behind
    #[test]
    fn loom_last_writer_wins_whole_buffer() {
        loom::model(|| {
            let device = shared_device();

            let d1 = device.clone();
            let t1 = thread::spawn(move || {
                d1.with(|s| s.write(b"one", 0)).unwrap();
            });

            let d2 = device.clone();
            let t2 = thread::spawn(move || {
                d2.with(|s| s.write(b"two", 5)).unwrap();
            });

            t1.join().unwrap();
            t2.join().unwrap();

            let contents = device.with(|s| s.contents().to_vec());
            assert!(contents == image(b"one", 0) || contents == image(b"two", 5));
        });
    }

    /// Test: opens from concurrent sessions are all counted
    #[test]
    fn loom_concurrent_opens_counted() {
        loom::model(|| {
            let device = shared_device();

            let handles: Vec<_> = (0..2)
                .map(|_| {
                    let d = device.clone();
                    thread::spawn(move || {
                        d.with(|s| s.open());
                    })
                })
                .collect();

            for h in handles {
                h.join().unwrap();
            }

            assert_eq!(device.with(|s| s.open_count()), 2);
        });
    }
}
