//! Debug-only shard lock-order guard.
//!
//! A thread must never hold two shard locks at once. In debug builds,
//! entering a shard while this thread is already inside one panics. In
//! release builds, this compiles to a zero-cost no-op.

use core::marker::PhantomData;

#[cfg(debug_assertions)]
std::thread_local! {
    static DEPTH: core::cell::Cell<u32> = const { core::cell::Cell::new(0) };
}

/// Enter a shard critical section. Take the guard *before* acquiring the
/// shard lock and keep it alive until the lock guard is dropped:
/// `let _g = reentrancy::enter_shard();`.
#[inline]
pub(crate) fn enter_shard() -> ShardGuard {
    #[cfg(debug_assertions)]
    DEPTH.with(|d| {
        let depth = d.get();
        assert!(
            depth == 0,
            "lock order violation: thread already holds a shard lock"
        );
        d.set(depth + 1);
    });
    ShardGuard {
        _nosend: PhantomData,
    }
}

/// RAII guard returned by `enter_shard`. Tied to the current thread.
pub(crate) struct ShardGuard {
    _nosend: PhantomData<*mut ()>,
}

impl Drop for ShardGuard {
    fn drop(&mut self) {
        #[cfg(debug_assertions)]
        DEPTH.with(|d| {
            let depth = d.get();
            debug_assert!(depth > 0);
            d.set(depth - 1);
        });
    }
}
