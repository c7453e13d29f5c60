use std::{
    hash::{DefaultHasher, Hash, Hasher},
    sync::atomic::{AtomicU64, Ordering},
};

/// Process-wide, increasing ids. Each generator counts on its own.
macro_rules! id_generator {
    ($($name:ident),+ $(,)?) => {
        $(
            pub(crate) fn $name() -> u64 {
                static NEXT: AtomicU64 = AtomicU64::new(0);
                NEXT.fetch_add(1, Ordering::Relaxed)
            }
        )+
    };
}

id_generator!(
    new_request_id,
    new_subscriber_id,
    new_timer_id,
    new_cache_entry_id,
);

/// The 64-bit hash a cache is keyed on, in place of the key itself.
///
/// Two distinct keys with colliding hashes share an entry, so one would be served the other's cached value. With
/// `DefaultHasher` that's improbable enough for the number of distinct arguments a list sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct KeyHash(u64);

impl KeyHash {
    pub fn new<K: Hash + ?Sized>(key: &K) -> Self {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        Self(hasher.finish())
    }
}

/// Runs the closure when dropped, at most once.
pub(crate) struct OnDrop<F: FnOnce()>(Option<F>);

impl<F: FnOnce()> OnDrop<F> {
    pub fn new(f: F) -> Self {
        Self(Some(f))
    }
}

impl<F: FnOnce()> Drop for OnDrop<F> {
    fn drop(&mut self) {
        if let Some(f) = self.0.take() {
            f();
        }
    }
}
