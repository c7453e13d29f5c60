use std::{sync::Arc, time::Duration};

use parking_lot::Mutex;

use crate::timer::{TimeoutHandle, set_timeout};

/// A trailing-edge debounced callback.
///
/// Each [`Debounced::call`] restarts the delay and replaces the pending argument, so of a burst of calls
/// closer together than the delay only the last one runs.
pub(crate) struct Debounced<A> {
    inner: Arc<DebouncedInner<A>>,
}

impl<A> Clone for Debounced<A> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

struct DebouncedInner<A> {
    delay: Duration,
    callback: Box<dyn Fn(A) + Send + Sync>,
    pending: Mutex<Option<Pending>>,
}

struct Pending {
    armed_at: u64,
    handle: TimeoutHandle,
}

impl<A> Drop for DebouncedInner<A> {
    fn drop(&mut self) {
        if let Some(mut pending) = self.pending.get_mut().take() {
            pending.handle.cancel();
        }
    }
}

impl<A> Debounced<A>
where
    A: Send + 'static,
{
    pub fn new(delay: Duration, callback: impl Fn(A) + Send + Sync + 'static) -> Self {
        Self {
            inner: Arc::new(DebouncedInner {
                delay,
                callback: Box::new(callback),
                pending: Mutex::new(None),
            }),
        }
    }

    pub fn call(&self, arg: A) {
        let armed_at = crate::utils::new_timer_id();
        let mut pending = self.inner.pending.lock();
        if let Some(mut previous) = pending.take() {
            tracing::trace!("debounce re-armed, dropping pending call");
            previous.handle.cancel();
        }

        // Weak so a pending timer doesn't keep the owner alive:
        let weak = Arc::downgrade(&self.inner);
        let fire = move || {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            {
                let mut pending = inner.pending.lock();
                // A cancel or newer call raced with this timer:
                if pending.as_ref().map(|p| p.armed_at) != Some(armed_at) {
                    return;
                }
                *pending = None;
            }
            (inner.callback)(arg);
        };

        // Placeholder first, the timer may fire on another thread before `set_timeout` returns:
        *pending = Some(Pending {
            armed_at,
            handle: TimeoutHandle::None,
        });
        drop(pending);
        let mut handle = set_timeout(fire, self.inner.delay);
        let mut pending = self.inner.pending.lock();
        match pending.as_mut() {
            Some(p) if p.armed_at == armed_at => p.handle = handle,
            _ => handle.cancel(),
        }
    }

    /// Drop the pending call, if any. Returns whether one was pending.
    pub fn cancel(&self) -> bool {
        if let Some(mut pending) = self.inner.pending.lock().take() {
            pending.handle.cancel();
            true
        } else {
            false
        }
    }

    pub fn is_pending(&self) -> bool {
        self.inner.pending.lock().is_some()
    }
}
