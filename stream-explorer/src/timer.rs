use std::time::Duration;

/// A single-shot timer. Dropping the handle does not cancel it, [`TimeoutHandle::cancel`] does.
#[derive(Debug)]
pub(crate) enum TimeoutHandle {
    None,
    #[cfg(target_arch = "wasm32")]
    Wasm(leptos::prelude::TimeoutHandle),
    #[cfg(not(target_arch = "wasm32"))]
    Tokio(tokio::task::JoinHandle<()>),
    #[cfg(not(target_arch = "wasm32"))]
    Spawned(futures::future::AbortHandle),
}

impl TimeoutHandle {
    pub fn cancel(&mut self) {
        match std::mem::replace(self, TimeoutHandle::None) {
            TimeoutHandle::None => {}
            #[cfg(target_arch = "wasm32")]
            TimeoutHandle::Wasm(handle) => handle.clear(),
            #[cfg(not(target_arch = "wasm32"))]
            TimeoutHandle::Tokio(handle) => handle.abort(),
            #[cfg(not(target_arch = "wasm32"))]
            TimeoutHandle::Spawned(handle) => handle.abort(),
        }
    }
}

/// Run `cb` once after `duration`. Never runs `cb` before `duration` has passed.
///
/// In the browser this is a `setTimeout`. Natively it is a tokio task when called inside a tokio runtime, otherwise
/// a [`futures_timer::Delay`] spawned on the global [`any_spawner::Executor`].
pub(crate) fn set_timeout(cb: impl FnOnce() + Send + 'static, duration: Duration) -> TimeoutHandle {
    #[cfg(target_arch = "wasm32")]
    {
        match leptos::prelude::set_timeout_with_handle(cb, duration) {
            Ok(handle) => TimeoutHandle::Wasm(handle),
            Err(e) => {
                tracing::warn!("failed to schedule timeout, dropping callback: {e:?}");
                TimeoutHandle::None
            }
        }
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        match tokio::runtime::Handle::try_current() {
            // Tokio's own timer, so a paused test clock drives it:
            Ok(runtime) => TimeoutHandle::Tokio(runtime.spawn(async move {
                tokio::time::sleep(duration).await;
                cb();
            })),
            Err(_) => {
                let (delayed, abort) = futures::future::abortable(async move {
                    futures_timer::Delay::new(duration).await;
                    cb();
                });
                any_spawner::Executor::spawn(async move {
                    _ = delayed.await;
                });
                TimeoutHandle::Spawned(abort)
            }
        }
    }
}
