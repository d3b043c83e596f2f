//! Monotonic clock, frame sleeps and the per-tick scheduler used by animations.
//!
//! Everything that needs "request the next frame" goes through [`FrameLoop`]:
//! a callback is registered, invoked once per display tick with the current
//! timestamp, and dropped as soon as it reports [`TickControl::Done`] or its
//! handle is cancelled. The host (a coroutine in the dashboard view) only has
//! to call [`FrameLoop::tick`] after each [`sleep_ms`] of
//! [`FRAME_INTERVAL_MS`] while [`FrameLoop::is_idle`] is false.

use std::fmt;

/// Roughly one display refresh at 60 Hz.
pub const FRAME_INTERVAL_MS: u64 = 16;

/// Milliseconds since an arbitrary, monotonic origin.
#[derive(Debug, Default, Clone, Copy, PartialEq, PartialOrd)]
pub struct InstantStamp(pub f64);

impl InstantStamp {
    pub fn elapsed_since(self, earlier: InstantStamp) -> f64 {
        (self.0 - earlier.0).max(0.0)
    }
}

#[cfg(target_arch = "wasm32")]
pub fn now() -> InstantStamp {
    let ms = web_sys::window()
        .and_then(|window| window.performance())
        .map(|perf| perf.now())
        .unwrap_or_else(js_sys::Date::now);
    InstantStamp(ms)
}

#[cfg(not(target_arch = "wasm32"))]
pub fn now() -> InstantStamp {
    use once_cell::sync::Lazy;
    use std::time::Instant;

    static ORIGIN: Lazy<Instant> = Lazy::new(Instant::now);
    InstantStamp(ORIGIN.elapsed().as_secs_f64() * 1_000.0)
}

#[cfg(target_arch = "wasm32")]
pub async fn sleep_ms(ms: u64) {
    gloo_timers::future::TimeoutFuture::new(ms.min(u32::MAX as u64) as u32).await;
}

#[cfg(not(target_arch = "wasm32"))]
pub async fn sleep_ms(ms: u64) {
    tokio::time::sleep(std::time::Duration::from_millis(ms)).await;
}

/// What a frame callback wants after running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickControl {
    Continue,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TickerHandle(u64);

type FrameCallback = Box<dyn FnMut(InstantStamp) -> TickControl>;

/// Registry of callbacks run once per display tick.
#[derive(Default)]
pub struct FrameLoop {
    next_id: u64,
    tickers: Vec<(TickerHandle, FrameCallback)>,
}

impl fmt::Debug for FrameLoop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameLoop")
            .field("registered", &self.tickers.len())
            .finish()
    }
}

impl FrameLoop {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, callback: F) -> TickerHandle
    where
        F: FnMut(InstantStamp) -> TickControl + 'static,
    {
        let handle = TickerHandle(self.next_id);
        self.next_id += 1;
        self.tickers.push((handle, Box::new(callback)));
        handle
    }

    /// Returns `true` if the handle was still registered.
    pub fn cancel(&mut self, handle: TickerHandle) -> bool {
        let before = self.tickers.len();
        self.tickers.retain(|(id, _)| *id != handle);
        before != self.tickers.len()
    }

    /// Drop every registered callback (view teardown).
    pub fn clear(&mut self) {
        self.tickers.clear();
    }

    pub fn is_idle(&self) -> bool {
        self.tickers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tickers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tickers.is_empty()
    }

    /// Run each registered callback once; de-registers those that are done.
    pub fn tick(&mut self, now: InstantStamp) {
        self.tickers
            .retain_mut(|(_, callback)| callback(now) == TickControl::Continue);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn callbacks_run_once_per_tick_until_done() {
        let calls = Rc::new(Cell::new(0));
        let mut frames = FrameLoop::new();

        let counter = calls.clone();
        frames.register(move |_| {
            counter.set(counter.get() + 1);
            if counter.get() >= 3 {
                TickControl::Done
            } else {
                TickControl::Continue
            }
        });

        for i in 0..5 {
            frames.tick(InstantStamp(i as f64 * 16.0));
        }

        assert_eq!(calls.get(), 3);
        assert!(frames.is_idle());
    }

    #[test]
    fn cancelled_callbacks_never_run_again() {
        let calls = Rc::new(Cell::new(0));
        let mut frames = FrameLoop::new();

        let counter = calls.clone();
        let handle = frames.register(move |_| {
            counter.set(counter.get() + 1);
            TickControl::Continue
        });

        frames.tick(InstantStamp(0.0));
        assert!(frames.cancel(handle));
        assert!(!frames.cancel(handle));
        frames.tick(InstantStamp(16.0));

        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn clear_drops_everything() {
        let mut frames = FrameLoop::new();
        frames.register(|_| TickControl::Continue);
        frames.register(|_| TickControl::Continue);
        assert_eq!(frames.len(), 2);

        frames.clear();
        assert!(frames.is_idle());
    }
}
