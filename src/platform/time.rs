//! Frame clock
//!
//! The scheduler asks a [`FrameClock`] for exactly one callback per display
//! refresh and re-arms it at the end of each tick. In the browser this is
//! `requestAnimationFrame`; headless runs and tests drive a [`ManualClock`].

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::EngineError;

/// Callback receiving the frame timestamp in milliseconds
pub type FrameCallback = Box<dyn FnOnce(f64)>;

/// Identifies one pending frame request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub i32);

pub trait FrameClock {
    fn request_frame(&self, callback: FrameCallback) -> Result<FrameHandle, EngineError>;

    /// Cancelling an unknown or already-fired handle is a no-op
    fn cancel_frame(&self, handle: FrameHandle);
}

#[derive(Default)]
struct Queue {
    next: i32,
    pending: Vec<(FrameHandle, FrameCallback)>,
}

/// Clock advanced by hand; clones share one queue
#[derive(Clone, Default)]
pub struct ManualClock {
    queue: Rc<RefCell<Queue>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> usize {
        self.queue.borrow().pending.len()
    }

    /// Fire every callback pending before this call. Callbacks requested
    /// while firing wait for the next advance. Returns the number fired.
    pub fn advance(&self, timestamp: f64) -> usize {
        let due = std::mem::take(&mut self.queue.borrow_mut().pending);
        let fired = due.len();
        for (_, callback) in due {
            callback(timestamp);
        }
        fired
    }
}

impl FrameClock for ManualClock {
    fn request_frame(&self, callback: FrameCallback) -> Result<FrameHandle, EngineError> {
        let mut queue = self.queue.borrow_mut();
        queue.next += 1;
        let handle = FrameHandle(queue.next);
        queue.pending.push((handle, callback));
        Ok(handle)
    }

    fn cancel_frame(&self, handle: FrameHandle) {
        self.queue.borrow_mut().pending.retain(|(h, _)| *h != handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_advance_fires_pending_once() {
        let clock = ManualClock::new();
        let seen = Rc::new(Cell::new(0.0));
        let sink = Rc::clone(&seen);
        clock
            .request_frame(Box::new(move |ts| sink.set(ts)))
            .expect("request");
        assert_eq!(clock.advance(16.0), 1);
        assert_eq!(seen.get(), 16.0);
        assert_eq!(clock.advance(32.0), 0);
    }

    #[test]
    fn test_cancel_prevents_callback() {
        let clock = ManualClock::new();
        let fired = Rc::new(Cell::new(false));
        let sink = Rc::clone(&fired);
        let handle = clock
            .request_frame(Box::new(move |_| sink.set(true)))
            .expect("request");
        clock.cancel_frame(handle);
        clock.cancel_frame(handle);
        assert_eq!(clock.advance(16.0), 0);
        assert!(!fired.get());
    }

    #[test]
    fn test_rearm_waits_for_next_advance() {
        let clock = ManualClock::new();
        let inner = clock.clone();
        clock
            .request_frame(Box::new(move |_| {
                let _ = inner.request_frame(Box::new(|_| {}));
            }))
            .expect("request");
        assert_eq!(clock.advance(16.0), 1);
        assert_eq!(clock.pending(), 1);
    }
}
