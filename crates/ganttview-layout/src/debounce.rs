//! Coalescing of resize bursts.
//!
//! The debouncer owns no timer. The host reports resizes with `notify` and
//! drives time with `poll`; a resize is released once no newer one arrived
//! for a full window.

use ganttview_core::Viewport;

/// Default quiet window before a resize triggers a render
pub const DEFAULT_RESIZE_DEBOUNCE_MS: u64 = 20;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Pending {
    viewport: Viewport,
    deadline: u64,
}

/// Clock-driven resize debouncer
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeDebouncer {
    window_ms: u64,
    pending: Option<Pending>,
}

impl Default for ResizeDebouncer {
    fn default() -> Self {
        Self::new(DEFAULT_RESIZE_DEBOUNCE_MS)
    }
}

impl ResizeDebouncer {
    pub fn new(window_ms: u64) -> Self {
        Self {
            window_ms,
            pending: None,
        }
    }

    pub fn window_ms(&self) -> u64 {
        self.window_ms
    }

    /// Record a resize; restarts the quiet window
    pub fn notify(&mut self, viewport: Viewport, now_ms: u64) {
        self.pending = Some(Pending {
            viewport,
            deadline: now_ms.saturating_add(self.window_ms),
        });
    }

    /// Release the latest viewport once its window has elapsed
    pub fn poll(&mut self, now_ms: u64) -> Option<Viewport> {
        match self.pending {
            Some(pending) if now_ms >= pending.deadline => {
                self.pending = None;
                Some(pending.viewport)
            }
            _ => None,
        }
    }

    /// Drop any pending resize
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// When the pending resize becomes due
    pub fn deadline(&self) -> Option<u64> {
        self.pending.map(|p| p.deadline)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}
