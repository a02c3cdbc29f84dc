//! Jump input latching
//!
//! Hosts report presses as they arrive; the simulation consumes at most one
//! jump per tick, however many presses landed in between.

#[derive(Debug, Clone, Copy, Default)]
pub struct JumpLatch {
    pending: bool,
}

impl JumpLatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a press. Returns false if a jump was already latched.
    pub fn press(&mut self) -> bool {
        !std::mem::replace(&mut self.pending, true)
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Consume the latched jump for this tick
    pub fn take(&mut self) -> bool {
        std::mem::take(&mut self.pending)
    }

    pub fn clear(&mut self) {
        self.pending = false;
    }
}
