//! Frame driver
//!
//! Tracks whether an animation-frame loop is scheduled. Each frame the loop
//! runs is one simulation tick followed by one render.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DriverState {
    /// No frame scheduled
    #[default]
    Idle,
    /// A frame loop is running
    Active,
}

/// What the host does after painting a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    /// Schedule another frame
    Continue,
    /// Stop requesting frames; the driver is idle again
    Stop,
}

#[derive(Debug, Clone, Default)]
pub struct FrameDriver {
    state: DriverState,
    frames: u64,
}

impl FrameDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == DriverState::Active
    }

    /// Enter `Active`. Returns true only on the Idle -> Active edge, i.e.
    /// when the caller has to schedule the first frame.
    pub fn activate(&mut self) -> bool {
        if self.state == DriverState::Active {
            return false;
        }
        self.state = DriverState::Active;
        self.frames = 0;
        true
    }

    /// Frames run since the last activation
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Open a frame. Returns true when the frame should simulate a tick,
    /// which is exactly once per frame while the loop is active.
    pub fn begin_frame(&mut self) -> bool {
        if self.state == DriverState::Active {
            self.frames += 1;
            true
        } else {
            false
        }
    }

    /// Close out a frame. Once the session stops running the loop stops
    /// and the driver goes back to `Idle`.
    pub fn end_frame(&mut self, running: bool) -> LoopControl {
        if !running || self.state == DriverState::Idle {
            self.state = DriverState::Idle;
            LoopControl::Stop
        } else {
            LoopControl::Continue
        }
    }
}
