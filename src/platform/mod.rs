//! Host-independent platform pieces
//!
//! - `driver`: animation-frame loop state and fixed-step accounting
//! - `input`: edge-triggered jump latch

pub mod driver;
pub mod input;

pub use driver::{DriverState, FrameDriver, LoopControl};
pub use input::JumpLatch;
