use std::time::Duration;

pub mod pacing;
pub mod shutdown;
pub mod timer_loop;

pub use pacing::RefreshPacer;
pub use shutdown::ShutdownSignal;
pub use timer_loop::{LoopReport, StopReason, run_timer_loop};

/// 60 Hz refresh used by the back-ends that drive their own loop.
pub const REFRESH_PERIOD: Duration = Duration::from_nanos(16_666_667);
