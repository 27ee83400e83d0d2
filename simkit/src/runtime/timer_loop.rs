use std::thread;
use std::time::{Duration, Instant};

use log::debug;

use super::REFRESH_PERIOD;
use super::pacing::RefreshPacer;
use super::shutdown::ShutdownSignal;
use crate::error::BackendError;
use crate::toolkit::Toolkit;

const MIN_IDLE: Duration = Duration::from_millis(1);

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StopReason {
    FrameLimit,
    Shutdown,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct LoopReport {
    pub frames: u64,
    pub elapsed: Duration,
    pub stopped_by: StopReason,
}

/// Blocking loop shared by back-ends without a native event loop.
///
/// Every wake-up runs one timer pass. Whenever a frame is due `present` is
/// called with the toolkit so the back-end can render and flush. Returns
/// once `shutdown` is requested or `frame_limit` frames have elapsed.
pub fn run_timer_loop<P>(
    toolkit: &mut dyn Toolkit,
    frame_limit: Option<u64>,
    shutdown: &ShutdownSignal,
    mut present: P,
) -> Result<LoopReport, BackendError>
where
    P: FnMut(&mut dyn Toolkit) -> Result<(), BackendError>,
{
    let started = Instant::now();
    let mut pacer = RefreshPacer::new(REFRESH_PERIOD, started);

    let stopped_by = loop {
        if shutdown.is_requested() {
            break StopReason::Shutdown;
        }
        if pacer.limit_reached(frame_limit) {
            break StopReason::FrameLimit;
        }

        let idle = toolkit.handle_timers().max(MIN_IDLE);

        let now = Instant::now();
        if pacer.frame_due(now) {
            present(toolkit)?;
        }

        let wake = pacer.wake_at(now, idle);
        let now = Instant::now();
        if wake > now {
            thread::sleep(wake - now);
        }
    };

    let report = LoopReport {
        frames: pacer.frames(),
        elapsed: started.elapsed(),
        stopped_by,
    };
    debug!("timer loop stopped: {:?}", report);

    Ok(report)
}
