//! Display back-end without any output device.
//!
//! Renders into memory at the refresh rate. Used for smoke runs and CI,
//! usually together with `LV_SIM_FRAME_LIMIT`.

use log::info;

use super::{Backend, BackendKind};
use crate::config::Settings;
use crate::error::BackendError;
use crate::runtime::{ShutdownSignal, run_timer_loop};
use crate::toolkit::{PixelBuffer, Toolkit};

pub const NAME: &str = "headless";
pub const KIND: BackendKind = BackendKind::Display;

pub fn create() -> Box<dyn Backend> {
    Box::new(Headless::default())
}

#[derive(Default)]
pub struct Headless {
    buffer: Option<PixelBuffer>,
    frame_limit: Option<u64>,
    frames_rendered: u64,
}

impl Headless {
    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }
}

impl Backend for Headless {
    fn init(&mut self, settings: &Settings) -> Result<(), BackendError> {
        self.buffer = Some(PixelBuffer::new(
            settings.window_width,
            settings.window_height,
        ));
        self.frame_limit = settings.frame_limit;
        Ok(())
    }

    fn run_loop(
        &mut self,
        toolkit: &mut dyn Toolkit,
    ) -> Result<(), BackendError> {
        let Some(buffer) = self.buffer.as_mut() else {
            return Err(BackendError::NotInitialized);
        };
        let shutdown = ShutdownSignal::install()?;
        let frames_rendered = &mut self.frames_rendered;

        let report =
            run_timer_loop(toolkit, self.frame_limit, &shutdown, |toolkit| {
                if toolkit.render(buffer) {
                    *frames_rendered += 1;
                }
                Ok(())
            })?;

        info!(
            "headless loop stopped after {} frames in {:?} ({:?})",
            report.frames, report.elapsed, report.stopped_by
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serial_test::serial;

    use super::*;
    use crate::toolkit::SurfaceInfo;

    #[derive(Default)]
    struct PaintingToolkit {
        timer_passes: u32,
    }

    impl Toolkit for PaintingToolkit {
        fn init(&mut self, _settings: &Settings) {}

        fn build_screen(&mut self, _surface: &SurfaceInfo) {}

        fn handle_timers(&mut self) -> Duration {
            self.timer_passes += 1;
            Duration::from_millis(1)
        }

        fn render(&mut self, target: &mut PixelBuffer) -> bool {
            target.fill(0x121212);
            true
        }
    }

    #[test]
    fn run_before_init_is_rejected() {
        let mut backend = Headless::default();
        let err = backend
            .run_loop(&mut PaintingToolkit::default())
            .expect_err("not initialized");
        assert!(matches!(err, BackendError::NotInitialized));
    }

    #[test]
    #[serial]
    fn frame_limit_ends_the_loop() {
        let settings = Settings {
            window_width: 16,
            window_height: 8,
            frame_limit: Some(2),
            ..Settings::default()
        };
        let mut backend = Headless::default();
        backend.init(&settings).unwrap();

        let mut toolkit = PaintingToolkit::default();
        backend.run_loop(&mut toolkit).unwrap();

        assert!(toolkit.timer_passes >= 1);
        assert_eq!(backend.frames_rendered(), 2);
        let buffer = backend.buffer.as_ref().unwrap();
        assert!(buffer.pixels().iter().all(|p| *p == 0x121212));
    }
}
