//! Pluggable display and input back-ends.
//!
//! A back-end is selected by name from the [`registry`], brought up by the
//! [`lifecycle`] controller and then owns the process through its run
//! loop. Display back-ends provide the surface and the run loop. Input
//! back-ends only deliver events and are polled from inside the display
//! back-end's loop.

use std::fmt;

use crate::config::Settings;
use crate::error::BackendError;
use crate::toolkit::{InputEvent, Toolkit};

#[cfg(all(target_os = "linux", feature = "evdev"))]
pub mod evdev;
#[cfg(target_os = "linux")]
pub mod fbdev;
pub mod headless;
pub mod lifecycle;
pub mod registry;
#[cfg(feature = "winit")]
pub mod windowed;

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum BackendKind {
    Display,
    Input,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Display => write!(f, "display"),
            BackendKind::Input => write!(f, "input"),
        }
    }
}

pub trait Backend {
    /// Acquires the device, window or connection. Called once.
    fn init(&mut self, settings: &Settings) -> Result<(), BackendError>;

    /// Pixel size of the surface once initialized, when it differs from
    /// the configured window size (e.g. a framebuffer's native mode).
    fn resolution(&self) -> Option<(u32, u32)> {
        None
    }

    /// Blocks until the simulator should exit.
    fn run_loop(
        &mut self,
        _toolkit: &mut dyn Toolkit,
    ) -> Result<(), BackendError> {
        Err(BackendError::NotRunnable)
    }

    /// Drains pending input without blocking.
    fn poll_input(&mut self, _sink: &mut dyn FnMut(InputEvent)) {}
}
