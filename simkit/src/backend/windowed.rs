//! Desktop window display back-end on top of winit.
//!
//! The toolkit renders into a [`PixelBuffer`] of the configured size which
//! is copied into a softbuffer surface on every redraw.

use std::num::NonZeroU32;
use std::rc::Rc;
use std::time::{Duration, Instant};

use log::{error, info};
use softbuffer::{Context, Surface};
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowAttributes, WindowId};

use super::{Backend, BackendKind};
use crate::config::Settings;
use crate::error::BackendError;
use crate::runtime::{REFRESH_PERIOD, RefreshPacer, ShutdownSignal};
use crate::toolkit::{InputEvent, PixelBuffer, Toolkit};

pub const NAME: &str = "winit";
pub const KIND: BackendKind = BackendKind::Display;

const WINDOW_TITLE: &str = "Simulator";
const MIN_IDLE: Duration = Duration::from_millis(1);

pub fn create() -> Box<dyn Backend> {
    Box::new(Windowed::default())
}

#[derive(Default)]
pub struct Windowed {
    event_loop: Option<EventLoop<()>>,
    size: (u32, u32),
    frame_limit: Option<u64>,
}

impl Backend for Windowed {
    // Creating the event loop is what connects to the display server, so a
    // missing display fails here rather than in the run loop.
    fn init(&mut self, settings: &Settings) -> Result<(), BackendError> {
        let event_loop = EventLoop::new()
            .map_err(|err| BackendError::EventLoop(err.to_string()))?;

        self.event_loop = Some(event_loop);
        self.size = settings.window_size();
        self.frame_limit = settings.frame_limit;
        Ok(())
    }

    fn run_loop(
        &mut self,
        toolkit: &mut dyn Toolkit,
    ) -> Result<(), BackendError> {
        let Some(event_loop) = self.event_loop.take() else {
            return Err(BackendError::NotInitialized);
        };
        event_loop.set_control_flow(ControlFlow::Wait);

        let (width, height) = self.size;
        let mut app = WindowApp {
            toolkit,
            buffer: PixelBuffer::new(width, height),
            frame_limit: self.frame_limit,
            shutdown: ShutdownSignal::install()?,
            pacer: RefreshPacer::new(REFRESH_PERIOD, Instant::now()),
            output: None,
            failure: None,
        };

        event_loop
            .run_app(&mut app)
            .map_err(|err| BackendError::EventLoop(err.to_string()))?;

        if let Some(err) = app.failure {
            return Err(err);
        }

        info!("window loop stopped after {} frames", app.pacer.frames());
        Ok(())
    }
}

/// The open window and the surface its pixels are presented on.
struct Output {
    window: Rc<Window>,
    surface: Surface<Rc<Window>, Rc<Window>>,
}

impl Output {
    fn open(
        event_loop: &ActiveEventLoop,
        (width, height): (u32, u32),
    ) -> Result<Self, BackendError> {
        let attrs = WindowAttributes::default()
            .with_title(WINDOW_TITLE)
            .with_inner_size(PhysicalSize::new(width, height))
            .with_resizable(false);

        let window = event_loop
            .create_window(attrs)
            .map(Rc::new)
            .map_err(|err| BackendError::EventLoop(err.to_string()))?;
        let context = Context::new(Rc::clone(&window)).map_err(surface_error)?;
        let surface =
            Surface::new(&context, Rc::clone(&window)).map_err(surface_error)?;

        Ok(Self { window, surface })
    }

    /// Copies `pixels` to the top-left of the window, clipped to its size.
    fn present(&mut self, pixels: &PixelBuffer) -> Result<(), BackendError> {
        let size = self.window.inner_size();
        let (Some(width), Some(height)) =
            (NonZeroU32::new(size.width), NonZeroU32::new(size.height))
        else {
            // minimized
            return Ok(());
        };

        self.surface.resize(width, height).map_err(surface_error)?;
        let mut target = self.surface.buffer_mut().map_err(surface_error)?;
        blit(pixels, &mut target, size.width);
        target.present().map_err(surface_error)
    }
}

/// Copies `pixels` into a `target_width` wide frame, clipping the overlap
/// and clearing the rest.
fn blit(pixels: &PixelBuffer, target: &mut [u32], target_width: u32) {
    let columns = pixels.width().min(target_width) as usize;
    for (y, line) in target.chunks_exact_mut(target_width as usize).enumerate()
    {
        let y = y as u32;
        if y >= pixels.height() {
            line.fill(0);
            continue;
        }
        line[..columns].copy_from_slice(&pixels.row(y)[..columns]);
        line[columns..].fill(0);
    }
}

fn surface_error(err: softbuffer::SoftBufferError) -> BackendError {
    BackendError::EventLoop(format!("window surface: {}", err))
}

struct WindowApp<'a, 't> {
    toolkit: &'a mut (dyn Toolkit + 't),
    buffer: PixelBuffer,
    frame_limit: Option<u64>,
    shutdown: ShutdownSignal,
    pacer: RefreshPacer,
    output: Option<Output>,
    failure: Option<BackendError>,
}

impl WindowApp<'_, '_> {
    fn should_stop(&self) -> bool {
        self.shutdown.is_requested()
            || self.pacer.limit_reached(self.frame_limit)
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: BackendError) {
        error!("window backend failed: {}", err);
        self.failure = Some(err);
        event_loop.exit();
    }

    fn redraw(&mut self) -> Result<(), BackendError> {
        let Some(output) = self.output.as_mut() else {
            return Ok(());
        };
        self.toolkit.render(&mut self.buffer);
        output.present(&self.buffer)
    }
}

impl ApplicationHandler for WindowApp<'_, '_> {
    // Winit lifecycle hook: the window can only be created once resumed.
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.output.is_some() {
            return;
        }

        let size = (self.buffer.width(), self.buffer.height());
        match Output::open(event_loop, size) {
            Ok(output) => self.output = Some(output),
            Err(err) => self.fail(event_loop, err),
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        if self.output.as_ref().map(|o| o.window.id()) != Some(window_id) {
            return;
        }

        match event {
            WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                event_loop.exit();
            }
            WindowEvent::RedrawRequested => {
                if let Err(err) = self.redraw() {
                    self.fail(event_loop, err);
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.toolkit.feed_input(InputEvent::PointerMoved {
                    x: position.x,
                    y: position.y,
                });
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                self.toolkit.feed_input(InputEvent::PointerButton {
                    pressed: state == ElementState::Pressed,
                });
            }
            WindowEvent::KeyboardInput { event, .. } if !event.repeat => {
                self.toolkit.feed_input(InputEvent::Key {
                    name: format!("{:?}", event.physical_key),
                    pressed: event.state == ElementState::Pressed,
                });
            }
            _ => {}
        }
    }

    // Tick hook: one timer pass per wake-up, redraw at the refresh rate.
    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.should_stop() {
            event_loop.exit();
            return;
        }

        let idle = self.toolkit.handle_timers().max(MIN_IDLE);
        let now = Instant::now();

        if self.pacer.frame_due(now) {
            if let Some(output) = self.output.as_ref() {
                output.window.request_redraw();
            }
        }

        let wake = self.pacer.wake_at(now, idle);
        event_loop.set_control_flow(ControlFlow::WaitUntil(wake));
    }
}
