//! Selection and bring-up of back-ends.
//!
//! The controller is a typestate: a [`LifecycleController`] can only be
//! created from a finished [`BackendRegistry`], auxiliary back-ends can
//! only be attached once the primary display back-end is up, and the run
//! loop consumes the controller.
//!
//! ```text
//! Registered --init_backend--> PrimaryReady --init_aux_backend--> AuxReady
//!                                    |                               |
//!                                    +-------------run_loop----------+
//! ```
//!
//! Out-of-order calls do not compile. A registry that is still being
//! filled cannot be searched:
//!
//! ```compile_fail
//! use simkit::prelude::*;
//!
//! let builder = RegistryBuilder::new();
//! builder.find("headless");
//! ```
//!
//! and an input back-end cannot be attached before the display back-end:
//!
//! ```compile_fail
//! use simkit::prelude::*;
//!
//! let registry = register_all().unwrap();
//! LifecycleController::new(&registry)
//!     .init_aux_backend("evdev", &Settings::default());
//! ```

use std::time::Duration;

use log::{error, info};

use super::registry::{BackendDescriptor, BackendRegistry};
use super::{Backend, BackendKind};
use crate::config::Settings;
use crate::error::{InitError, SimError};
use crate::toolkit::{InputEvent, PixelBuffer, SurfaceInfo, Toolkit};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Phase {
    Registered,
    PrimaryReady,
    AuxReady,
}

pub struct Registered;

pub struct PrimaryReady {
    primary: ActiveBackend,
    aux: Vec<ActiveBackend>,
    surface: SurfaceInfo,
}

struct ActiveBackend {
    name: &'static str,
    backend: Box<dyn Backend>,
}

pub struct LifecycleController<'r, S> {
    registry: &'r BackendRegistry,
    state: S,
}

impl<'r, S> LifecycleController<'r, S> {
    fn resolve(
        &self,
        name: &str,
        expected: BackendKind,
    ) -> Result<&'r BackendDescriptor, InitError> {
        let Some(descriptor) = self.registry.find(name) else {
            // names are validated while parsing, so this is a wiring bug
            error!("backend '{}' reached init without being registered", name);
            return Err(InitError::Unregistered(name.to_string()));
        };

        if descriptor.kind != expected {
            return Err(InitError::WrongKind {
                name: name.to_string(),
                expected,
                actual: descriptor.kind,
            });
        }

        Ok(descriptor)
    }
}

impl<'r> LifecycleController<'r, Registered> {
    pub fn new(registry: &'r BackendRegistry) -> Self {
        Self {
            registry,
            state: Registered,
        }
    }

    pub fn phase(&self) -> Phase {
        Phase::Registered
    }

    /// Initializes the display back-end named `name`, or the registry's
    /// default display back-end when `name` is absent or empty.
    pub fn init_backend(
        self,
        name: Option<&str>,
        settings: &Settings,
    ) -> Result<LifecycleController<'r, PrimaryReady>, InitError> {
        let descriptor = match name.filter(|n| !n.is_empty()) {
            Some(name) => self.resolve(name, BackendKind::Display)?,
            None => {
                let descriptor = self
                    .registry
                    .default_display()
                    .ok_or(InitError::NoDefaultBackend)?;
                info!("no backend selected, using '{}'", descriptor.name);
                descriptor
            }
        };

        let mut backend = descriptor.create();
        backend.init(settings).map_err(|source| InitError::Primary {
            name: descriptor.name.to_string(),
            source,
        })?;

        let (width, height) =
            backend.resolution().unwrap_or(settings.window_size());
        info!(
            "display backend '{}' ready ({}x{})",
            descriptor.name, width, height
        );

        Ok(LifecycleController {
            registry: self.registry,
            state: PrimaryReady {
                primary: ActiveBackend {
                    name: descriptor.name,
                    backend,
                },
                aux: Vec::new(),
                surface: SurfaceInfo {
                    backend: descriptor.name,
                    width,
                    height,
                },
            },
        })
    }
}

impl<'r> LifecycleController<'r, PrimaryReady> {
    pub fn phase(&self) -> Phase {
        if self.state.aux.is_empty() {
            Phase::PrimaryReady
        } else {
            Phase::AuxReady
        }
    }

    pub fn active_backend(&self) -> &'static str {
        self.state.primary.name
    }

    pub fn aux_backends(&self) -> Vec<&'static str> {
        self.state.aux.iter().map(|a| a.name).collect()
    }

    pub fn surface(&self) -> &SurfaceInfo {
        &self.state.surface
    }

    /// Initializes an input-only back-end next to the display back-end.
    pub fn init_aux_backend(
        mut self,
        name: &str,
        settings: &Settings,
    ) -> Result<Self, InitError> {
        let descriptor = self.resolve(name, BackendKind::Input)?;

        let mut backend = descriptor.create();
        backend.init(settings).map_err(|source| InitError::Auxiliary {
            name: descriptor.name.to_string(),
            source,
        })?;
        info!("input backend '{}' ready", descriptor.name);

        self.state.aux.push(ActiveBackend {
            name: descriptor.name,
            backend,
        });

        Ok(self)
    }

    /// Hands the process over to the display back-end. Returns when the
    /// back-end's loop ends (window closed, signal, frame limit).
    pub fn run_loop(self, toolkit: &mut dyn Toolkit) -> Result<(), SimError> {
        let PrimaryReady {
            mut primary,
            mut aux,
            ..
        } = self.state;

        info!("entering run loop of '{}'", primary.name);

        let result = if aux.is_empty() {
            primary.backend.run_loop(toolkit)
        } else {
            let mut pump = InputPump {
                toolkit,
                sources: &mut aux,
            };
            primary.backend.run_loop(&mut pump)
        };

        result.map_err(|source| SimError::Run {
            name: primary.name.to_string(),
            source,
        })?;

        info!("run loop of '{}' finished", primary.name);
        Ok(())
    }
}

/// Feeds auxiliary input into the toolkit ahead of every timer pass.
struct InputPump<'a, 't> {
    toolkit: &'a mut (dyn Toolkit + 't),
    sources: &'a mut [ActiveBackend],
}

impl Toolkit for InputPump<'_, '_> {
    fn init(&mut self, settings: &Settings) {
        self.toolkit.init(settings);
    }

    fn build_screen(&mut self, surface: &SurfaceInfo) {
        self.toolkit.build_screen(surface);
    }

    fn handle_timers(&mut self) -> Duration {
        let Self { toolkit, sources } = self;
        for source in sources.iter_mut() {
            source
                .backend
                .poll_input(&mut |event| toolkit.feed_input(event));
        }
        toolkit.handle_timers()
    }

    fn feed_input(&mut self, event: InputEvent) {
        self.toolkit.feed_input(event);
    }

    fn render(&mut self, target: &mut PixelBuffer) -> bool {
        self.toolkit.render(target)
    }
}
