//! Process entry: configuration, back-end bring-up, screen, run loop.
//!
//! This is the only module that decides the exit status. Everything below
//! it reports failures as values.

use std::ffi::OsString;
use std::process::ExitCode;

use log::{debug, info};

use crate::backend::lifecycle::LifecycleController;
use crate::backend::registry::{self, BackendRegistry};
use crate::config::{Settings, Startup, configure, usage};
use crate::core::logging::init_logger;
use crate::error::{ConfigError, SimError};
use crate::toolkit::Toolkit;

/// Runs the simulator with the process arguments and environment.
pub fn run(toolkit: &mut dyn Toolkit) -> ExitCode {
    run_with(std::env::args_os(), |key| std::env::var(key).ok(), toolkit)
}

pub fn run_with<I, T, F>(
    args: I,
    lookup: F,
    toolkit: &mut dyn Toolkit,
) -> ExitCode
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
    F: Fn(&str) -> Option<String>,
{
    init_logger();

    let registry = match registry::register_all() {
        Ok(registry) => registry,
        Err(err) => return fail(&err.into()),
    };

    let settings = match configure(args, lookup, &registry) {
        Ok(Startup::Run(settings)) => settings,
        Ok(Startup::Help(text)) => {
            print!("{}", text);
            return ExitCode::SUCCESS;
        }
        Ok(Startup::Version(version)) => {
            println!("{}", version);
            return ExitCode::SUCCESS;
        }
        Ok(Startup::ListBackends(names)) => {
            for name in names {
                println!("{}", name);
            }
            return ExitCode::SUCCESS;
        }
        Err(err) => return fail(&err.into()),
    };

    match launch(&settings, &registry, toolkit) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => fail(&err),
    }
}

/// Brings up the toolkit and back-ends in order, builds the screen and
/// blocks in the display back-end's run loop.
///
/// Every registered input back-end is initialized after the display
/// back-end succeeded. Any failure stops the sequence.
pub fn launch(
    settings: &Settings,
    registry: &BackendRegistry,
    toolkit: &mut dyn Toolkit,
) -> Result<(), SimError> {
    debug!("starting with {:?}", settings);
    toolkit.init(settings);

    let mut controller = LifecycleController::new(registry)
        .init_backend(settings.selected_backend.as_deref(), settings)?;

    for input in registry.input_backends() {
        controller = controller.init_aux_backend(input.name, settings)?;
    }

    let surface = controller.surface().clone();
    info!(
        "building screen on '{}' ({}x{})",
        surface.backend, surface.width, surface.height
    );
    toolkit.build_screen(&surface);

    controller.run_loop(toolkit)
}

fn fail(err: &SimError) -> ExitCode {
    match err {
        SimError::Config(ConfigError::Usage { message }) => {
            eprintln!("{}", message);
        }
        SimError::Config(err) => {
            eprintln!("error: {}\n", err);
            eprint!("{}", usage());
        }
        err => eprintln!("fatal: {}", err),
    }
    ExitCode::FAILURE
}
