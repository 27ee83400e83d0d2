//! Error taxonomy for startup.
//!
//! Every startup failure is fatal. Library code only returns these values;
//! [`crate::bootstrap::run_with`] is the single place that turns them into
//! a process exit status.

use std::io;
use std::path::Path;

use thiserror::Error;

use crate::backend::BackendKind;

/// Bad command line or environment. Detected before any back-end is touched.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Unknown flag, missing flag argument or malformed flag value. The
    /// message is clap's rendering without the trailing usage block.
    #[error("{message}")]
    Usage { message: String },

    #[error("no such backend: {0}")]
    UnknownBackend(String),

    #[error(
        "invalid value '{value}' for {source_name}: expected an integer \
         between {min} and {max}"
    )]
    InvalidNumber {
        source_name: String,
        value: String,
        min: u64,
        max: u64,
    },
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("duplicate backend registration: {0}")]
    Duplicate(&'static str),

    #[error("backend names must not be empty")]
    EmptyName,
}

/// A back-end could not be brought up.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    #[error("{0}")]
    Unavailable(String),

    #[error("unsupported {what}: {detail}")]
    Unsupported { what: &'static str, detail: String },

    #[error("event loop failure: {0}")]
    EventLoop(String),

    #[error("input back-ends have no run loop")]
    NotRunnable,

    #[error("back-end was not initialized")]
    NotInitialized,
}

impl BackendError {
    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    pub fn device(path: &Path, source: io::Error) -> Self {
        Self::io(format!("cannot open {}", path.display()), source)
    }
}

/// Selection or initialization of a back-end failed.
#[derive(Debug, Error)]
pub enum InitError {
    #[error("no display backend is registered")]
    NoDefaultBackend,

    /// The name passed parse-time validation but is missing from the
    /// registry handed to the controller.
    #[error("backend '{0}' is not registered")]
    Unregistered(String),

    #[error("backend '{name}' is a {actual} backend, expected {expected}")]
    WrongKind {
        name: String,
        expected: BackendKind,
        actual: BackendKind,
    },

    #[error("failed to initialize display backend '{name}': {source}")]
    Primary {
        name: String,
        #[source]
        source: BackendError,
    },

    #[error("failed to initialize input backend '{name}': {source}")]
    Auxiliary {
        name: String,
        #[source]
        source: BackendError,
    },
}

#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Init(#[from] InitError),

    #[error("backend '{name}' stopped with an error: {source}")]
    Run {
        name: String,
        #[source]
        source: BackendError,
    },
}
