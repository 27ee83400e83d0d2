//! Startup configuration: built-in defaults, environment overrides and
//! command line flags, in increasing priority.

pub mod cli;
pub mod settings;

pub use cli::{Args, Startup, configure, usage};
pub use settings::Settings;
