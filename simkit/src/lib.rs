pub mod backend;
pub mod bootstrap;
pub mod config;
pub mod core;
pub mod error;
pub mod prelude;
pub mod runtime;
pub mod toolkit;
pub mod version;

pub use bootstrap::{launch, run, run_with};
