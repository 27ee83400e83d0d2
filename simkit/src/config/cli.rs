use std::ffi::OsString;

use clap::{CommandFactory, Parser};

use super::settings::{
    ENV_WINDOW_HEIGHT, ENV_WINDOW_WIDTH, MAX_WINDOW_DIMENSION, Settings,
    parse_dimension,
};
use crate::backend::registry::BackendRegistry;
use crate::error::ConfigError;
use crate::version;

const USAGE: &str = "simulator [-V] [-B] [-b backend_name] [-W window_width] \
                     [-H window_height]";

/// Single-dash, getopt-style flags. The built-in `--help`/`--version`
/// handling is disabled so `-h`, `-V` and `-B` can be answered by
/// [`configure`].
#[derive(Debug, Parser)]
#[command(
    name = "simulator",
    about = "Display simulator",
    override_usage = USAGE,
    disable_help_flag = true,
    disable_version_flag = true,
    args_override_self = true
)]
pub struct Args {
    /// Select a display backend by name (see -B)
    #[arg(short = 'b', value_name = "backend_name")]
    pub backend: Option<String>,

    /// Window width in pixels
    #[arg(short = 'W', value_name = "window_width", value_parser = dimension_arg)]
    pub width: Option<u32>,

    /// Window height in pixels
    #[arg(short = 'H', value_name = "window_height", value_parser = dimension_arg)]
    pub height: Option<u32>,

    /// List supported backends
    #[arg(short = 'B')]
    pub list_backends: bool,

    /// Print version
    #[arg(short = 'V')]
    pub version: bool,

    /// Print usage
    #[arg(short = 'h')]
    pub help: bool,
}

/// What the process should do after parsing.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Startup {
    Run(Settings),
    Help(String),
    Version(String),
    ListBackends(Vec<&'static str>),
}

/// Parses `args` (including the program name) against environment values
/// provided by `lookup`.
///
/// `-h`, `-V` and `-B` are answered before the environment is read or the
/// `-b` name is validated, in that order of precedence.
pub fn configure<I, T, F>(
    args: I,
    lookup: F,
    registry: &BackendRegistry,
) -> Result<Startup, ConfigError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
    F: Fn(&str) -> Option<String>,
{
    let args = Args::try_parse_from(args).map_err(|err| ConfigError::Usage {
        message: err.render().to_string().trim_end().to_string(),
    })?;

    if args.help {
        return Ok(Startup::Help(usage()));
    }
    if args.version {
        return Ok(Startup::Version(version::version_string()));
    }
    if args.list_backends {
        return Ok(Startup::ListBackends(registry.list_supported()));
    }

    // a flag hides the matching variable, even a malformed one
    let shadowed = |key: &str| match key {
        ENV_WINDOW_WIDTH => args.width.is_some(),
        ENV_WINDOW_HEIGHT => args.height.is_some(),
        _ => false,
    };
    let mut settings = Settings::from_env(|key: &str| {
        if shadowed(key) {
            None
        } else {
            lookup(key)
        }
    })?;

    if let Some(name) = args.backend {
        if !registry.is_supported(&name) {
            return Err(ConfigError::UnknownBackend(name));
        }
        settings.selected_backend = Some(name);
    }
    if let Some(width) = args.width {
        settings.window_width = width;
    }
    if let Some(height) = args.height {
        settings.window_height = height;
    }

    Ok(Startup::Run(settings))
}

/// Usage text printed for `-h` and after configuration errors.
pub fn usage() -> String {
    Args::command().render_help().to_string()
}

fn dimension_arg(value: &str) -> Result<u32, String> {
    parse_dimension("window dimension", value).map_err(|_| {
        format!("expected an integer between 1 and {}", MAX_WINDOW_DIMENSION)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::registry::tests::fake_registry;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn run(args: &[&str]) -> Result<Startup, ConfigError> {
        let registry = fake_registry();
        let argv = std::iter::once("simulator").chain(args.iter().copied());
        configure(argv, no_env, &registry)
    }

    fn settings(args: &[&str]) -> Settings {
        match run(args).expect("configure") {
            Startup::Run(settings) => settings,
            other => panic!("expected Run, got {:?}", other),
        }
    }

    #[test]
    fn no_flags_yields_defaults() {
        assert_eq!(settings(&[]), Settings::default());
    }

    #[test]
    fn flags_set_window_and_backend() {
        let settings = settings(&["-b", "screen", "-W", "320", "-H240"]);
        assert_eq!(settings.selected_backend.as_deref(), Some("screen"));
        assert_eq!(settings.window_size(), (320, 240));
    }

    #[test]
    fn last_repeated_flag_wins() {
        assert_eq!(settings(&["-W", "100", "-W", "200"]).window_width, 200);
    }

    #[test]
    fn unknown_backend_is_a_config_error() {
        let err = run(&["-b", "Screen"]).expect_err("names are case-sensitive");
        assert!(matches!(err, ConfigError::UnknownBackend(ref n) if n == "Screen"));
    }

    #[test]
    fn unknown_flag_is_a_usage_error() {
        assert!(matches!(run(&["-x"]), Err(ConfigError::Usage { .. })));
    }

    #[test]
    fn missing_argument_is_a_usage_error() {
        assert!(matches!(run(&["-b"]), Err(ConfigError::Usage { .. })));
        assert!(matches!(run(&["-W"]), Err(ConfigError::Usage { .. })));
    }

    #[test]
    fn invalid_dimension_is_a_usage_error() {
        let err = run(&["-H", "0"]).expect_err("zero height");
        assert!(err.to_string().contains("between 1 and 16384"));
    }

    #[test]
    fn flags_dominate_environment() {
        let registry = fake_registry();
        let lookup = |key: &str| match key {
            ENV_WINDOW_WIDTH => Some("1024".to_string()),
            ENV_WINDOW_HEIGHT => Some("not-a-number".to_string()),
            _ => None,
        };

        let startup =
            configure(["simulator", "-H", "272"], lookup, &registry).unwrap();
        let Startup::Run(settings) = startup else {
            panic!("expected Run");
        };
        assert_eq!(settings.window_size(), (1024, 272));
    }

    #[test]
    fn list_backends_in_registration_order() {
        assert_eq!(
            run(&["-B"]).unwrap(),
            Startup::ListBackends(vec!["screen", "spare", "pointer"])
        );
    }

    #[test]
    fn informational_flags_precedence() {
        assert!(matches!(run(&["-B", "-V", "-h"]), Ok(Startup::Help(_))));
        assert!(matches!(run(&["-B", "-V"]), Ok(Startup::Version(_))));
    }

    #[test]
    fn help_lists_every_flag() {
        let text = usage();
        for flag in ["-b", "-W", "-H", "-B", "-V", "-h"] {
            assert!(text.contains(flag), "usage is missing {}", flag);
        }
    }
}
