use std::path::PathBuf;

use crate::error::ConfigError;

pub const DEFAULT_WINDOW_WIDTH: u32 = 800;
pub const DEFAULT_WINDOW_HEIGHT: u32 = 480;
pub const MAX_WINDOW_DIMENSION: u32 = 16384;
pub const DEFAULT_FBDEV_DEVICE: &str = "/dev/fb0";

pub const ENV_WINDOW_WIDTH: &str = "LV_SIM_WINDOW_WIDTH";
pub const ENV_WINDOW_HEIGHT: &str = "LV_SIM_WINDOW_HEIGHT";
pub const ENV_FRAME_LIMIT: &str = "LV_SIM_FRAME_LIMIT";
pub const ENV_FBDEV_DEVICE: &str = "LV_LINUX_FBDEV_DEVICE";
pub const ENV_EVDEV_DEVICE: &str = "LV_LINUX_EVDEV_POINTER_DEVICE";

/// Process configuration. Built once by [`crate::config::configure`] and
/// only read afterwards.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Settings {
    pub window_width: u32,
    pub window_height: u32,
    /// Registry name chosen with `-b`. `None` selects the default display
    /// back-end.
    pub selected_backend: Option<String>,
    /// Stop the run loop after this many frames.
    pub frame_limit: Option<u64>,
    pub fbdev_device: PathBuf,
    pub evdev_device: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            window_width: DEFAULT_WINDOW_WIDTH,
            window_height: DEFAULT_WINDOW_HEIGHT,
            selected_backend: None,
            frame_limit: None,
            fbdev_device: PathBuf::from(DEFAULT_FBDEV_DEVICE),
            evdev_device: None,
        }
    }
}

impl Settings {
    /// Defaults with environment overrides applied. `lookup` is usually
    /// `|key| std::env::var(key).ok()`. Empty values count as unset.
    pub fn from_env<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut settings = Self::default();

        if let Some(value) = read(ENV_WINDOW_WIDTH) {
            settings.window_width = parse_dimension(ENV_WINDOW_WIDTH, &value)?;
        }
        if let Some(value) = read(ENV_WINDOW_HEIGHT) {
            settings.window_height =
                parse_dimension(ENV_WINDOW_HEIGHT, &value)?;
        }
        if let Some(value) = read(ENV_FRAME_LIMIT) {
            settings.frame_limit = Some(parse_bounded(
                ENV_FRAME_LIMIT,
                &value,
                1,
                u64::MAX,
            )?);
        }
        if let Some(value) = read(ENV_FBDEV_DEVICE) {
            settings.fbdev_device = PathBuf::from(value);
        }
        settings.evdev_device = read(ENV_EVDEV_DEVICE).map(PathBuf::from);

        Ok(settings)
    }

    pub fn window_size(&self) -> (u32, u32) {
        (self.window_width, self.window_height)
    }
}

/// Window dimensions must be a positive integer no larger than
/// [`MAX_WINDOW_DIMENSION`]. Anything else is a configuration error.
pub fn parse_dimension(
    source_name: &str,
    value: &str,
) -> Result<u32, ConfigError> {
    let parsed =
        parse_bounded(source_name, value, 1, MAX_WINDOW_DIMENSION as u64)?;
    Ok(parsed as u32)
}

fn parse_bounded(
    source_name: &str,
    value: &str,
    min: u64,
    max: u64,
) -> Result<u64, ConfigError> {
    let invalid = || ConfigError::InvalidNumber {
        source_name: source_name.to_string(),
        value: value.to_string(),
        min,
        max,
    };

    let parsed = value.trim().parse::<u64>().map_err(|_| invalid())?;
    if !(min..=max).contains(&parsed) {
        return Err(invalid());
    }

    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_environment() {
        let settings = Settings::from_env(env(&[])).unwrap();
        assert_eq!(settings.window_size(), (800, 480));
        assert_eq!(settings.selected_backend, None);
        assert_eq!(settings.frame_limit, None);
        assert_eq!(settings.fbdev_device, PathBuf::from("/dev/fb0"));
        assert_eq!(settings.evdev_device, None);
    }

    #[test]
    fn environment_overrides_defaults() {
        let settings = Settings::from_env(env(&[
            (ENV_WINDOW_WIDTH, "1024"),
            (ENV_WINDOW_HEIGHT, " 600 "),
            (ENV_FRAME_LIMIT, "12"),
            (ENV_FBDEV_DEVICE, "/dev/fb1"),
            (ENV_EVDEV_DEVICE, "/dev/input/event3"),
        ]))
        .unwrap();

        assert_eq!(settings.window_size(), (1024, 600));
        assert_eq!(settings.frame_limit, Some(12));
        assert_eq!(settings.fbdev_device, PathBuf::from("/dev/fb1"));
        assert_eq!(
            settings.evdev_device,
            Some(PathBuf::from("/dev/input/event3"))
        );
    }

    #[test]
    fn empty_environment_value_is_unset() {
        let settings =
            Settings::from_env(env(&[(ENV_WINDOW_WIDTH, "")])).unwrap();
        assert_eq!(settings.window_width, DEFAULT_WINDOW_WIDTH);
    }

    #[test]
    fn malformed_environment_value_is_rejected() {
        let err = Settings::from_env(env(&[(ENV_WINDOW_HEIGHT, "tall")]))
            .expect_err("non-numeric height must fail");
        assert!(err.to_string().contains(ENV_WINDOW_HEIGHT));
        assert!(err.to_string().contains("'tall'"));
    }

    #[test]
    fn dimension_bounds() {
        assert_eq!(parse_dimension("-W", "1").unwrap(), 1);
        assert_eq!(parse_dimension("-W", "16384").unwrap(), 16384);
        assert!(parse_dimension("-W", "0").is_err());
        assert!(parse_dimension("-W", "-5").is_err());
        assert!(parse_dimension("-W", "16385").is_err());
        assert!(parse_dimension("-W", "12px").is_err());
    }

    #[test]
    fn zero_frame_limit_is_rejected() {
        assert!(Settings::from_env(env(&[(ENV_FRAME_LIMIT, "0")])).is_err());
    }
}
