use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::BackendError;

/// Set once SIGINT or SIGTERM arrives, or when [`Self::request`] is called.
#[derive(Clone, Debug, Default)]
pub struct ShutdownSignal {
    flag: Arc<AtomicBool>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a signal wired to SIGINT and SIGTERM. Once installed those
    /// signals no longer terminate the process directly; the run loop
    /// observes the flag and returns.
    pub fn install() -> Result<Self, BackendError> {
        let signal = Self::new();

        #[cfg(unix)]
        for sig in [
            signal_hook::consts::SIGINT,
            signal_hook::consts::SIGTERM,
        ] {
            signal_hook::flag::register(sig, Arc::clone(&signal.flag))
                .map_err(|err| {
                    BackendError::io("cannot install signal handler", err)
                })?;
        }

        Ok(signal)
    }

    pub fn request(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_requested(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    #[test]
    fn request_is_shared_between_clones() {
        let signal = ShutdownSignal::new();
        let observer = signal.clone();
        assert!(!observer.is_requested());

        signal.request();
        assert!(observer.is_requested());
    }

    #[cfg(unix)]
    #[test]
    #[serial]
    fn sigterm_sets_the_flag() {
        let signal = ShutdownSignal::install().expect("install handlers");
        assert!(!signal.is_requested());

        signal_hook::low_level::raise(signal_hook::consts::SIGTERM)
            .expect("raise SIGTERM");

        assert!(signal.is_requested());
    }
}
