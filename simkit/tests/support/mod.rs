#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use simkit::prelude::*;

pub type Journal = Arc<Mutex<Vec<String>>>;

pub fn entries(journal: &Journal) -> Vec<String> {
    journal.lock().unwrap().clone()
}

fn record(journal: &Journal, entry: String) {
    journal.lock().unwrap().push(entry);
}

pub struct ScriptedBackend {
    name: &'static str,
    journal: Journal,
    fail_init: bool,
}

impl Backend for ScriptedBackend {
    fn init(&mut self, _settings: &Settings) -> Result<(), BackendError> {
        record(&self.journal, format!("backend:init:{}", self.name));
        if self.fail_init {
            return Err(BackendError::Unavailable("device busy".to_string()));
        }
        Ok(())
    }

    fn run_loop(
        &mut self,
        toolkit: &mut dyn Toolkit,
    ) -> Result<(), BackendError> {
        record(&self.journal, format!("backend:run:{}", self.name));
        toolkit.handle_timers();
        Ok(())
    }
}

/// `lcd` is the default display back-end, `touch` is input-only.
pub fn registry(
    journal: &Journal,
    failing: &[&'static str],
) -> BackendRegistry {
    let mut builder = RegistryBuilder::new();
    for (name, kind) in [
        ("lcd", BackendKind::Display),
        ("monitor", BackendKind::Display),
        ("touch", BackendKind::Input),
    ] {
        let journal = Arc::clone(journal);
        let fail_init = failing.contains(&name);
        builder
            .register(name, kind, move || {
                Box::new(ScriptedBackend {
                    name,
                    journal: Arc::clone(&journal),
                    fail_init,
                })
            })
            .expect("register scripted backend");
    }
    builder.build()
}

pub struct JournalToolkit {
    journal: Journal,
}

impl JournalToolkit {
    pub fn new(journal: &Journal) -> Self {
        Self {
            journal: Arc::clone(journal),
        }
    }
}

impl Toolkit for JournalToolkit {
    fn init(&mut self, _settings: &Settings) {
        record(&self.journal, "toolkit:init".to_string());
    }

    fn build_screen(&mut self, surface: &SurfaceInfo) {
        record(
            &self.journal,
            format!(
                "toolkit:screen:{}:{}x{}",
                surface.backend, surface.width, surface.height
            ),
        );
    }

    fn handle_timers(&mut self) -> Duration {
        record(&self.journal, "toolkit:timers".to_string());
        Duration::from_millis(5)
    }
}

pub fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let pairs: Vec<(String, String)> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| {
        pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    }
}
