use std::collections::HashMap;

use log::debug;

use super::{Backend, BackendKind};
use crate::error::RegistryError;

type BackendFactory = Box<dyn Fn() -> Box<dyn Backend> + Send + Sync + 'static>;

pub struct BackendDescriptor {
    pub name: &'static str,
    pub kind: BackendKind,
    factory: BackendFactory,
}

impl BackendDescriptor {
    /// A fresh, uninitialized instance.
    pub fn create(&self) -> Box<dyn Backend> {
        (self.factory)()
    }
}

/// Collects descriptors. Lookups only exist on the [`BackendRegistry`] it
/// builds, so nothing can be resolved before registration has finished.
#[derive(Default)]
pub struct RegistryBuilder {
    entries: HashMap<&'static str, BackendDescriptor>,
    ordered_names: Vec<&'static str>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(
        &mut self,
        name: &'static str,
        kind: BackendKind,
        factory: F,
    ) -> Result<(), RegistryError>
    where
        F: Fn() -> Box<dyn Backend> + Send + Sync + 'static,
    {
        if name.is_empty() {
            return Err(RegistryError::EmptyName);
        }
        if self.entries.contains_key(name) {
            return Err(RegistryError::Duplicate(name));
        }

        debug!("registered {} backend '{}'", kind, name);
        self.ordered_names.push(name);
        self.entries.insert(
            name,
            BackendDescriptor {
                name,
                kind,
                factory: Box::new(factory),
            },
        );

        Ok(())
    }

    pub fn build(self) -> BackendRegistry {
        BackendRegistry {
            entries: self.entries,
            ordered_names: self.ordered_names,
        }
    }
}

/// The frozen catalog of compiled-in back-ends. Names match exactly and
/// case-sensitively.
pub struct BackendRegistry {
    entries: HashMap<&'static str, BackendDescriptor>,
    ordered_names: Vec<&'static str>,
}

impl BackendRegistry {
    pub fn is_supported(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Names in registration order.
    pub fn list_supported(&self) -> Vec<&'static str> {
        self.ordered_names.clone()
    }

    pub fn find(&self, name: &str) -> Option<&BackendDescriptor> {
        self.entries.get(name)
    }

    /// The first display back-end registered.
    pub fn default_display(&self) -> Option<&BackendDescriptor> {
        self.descriptors().find(|d| d.kind == BackendKind::Display)
    }

    pub fn input_backends(&self) -> impl Iterator<Item = &BackendDescriptor> {
        self.descriptors().filter(|d| d.kind == BackendKind::Input)
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &BackendDescriptor> {
        self.ordered_names
            .iter()
            .filter_map(|name| self.entries.get(name))
    }

    pub fn len(&self) -> usize {
        self.ordered_names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered_names.is_empty()
    }
}

/// Builds the catalog of back-ends compiled into this binary. Display
/// back-ends are listed by preference; the first one is the default.
pub fn register_all() -> Result<BackendRegistry, RegistryError> {
    #[cfg(all(target_os = "linux", feature = "evdev"))]
    use super::evdev;
    #[cfg(target_os = "linux")]
    use super::fbdev;
    use super::headless;
    #[cfg(feature = "winit")]
    use super::windowed;

    crate::register_backends![
        #[cfg(feature = "winit")]
        windowed,
        #[cfg(target_os = "linux")]
        fbdev,
        headless,
        #[cfg(all(target_os = "linux", feature = "evdev"))]
        evdev,
    ]
}

/// Builds a [`BackendRegistry`] from back-end modules. Each module must
/// expose `NAME`, `KIND` and `create()`.
#[macro_export]
macro_rules! register_backends {
    (
        $(
            $(#[$meta:meta])*
            $module:ident
        ),* $(,)?
    ) => {{
        (|| -> Result<
            $crate::backend::registry::BackendRegistry,
            $crate::error::RegistryError,
        > {
            let mut __builder =
                $crate::backend::registry::RegistryBuilder::new();

            $(
                $(#[$meta])*
                __builder.register($module::NAME, $module::KIND, $module::create)?;
            )*

            Ok(__builder.build())
        })()
    }};
}
