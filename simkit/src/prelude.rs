pub use crate::backend::lifecycle::{LifecycleController, Phase};
pub use crate::backend::registry::{
    BackendDescriptor, BackendRegistry, RegistryBuilder, register_all,
};
pub use crate::backend::{Backend, BackendKind};
pub use crate::bootstrap::{launch, run, run_with};
pub use crate::config::{Settings, Startup, configure};
pub use crate::core::logging::init_logger;
pub use crate::core::logging::{debug, error, info, trace, warn};
pub use crate::error::{
    BackendError, ConfigError, InitError, RegistryError, SimError,
};
pub use crate::register_backends;
pub use crate::toolkit::{InputEvent, PixelBuffer, SurfaceInfo, Toolkit};
pub use crate::version::version_string;
