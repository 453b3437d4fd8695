//! Prelude for common imports used throughout all afcdeck crates

pub use crate::error::{DeviceErrorKind, Error, Result};
pub use tracing::{debug, error, info, instrument, trace, warn};
