pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;

pub use crate::config::CastConfig;
pub use crate::core::casts::CastKind;
pub use crate::core::methods::{CastMethod, MethodRegistry};
pub use crate::core::pipeline::{apply_casts, CastReport, FieldCastPipeline};
pub use crate::domain::{model::RequestMap, ports::FieldStore};
pub use crate::utils::error::{CastError, Result};
