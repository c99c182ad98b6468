pub mod casts;
pub mod methods;
pub mod pipeline;
pub mod rules;

pub use crate::domain::model::RequestMap;
pub use crate::domain::ports::FieldStore;
pub use crate::utils::error::Result;
