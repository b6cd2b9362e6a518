mod services;
mod validated;

pub use services::Services;
pub use validated::{ValidJson, ValidPatch, ValidPath, ValidQuery};
