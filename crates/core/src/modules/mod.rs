pub mod catalog;
pub mod definition;

pub use catalog::ModuleCatalog;
pub use definition::{Module, ModuleMetadata, ModuleType};
