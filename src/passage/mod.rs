pub mod catalog;
pub mod markup;

pub use catalog::{CatalogError, Passage, PassageCatalog, PassageId};
pub use markup::AnnotatedChar;
