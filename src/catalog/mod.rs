mod album;
mod catalog;
mod load;
mod track;

pub use album::Album;
pub use catalog::{Catalog, CatalogBuildResult, Problem as LoadCatalogProblem};
pub use load::load_catalog;
pub use track::Track;
