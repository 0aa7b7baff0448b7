pub mod catalog;
pub mod chains;
pub mod config;
pub mod filter;
pub mod tile;
pub mod web;

pub use catalog::TileCatalog;
pub use chains::ResourceChains;
pub use filter::FilterCriteria;
pub use tile::Tile;
