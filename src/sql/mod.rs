//! Safe SQL builder: identifiers from config only, values as parameters.

mod builder;
mod filter;
pub mod params;
mod sort;

pub use builder::*;
pub use filter::Filter;
pub use params::*;
pub use sort::{translate, Direction, OrderBy, SortDirective};
