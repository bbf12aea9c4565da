//! Enumerable fake-data capabilities backed by the `fake` crate.

mod catalog;
mod land;
mod locales;

pub use catalog::{BINARY_LENGTH, Capability, FakerCatalog};
pub(crate) use catalog::random_bytes;
pub use land::{LAND_LOCATIONS, LandLocation};
pub use locales::LocaleKey;
