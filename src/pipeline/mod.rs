//! Pipeline module - load, profile, aggregate, segment, classify

pub mod age;
pub mod aggregate;
pub mod classify;
pub mod error;
pub mod loader;
pub mod profile;
pub mod record;
pub mod segment;

pub use age::*;
pub use aggregate::*;
pub use classify::*;
pub use error::*;
pub use loader::*;
pub use profile::*;
pub use record::*;
pub use segment::*;
