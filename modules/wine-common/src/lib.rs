pub mod config;
pub mod error;
pub mod types;

pub use config::{RegionCleanup, SeedConfig};
pub use error::SeedError;
pub use types::*;
