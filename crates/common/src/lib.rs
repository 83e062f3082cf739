pub mod config;
pub mod error;
pub mod gateway;
pub mod types;
pub mod universe;

pub use config::{Config, DataSource};
pub use error::{Error, Result};
pub use gateway::PriceDataGateway;
pub use types::*;
pub use universe::{Universe, UniverseFileConfig, UniverseRegistry};
