pub mod instruments;
pub mod rest;

pub use instruments::InstrumentMaster;
pub use rest::UpstoxClient;
