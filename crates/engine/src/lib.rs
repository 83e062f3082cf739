pub mod pacer;
pub mod scanner;
pub mod upstox;

pub use pacer::SubmitPacer;
pub use scanner::{ScanSettings, Scanner};
pub use upstox::{InstrumentMaster, UpstoxClient};
