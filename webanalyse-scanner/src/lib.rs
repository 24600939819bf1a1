pub mod analyser;
pub mod classifier;
pub mod error;
pub mod links;
pub mod pool;
pub mod prober;
pub mod result;
pub mod structure;

pub use analyser::{Analyser, AnalyserConfig};
pub use classifier::{LinkClass, classify};
pub use error::ScanError;
pub use links::{LinkCounters, LinkScan, aggregate};
pub use result::PageSummary;
