pub mod handler;

pub use handler::{RsiZone, TechnicalAnalysis, TechnicalReport, TrendReport};
