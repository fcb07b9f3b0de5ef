pub mod indicators;
pub mod trend;
pub mod types;
