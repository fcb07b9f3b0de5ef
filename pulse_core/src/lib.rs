pub mod analysis;
pub mod chart;
pub mod error;
pub mod helpers;
pub mod market;
pub mod ta;
