pub mod answers;
pub mod handler;

pub use handler::start;
