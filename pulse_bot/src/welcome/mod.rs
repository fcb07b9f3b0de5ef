pub mod handler;
pub mod helpers;
