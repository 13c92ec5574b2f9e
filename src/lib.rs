pub mod config;
pub mod error;
pub mod model;
pub mod notion;
pub mod reddit;
pub mod sync;
