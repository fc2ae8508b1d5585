pub mod backup;
pub mod commands;
pub mod config;
pub mod error;

pub use backup::*;
pub use commands::*;
pub use config::*;
pub use error::*;
