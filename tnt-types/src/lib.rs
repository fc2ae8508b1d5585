pub mod error;
pub mod field;
pub mod section;

pub use error::*;
pub use field::*;
pub use section::*;
