pub mod campaign;
pub mod common;
pub mod donation;
pub mod pagination;
pub mod stats;

pub use campaign::*;
pub use common::*;
pub use donation::*;
pub use pagination::*;
pub use stats::*;
