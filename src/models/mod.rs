pub mod account;
pub mod holding;
pub mod portfolio;

pub use account::*;
pub use holding::*;
pub use portfolio::*;
