//! Pure data structures shared by every component.

pub mod order;
pub mod product;

pub use order::*;
pub use product::*;
