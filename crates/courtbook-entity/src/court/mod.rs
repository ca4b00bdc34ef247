//! Court domain entities.

pub mod kind;
pub mod model;

pub use kind::{CourtType, Sport};
pub use model::Court;
