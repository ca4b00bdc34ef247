//! Coach domain entities.

pub mod model;

pub use model::Coach;
