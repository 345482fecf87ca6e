//! Audio post rows.

pub mod model;

pub use model::PostRow;
