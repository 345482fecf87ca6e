//! Story rows.

pub mod model;

pub use model::StoryRow;
