pub mod format;
pub mod payload;

pub use format::{BreedView, KittenBreed, KittenView, RatingView, RegisteredUser};
