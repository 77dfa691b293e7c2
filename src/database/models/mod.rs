pub mod breed;
pub mod kitten;
pub mod rating;
pub mod user;

pub use breed::Breed;
pub use kitten::{Kitten, KittenChanges, KittenDetail, NewKitten};
pub use rating::{NewRating, RatingDetail};
pub use user::{NewUser, User};
