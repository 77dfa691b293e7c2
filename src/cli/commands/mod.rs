pub mod breed;
pub mod kitten;
pub mod migrate;
