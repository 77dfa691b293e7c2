pub mod pagination;
pub mod search;

pub use pagination::{Page, PageRequest, PageWindow};
pub use search::{search_terms, KittenFilter};
