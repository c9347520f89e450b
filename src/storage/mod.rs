pub mod photos;

pub use photos::{PhotoStorage, is_valid_image};
