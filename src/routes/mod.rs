pub mod api;
mod entry;
pub mod media;

pub use entry::{API_PREFIX, app, router};
