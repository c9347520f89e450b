pub mod containers;
pub mod dolls;
pub mod events;
pub mod me;
pub mod photos;
pub mod public;
mod router;

pub use router::router;
