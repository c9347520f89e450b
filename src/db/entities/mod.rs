#[allow(unused_imports)]
pub mod prelude {
    pub use super::container::Entity as Container;
    pub use super::doll::Entity as Doll;
    pub use super::event::Entity as Event;
    pub use super::photo::Entity as Photo;
}

pub mod container;
pub mod doll;
pub mod event;
pub mod photo;
