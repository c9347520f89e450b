pub mod disabled;
pub mod forwarded;
mod registry;

pub use disabled::DisabledAuthProvider;
pub use forwarded::ForwardedHeaderProvider;
pub use registry::{AuthMode, AuthProvider, AuthProviders};
