pub mod forwarder;
pub mod target;

pub use forwarder::AuthenticatedForwarder;
pub use target::{UpstreamEndpoints, UpstreamTarget};
