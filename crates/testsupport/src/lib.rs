pub mod fixtures;
pub mod http_client;
pub mod metrics;
pub mod stub;

pub use fixtures::*;
pub use http_client::*;
pub use metrics::*;
pub use stub::*;
