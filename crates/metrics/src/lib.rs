pub mod logging;
pub mod service;

pub use logging::*;
pub use service::*;
