pub mod probe;
pub mod server;

pub use media_models::Config;
