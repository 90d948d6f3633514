pub mod config;
pub mod error;
pub mod job;
pub mod media;

pub use config::*;
pub use error::*;
pub use job::*;
pub use media::*;
