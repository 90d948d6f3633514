pub mod catalog;
pub mod concurrency;
pub mod filename;
pub mod janitor;
pub mod manager;
pub mod sessions;
pub mod url_policy;

pub use catalog::*;
pub use concurrency::*;
pub use filename::*;
pub use janitor::*;
pub use manager::*;
pub use sessions::*;
pub use url_policy::*;
