pub mod http_executor;
pub mod query_cache;

pub use http_executor::HttpExecutor;
pub use query_cache::{EntityTag, QueryCache};
