//! Backend module - Client trait and HTTP implementation

pub mod http_backend;
pub mod traits;

pub use http_backend::HttpKvBackend;
pub use traits::{BackendResponse, KvBackend, StoreEntry};
