//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod http_admin_client;
mod in_memory_admin_backend;

pub use http_admin_client::HttpAdminClient;
pub use in_memory_admin_backend::{InMemoryAdminBackend, InMemoryAdminSession};
