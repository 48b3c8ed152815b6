//! Loopback receiver for the provider's redirect.
//!
//! The server answers exactly one redirect: a request carrying `code`, or one
//! carrying `error`. Requests to any other path get a 404 and leave the wait
//! untouched. Shutdown is guaranteed once a redirect is handled, the
//! configured timeout expires or the caller cancels.

mod config;
mod http;
mod pages;
mod server;

pub use config::LocalServerConfig;
pub use server::LocalServer;
