//! HTTP transport for the session operations.
//!
//! A thin adapter: every route decodes JSON, calls the session manager or the
//! storage backend and maps the outcome to a status code and JSON body.
//!
//! Components:
//! - `types`: response and fault payloads.
//! - `routes`: request handlers and the warp filter tree.
//! - `web_server`: binds the filter tree to a socket.

pub mod routes;
pub mod types;
pub mod web_server;

pub use routes::{routes, AppState};
pub use web_server::WebServer;
