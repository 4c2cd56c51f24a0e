//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → security::access_control (exempt? subscribed?)
//!     → response.rs (redirects) or the view handler
//!     → Send to client
//! ```

pub mod response;
pub mod server;

pub use server::HttpServer;
