//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request path
//!     → router.rs (route lookup)
//!     → matcher.rs (evaluate path conditions)
//!     → Return: ResolvedRoute or ResolveError::NotFound
//!
//! Route Compilation (at startup):
//!     RouteConfig[]
//!     → Compile path matchers
//!     → Freeze as immutable RouteTable
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - Deterministic: same input always matches same route
//! - First match wins (declaration order)

pub mod matcher;
pub mod router;

pub use matcher::{GlobError, GlobMatcher, PathMatcher};
pub use router::{ResolveError, ResolvedRoute, RouteTable, UrlResolver};
