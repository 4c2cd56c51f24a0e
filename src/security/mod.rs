//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → exemptions.rs (debug toolbar, route rules, path globs)
//!     → access_control.rs (subscriber lookup, subscription status)
//!     → Pass to view, or redirect
//! ```
//!
//! # Design Decisions
//! - Exemption rules are fixed at startup
//! - Resolution failures are not swallowed
//! - Only "not configured" billing failures are recovered

pub mod access_control;
pub mod exemptions;

pub use access_control::{AccessControlState, GateDecision, GateSetupError, SubscriptionGate};
pub use exemptions::{ExemptionList, ExemptionPolicy};
