//! BMC Task CRD Definitions
//!
//! Kubernetes Custom Resource Definition for a single baseboard management
//! operation (power control or one-time boot device change) and the
//! conditions a reconciler records while performing it.

pub mod action;
pub mod condition;
pub mod connection;
pub mod task;

pub use action::*;
pub use condition::*;
pub use connection::*;
pub use task::*;
