//! deplint-lib: deployment artifact validation
//!
//! This crate checks a deployment tree for structural and security problems:
//! - [`compose`]: compose manifests, include merging and manifest checks
//! - [`secrets`]: secret file hygiene and inline secrets
//! - [`service_config`]: bind, admin, database and telemetry policy for config files
//! - [`ports`]: host port ranges per deployment level
//! - [`deployment`]: levels, discovery and required contents
//! - [`mirror`]: deployments-to-configs directory mirror
//! - [`audit`]: every check over a whole tree
//!
//! Checks never fail with a Rust error for policy violations; they return a
//! [`ValidationResult`] whose `valid` flag and message lists carry the verdict.

pub mod audit;
pub mod compose;
pub mod consts;
pub mod deployment;
pub mod mirror;
pub mod policy;
pub mod ports;
pub mod report;
pub mod result;
pub mod secrets;
pub mod service_config;
pub mod util;

pub use policy::Policy;
pub use result::ValidationResult;
