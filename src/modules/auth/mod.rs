//! Registration, login and role assignment.
//!
//! - `controller.rs`: HTTP handlers
//! - `router.rs`: Axum router configuration
//! - `service.rs`: Business logic, including the shared token issuance step

pub mod controller;
pub mod router;
pub mod service;
