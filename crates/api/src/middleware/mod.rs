//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`] -- the authenticated actor (Bearer token or cookie).
//! - [`rbac::RequireEmployer`] -- requires the `employer` role.

pub mod auth;
pub mod rbac;
