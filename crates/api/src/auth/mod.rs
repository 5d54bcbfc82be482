//! Authentication primitives.
//!
//! - [`password`] -- Argon2id password hashing and verification.
//! - [`jwt`] -- access tokens and refresh-token hashing.
//! - [`cookies`] -- `Set-Cookie` construction and `Cookie` parsing.

pub mod cookies;
pub mod jwt;
pub mod password;
