//! Domain rules for Head Huntd.
//!
//! Everything in this crate is storage- and transport-agnostic: the job
//! creation wizard and publish gate ([`job_draft`]), the per-step payloads
//! ([`job_steps`]), role-conditional profile onboarding ([`onboarding`]) and
//! checkout-session polling ([`checkout`]).

pub mod checkout;
pub mod error;
pub mod job_draft;
pub mod job_steps;
pub mod onboarding;
pub mod pagination;
pub mod roles;
pub mod types;
pub mod validation;
