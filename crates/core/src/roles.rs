//! Account roles.
//!
//! The stored role names must match the `chk_users_role` constraint in
//! `20260301000001_create_users.sql`.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

pub const ROLE_JOB_SEEKER: &str = "job_seeker";
pub const ROLE_EMPLOYER: &str = "employer";

/// The two kinds of account on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[serde(alias = "job-seeker", alias = "job-hunter", alias = "job_hunter")]
    JobSeeker,
    #[serde(alias = "head-hunter", alias = "head_hunter")]
    Employer,
}

impl Role {
    /// Parse a role name. Accepts the stored names plus the legacy
    /// "job-hunter" / "head-hunter" spellings.
    pub fn from_str_db(s: &str) -> Result<Self, CoreError> {
        match s {
            ROLE_JOB_SEEKER | "job-seeker" | "job-hunter" | "job_hunter" => Ok(Self::JobSeeker),
            ROLE_EMPLOYER | "head-hunter" | "head_hunter" => Ok(Self::Employer),
            _ => Err(CoreError::Validation(format!(
                "Invalid role '{s}'. Must be one of: {ROLE_JOB_SEEKER}, {ROLE_EMPLOYER}"
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::JobSeeker => ROLE_JOB_SEEKER,
            Self::Employer => ROLE_EMPLOYER,
        }
    }
}
