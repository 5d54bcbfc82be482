//! Payloads for the four job-creation steps.
//!
//! Each step is saved independently and replaces its whole substructure on
//! the draft. [`JobStepPayload::parse`] is the single entry point: it decodes
//! the raw JSON for a named step, normalizes whitespace and duplicates, and
//! runs field validation. A payload that comes out of `parse` is safe to
//! persist as-is.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::error::{CoreError, FieldError};
use crate::job_draft::JobStep;
use crate::validation::{
    check_tags, decode_payload, dedupe_tags, field_errors, into_result, trim_in_place,
    CODE_INVALID, CODE_REQUIRED,
};

/// Maximum length of one qualification tag.
pub const QUALIFICATION_TAG_MAX: usize = 100;

// ---------------------------------------------------------------------------
// Enumerations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EmploymentType {
    FullTime,
    PartTime,
    Casual,
    Contract,
    Temporary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShiftPreference {
    Morning,
    Afternoon,
    Evening,
    Night,
    Flexible,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MinimumExperience {
    #[serde(rename = "no-experience")]
    NoExperience,
    #[serde(rename = "less-than-1-year")]
    LessThanOneYear,
    #[serde(rename = "1-2-years")]
    OneToTwoYears,
    #[serde(rename = "2-5-years")]
    TwoToFiveYears,
    #[serde(rename = "5-plus-years")]
    FivePlusYears,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WorkLocation {
    OnSite,
    Hybrid,
    Remote,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PayPeriod {
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

// ---------------------------------------------------------------------------
// Step substructures
// ---------------------------------------------------------------------------

/// Step 1: what the role is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct JobDetails {
    #[validate(length(min = 1, max = 100))]
    pub title: String,
    pub employment_type: EmploymentType,
    pub shift_preference: ShiftPreference,
    pub requires_work_rights: bool,
    pub minimum_experience: MinimumExperience,
}

/// Step 2: free-text description of the role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct JobSummary {
    #[validate(length(min = 1, max = 5000))]
    pub description: String,
}

/// Step 3: qualification tags. Order is irrelevant; duplicates are removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Qualifications {
    #[validate(length(min = 1, max = 30))]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Address {
    #[validate(length(min = 1, max = 200))]
    pub street: String,
    #[validate(length(min = 1, max = 100))]
    pub suburb: String,
    #[validate(length(min = 1, max = 100))]
    pub state: String,
    #[validate(length(min = 1, max = 10))]
    pub postcode: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Salary {
    #[validate(range(min = 0))]
    pub min: i64,
    #[validate(range(min = 0))]
    pub max: i64,
    #[validate(custom(function = "validate_currency_code"))]
    pub currency: String,
    pub period: PayPeriod,
}

/// Three ASCII letters, e.g. `AUD`. Runs after upper-casing.
fn validate_currency_code(code: &str) -> Result<(), ValidationError> {
    if code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(())
    } else {
        Err(ValidationError::new(CODE_INVALID)
            .with_message("Currency must be a three-letter code such as AUD".into()))
    }
}

/// Step 4: where, how much, how many, and until when.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct PostJob {
    pub work_location: WorkLocation,
    #[validate(nested)]
    #[serde(default)]
    pub address: Option<Address>,
    #[validate(nested)]
    pub salary: Salary,
    #[validate(range(min = 1, max = 1000))]
    pub number_of_positions: i32,
    pub application_deadline: NaiveDate,
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// A validated, normalized payload for one job-creation step.
#[derive(Debug, Clone, PartialEq)]
pub enum JobStepPayload {
    JobDetails(JobDetails),
    JobSummary(JobSummary),
    Qualifications(Qualifications),
    PostJob(PostJob),
}

impl JobStepPayload {
    /// Decode, normalize and validate a raw payload for `step`.
    ///
    /// `today` is the current UTC date, used to reject application deadlines
    /// in the past.
    pub fn parse(
        step: JobStep,
        raw: serde_json::Value,
        today: NaiveDate,
    ) -> Result<Self, CoreError> {
        match step {
            JobStep::JobDetails => {
                let mut details: JobDetails = decode_payload(step.as_str(), raw)?;
                trim_in_place(&mut details.title);
                into_result(field_errors(&details))?;
                Ok(Self::JobDetails(details))
            }
            JobStep::JobSummary => {
                let mut summary: JobSummary = decode_payload(step.as_str(), raw)?;
                trim_in_place(&mut summary.description);
                into_result(field_errors(&summary))?;
                Ok(Self::JobSummary(summary))
            }
            JobStep::Qualifications => {
                let mut quals: Qualifications = decode_payload(step.as_str(), raw)?;
                quals.tags = dedupe_tags(std::mem::take(&mut quals.tags));
                let mut errors = field_errors(&quals);
                errors.extend(check_tags("tags", &quals.tags, QUALIFICATION_TAG_MAX));
                into_result(errors)?;
                Ok(Self::Qualifications(quals))
            }
            JobStep::PostJob => {
                let mut post: PostJob = decode_payload(step.as_str(), raw)?;
                post.normalize();
                let mut errors = field_errors(&post);
                errors.extend(post.cross_field_errors(today));
                errors.sort_by(|a, b| a.field.cmp(&b.field));
                into_result(errors)?;
                Ok(Self::PostJob(post))
            }
        }
    }

    /// The step this payload belongs to.
    pub fn step(&self) -> JobStep {
        match self {
            Self::JobDetails(_) => JobStep::JobDetails,
            Self::JobSummary(_) => JobStep::JobSummary,
            Self::Qualifications(_) => JobStep::Qualifications,
            Self::PostJob(_) => JobStep::PostJob,
        }
    }
}

impl PostJob {
    fn normalize(&mut self) {
        if let Some(address) = &mut self.address {
            trim_in_place(&mut address.street);
            trim_in_place(&mut address.suburb);
            trim_in_place(&mut address.state);
            trim_in_place(&mut address.postcode);
        }
        trim_in_place(&mut self.salary.currency);
        self.salary.currency = self.salary.currency.to_uppercase();
        if self.work_location == WorkLocation::Remote {
            self.address = None;
        }
    }

    /// Rules spanning more than one field.
    fn cross_field_errors(&self, today: NaiveDate) -> Vec<FieldError> {
        let mut errors = Vec::new();
        if self.work_location != WorkLocation::Remote && self.address.is_none() {
            errors.push(FieldError::new(
                "address",
                CODE_REQUIRED,
                "An address is required unless the job is remote",
            ));
        }
        if self.salary.min > self.salary.max {
            errors.push(FieldError::new(
                "salary.min",
                CODE_INVALID,
                "Minimum salary must not exceed maximum salary",
            ));
        }
        if self.application_deadline < today {
            errors.push(FieldError::new(
                "application_deadline",
                CODE_INVALID,
                "Application deadline must not be in the past",
            ));
        }
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::{CODE_MALFORMED, CODE_TOO_LONG};
    use serde_json::json;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()
    }

    fn codes(err: CoreError) -> Vec<(String, String)> {
        match err {
            CoreError::InvalidFields(errors) => {
                errors.into_iter().map(|e| (e.field, e.code)).collect()
            }
            other => panic!("expected InvalidFields, got {other:?}"),
        }
    }

    fn post_job_json() -> serde_json::Value {
        json!({
            "work_location": "on-site",
            "address": {
                "street": "1 Main St",
                "suburb": "Newtown",
                "state": "NSW",
                "postcode": "2042"
            },
            "salary": { "min": 80000, "max": 95000, "currency": "aud", "period": "yearly" },
            "number_of_positions": 2,
            "application_deadline": "2026-04-01"
        })
    }

    #[test]
    fn job_details_parses_wire_enums() {
        let payload = JobStepPayload::parse(
            JobStep::JobDetails,
            json!({
                "title": "  Electrician ",
                "employment_type": "full-time",
                "shift_preference": "morning",
                "requires_work_rights": true,
                "minimum_experience": "2-5-years"
            }),
            today(),
        )
        .unwrap();

        match payload {
            JobStepPayload::JobDetails(d) => {
                assert_eq!(d.title, "Electrician");
                assert_eq!(d.employment_type, EmploymentType::FullTime);
                assert_eq!(d.minimum_experience, MinimumExperience::TwoToFiveYears);
            }
            other => panic!("unexpected payload {other:?}"),
        }
    }

    #[test]
    fn job_details_blank_title_is_required() {
        let err = JobStepPayload::parse(
            JobStep::JobDetails,
            json!({
                "title": "   ",
                "employment_type": "casual",
                "shift_preference": "night",
                "requires_work_rights": false,
                "minimum_experience": "no-experience"
            }),
            today(),
        )
        .unwrap_err();
        assert_eq!(codes(err), vec![("title".into(), "required".into())]);
    }

    #[test]
    fn unknown_enum_value_is_malformed() {
        let err = JobStepPayload::parse(
            JobStep::JobDetails,
            json!({
                "title": "Chef",
                "employment_type": "forever",
                "shift_preference": "night",
                "requires_work_rights": false,
                "minimum_experience": "no-experience"
            }),
            today(),
        )
        .unwrap_err();
        assert_eq!(codes(err), vec![("job_details".into(), CODE_MALFORMED.into())]);
    }

    #[test]
    fn job_summary_boundary_lengths() {
        let ok = JobStepPayload::parse(
            JobStep::JobSummary,
            json!({ "description": "a".repeat(5000) }),
            today(),
        );
        assert!(ok.is_ok());

        let err = JobStepPayload::parse(
            JobStep::JobSummary,
            json!({ "description": "a".repeat(5001) }),
            today(),
        )
        .unwrap_err();
        assert_eq!(codes(err), vec![("description".into(), CODE_TOO_LONG.into())]);
    }

    #[test]
    fn qualifications_are_deduplicated() {
        let payload = JobStepPayload::parse(
            JobStep::Qualifications,
            json!({ "tags": ["White Card", "white card ", "Forklift"] }),
            today(),
        )
        .unwrap();
        assert_eq!(
            payload,
            JobStepPayload::Qualifications(Qualifications {
                tags: vec!["White Card".into(), "Forklift".into()]
            })
        );
    }

    #[test]
    fn qualifications_require_at_least_one_tag() {
        let err = JobStepPayload::parse(JobStep::Qualifications, json!({ "tags": [] }), today())
            .unwrap_err();
        assert_eq!(codes(err), vec![("tags".into(), "required".into())]);
    }

    #[test]
    fn post_job_normalizes_currency() {
        let payload = JobStepPayload::parse(JobStep::PostJob, post_job_json(), today()).unwrap();
        match payload {
            JobStepPayload::PostJob(p) => assert_eq!(p.salary.currency, "AUD"),
            other => panic!("unexpected payload {other:?}"),
        }
    }

    #[test]
    fn post_job_currency_must_be_three_letters() {
        for bad in ["123", "A1D", "AU", "AUDD", "ÄUD"] {
            let mut raw = post_job_json();
            raw["salary"]["currency"] = json!(bad);
            let err = JobStepPayload::parse(JobStep::PostJob, raw, today()).unwrap_err();
            assert_eq!(
                codes(err),
                vec![("salary.currency".into(), "invalid".into())],
                "currency {bad:?}"
            );
        }
    }

    #[test]
    fn post_job_remote_drops_address() {
        let mut raw = post_job_json();
        raw["work_location"] = json!("remote");
        let payload = JobStepPayload::parse(JobStep::PostJob, raw, today()).unwrap();
        match payload {
            JobStepPayload::PostJob(p) => assert!(p.address.is_none()),
            other => panic!("unexpected payload {other:?}"),
        }
    }

    #[test]
    fn post_job_cross_field_rules() {
        let mut raw = post_job_json();
        raw["address"] = serde_json::Value::Null;
        raw["salary"]["min"] = json!(100000);
        raw["application_deadline"] = json!("2026-02-01");

        let err = JobStepPayload::parse(JobStep::PostJob, raw, today()).unwrap_err();
        assert_eq!(
            codes(err),
            vec![
                ("address".into(), "required".into()),
                ("application_deadline".into(), "invalid".into()),
                ("salary.min".into(), "invalid".into()),
            ]
        );
    }

    #[test]
    fn post_job_positions_out_of_range() {
        let mut raw = post_job_json();
        raw["number_of_positions"] = json!(0);
        let err = JobStepPayload::parse(JobStep::PostJob, raw, today()).unwrap_err();
        assert_eq!(
            codes(err),
            vec![("number_of_positions".into(), "out_of_range".into())]
        );
    }

    #[test]
    fn payload_reports_its_step() {
        let payload = JobStepPayload::parse(
            JobStep::JobSummary,
            json!({ "description": "Fix things" }),
            today(),
        )
        .unwrap();
        assert_eq!(payload.step(), JobStep::JobSummary);
    }
}
