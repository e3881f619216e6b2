//! Candidate aggregate: incoming payloads, records ready to insert, and rows
//! as returned by the store.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub type CandidateId = i32;

// ────────────────────────────────────────────────────────────────────────────
// Request payloads
// ────────────────────────────────────────────────────────────────────────────

/// Body of `POST /candidates`.
///
/// `name` and `email` are optional on the wire so that a missing field is
/// reported by the validator instead of the JSON extractor.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidatePayload {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub educations: Option<Vec<EducationPayload>>,
    #[serde(default)]
    pub work_experiences: Option<Vec<WorkExperiencePayload>>,
    #[serde(default)]
    pub cv: Option<CvPayload>,
}

/// Nested entries are lenient on the wire: missing or unparseable values are
/// reported by the validator as `ValidationError`s with the entry index.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EducationPayload {
    #[serde(default, alias = "school")]
    pub institution: Option<String>,
    #[serde(default, alias = "degree")]
    pub title: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkExperiencePayload {
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
}

/// Descriptor of an already uploaded resume (see `POST /upload`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CvPayload {
    #[serde(default)]
    pub file_path: Option<String>,
    #[serde(default)]
    pub file_type: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Parsed payload, ready to be written
// ────────────────────────────────────────────────────────────────────────────

/// A payload with every required value present and every date parsed.
/// Built before the first write so a malformed entry never leaves a
/// half-written candidate behind.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateDraft {
    pub candidate: NewCandidate,
    pub educations: Vec<EducationDraft>,
    pub work_experiences: Vec<WorkExperienceDraft>,
    pub resume: Option<ResumeDraft>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EducationDraft {
    pub institution: String,
    pub title: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorkExperienceDraft {
    pub company: String,
    pub position: String,
    pub description: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResumeDraft {
    pub file_path: String,
    pub file_type: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Records handed to the repositories
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct NewCandidate {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewEducation {
    pub candidate_id: CandidateId,
    pub institution: String,
    pub title: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewWorkExperience {
    pub candidate_id: CandidateId,
    pub company: String,
    pub position: String,
    pub description: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewResume {
    pub candidate_id: CandidateId,
    pub file_path: String,
    pub file_type: String,
    pub upload_date: DateTime<Utc>,
}

impl EducationDraft {
    pub fn for_candidate(&self, candidate_id: CandidateId) -> NewEducation {
        NewEducation {
            candidate_id,
            institution: self.institution.clone(),
            title: self.title.clone(),
            start_date: self.start_date,
            end_date: self.end_date,
        }
    }
}

impl WorkExperienceDraft {
    pub fn for_candidate(&self, candidate_id: CandidateId) -> NewWorkExperience {
        NewWorkExperience {
            candidate_id,
            company: self.company.clone(),
            position: self.position.clone(),
            description: self.description.clone(),
            start_date: self.start_date,
            end_date: self.end_date,
        }
    }
}

impl ResumeDraft {
    pub fn for_candidate(&self, candidate_id: CandidateId) -> NewResume {
        NewResume {
            candidate_id,
            file_path: self.file_path.clone(),
            file_type: self.file_type.clone(),
            upload_date: Utc::now(),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Persisted rows
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub id: CandidateId,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Education {
    pub id: i32,
    pub institution: String,
    pub title: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub candidate_id: CandidateId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct WorkExperience {
    pub id: i32,
    pub company: String,
    pub position: String,
    pub description: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub candidate_id: CandidateId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Resume {
    pub id: i32,
    pub file_path: String,
    pub file_type: String,
    pub upload_date: DateTime<Utc>,
    pub candidate_id: CandidateId,
}

/// Candidate with everything it owns, as served by `GET /candidates/:id`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateDetail {
    #[serde(flatten)]
    pub candidate: Candidate,
    pub educations: Vec<Education>,
    pub work_experiences: Vec<WorkExperience>,
    pub resumes: Vec<Resume>,
}
