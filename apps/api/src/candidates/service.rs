//! Candidate creation: validate, save the root, then save each child tagged
//! with the id the store assigned.

use thiserror::Error;
use tracing::{info, warn};

use crate::candidates::models::{Candidate, CandidatePayload};
use crate::candidates::repository::{CandidateStores, StoreError};
use crate::candidates::validation::{build_draft, validate_candidate, ValidationError};

pub const DUPLICATE_EMAIL_MESSAGE: &str = "The email already exists in the database";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CandidateError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{}", DUPLICATE_EMAIL_MESSAGE)]
    DuplicateEmail,

    /// Store failure other than a duplicate email; displays the store message as-is.
    #[error(transparent)]
    Persistence(#[from] StoreError),
}

/// Creates a candidate and everything it owns using the default validator.
pub async fn add_candidate<S>(
    stores: &mut S,
    payload: CandidatePayload,
) -> Result<Candidate, CandidateError>
where
    S: CandidateStores + ?Sized,
{
    add_candidate_with(stores, payload, validate_candidate).await
}

/// Same as [`add_candidate`] with a caller-supplied validator.
///
/// Writes are strictly sequential: candidate, educations, work experiences,
/// resume. Absent sections cause no store call at all. The whole payload is
/// parsed before the first write, whatever `validate` admits. Nothing is
/// rolled back here; atomicity comes from whatever transaction `stores` runs in.
pub async fn add_candidate_with<S, V>(
    stores: &mut S,
    payload: CandidatePayload,
    validate: V,
) -> Result<Candidate, CandidateError>
where
    S: CandidateStores + ?Sized,
    V: FnOnce(&CandidatePayload) -> Result<(), ValidationError>,
{
    validate(&payload)?;
    let draft = build_draft(&payload)?;

    let candidate = stores
        .save_candidate(draft.candidate)
        .await
        .map_err(|err| match err {
            StoreError::UniqueViolation(constraint) => {
                warn!("Duplicate candidate email rejected ({constraint})");
                CandidateError::DuplicateEmail
            }
            other => CandidateError::Persistence(other),
        })?;

    for education in &draft.educations {
        stores
            .save_education(education.for_candidate(candidate.id))
            .await?;
    }

    for experience in &draft.work_experiences {
        stores
            .save_work_experience(experience.for_candidate(candidate.id))
            .await?;
    }

    if let Some(resume) = &draft.resume {
        stores.save_resume(resume.for_candidate(candidate.id)).await?;
    }

    info!(
        "Created candidate {} with {} education(s), {} work experience(s), resume: {}",
        candidate.id,
        draft.educations.len(),
        draft.work_experiences.len(),
        draft.resume.is_some()
    );

    Ok(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidates::models::{
        CvPayload, Education, EducationPayload, NewCandidate, NewEducation, NewResume,
        NewWorkExperience, Resume, WorkExperience, WorkExperiencePayload,
    };
    use crate::candidates::repository::{
        CandidateRepository, EducationRepository, ResumeRepository, WorkExperienceRepository,
    };
    use async_trait::async_trait;

    /// A single store call, in the order it was made.
    #[derive(Debug, Clone, PartialEq)]
    pub enum Call {
        Candidate(NewCandidate),
        Education(NewEducation),
        WorkExperience(NewWorkExperience),
        Resume(NewResume),
    }

    /// In-memory stores that record every call and can be told to fail.
    #[derive(Default)]
    pub struct RecordingStores {
        pub calls: Vec<Call>,
        pub candidate_id: i32,
        pub fail_candidate: Option<StoreError>,
        pub fail_education: Option<StoreError>,
        pub fail_work_experience: Option<StoreError>,
        pub fail_resume: Option<StoreError>,
    }

    impl RecordingStores {
        pub fn with_id(candidate_id: i32) -> Self {
            RecordingStores {
                candidate_id,
                ..Default::default()
            }
        }

        fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
            self.calls.iter().filter(|c| pred(c)).count()
        }
    }

    #[async_trait]
    impl CandidateRepository for RecordingStores {
        async fn save_candidate(
            &mut self,
            candidate: NewCandidate,
        ) -> Result<Candidate, StoreError> {
            self.calls.push(Call::Candidate(candidate.clone()));
            if let Some(err) = self.fail_candidate.clone() {
                return Err(err);
            }
            Ok(Candidate {
                id: self.candidate_id,
                name: candidate.name,
                email: candidate.email,
                phone: candidate.phone,
                address: candidate.address,
            })
        }
    }

    #[async_trait]
    impl EducationRepository for RecordingStores {
        async fn save_education(
            &mut self,
            education: NewEducation,
        ) -> Result<Education, StoreError> {
            self.calls.push(Call::Education(education.clone()));
            if let Some(err) = self.fail_education.clone() {
                return Err(err);
            }
            Ok(Education {
                id: self.calls.len() as i32,
                institution: education.institution,
                title: education.title,
                start_date: education.start_date,
                end_date: education.end_date,
                candidate_id: education.candidate_id,
            })
        }
    }

    #[async_trait]
    impl WorkExperienceRepository for RecordingStores {
        async fn save_work_experience(
            &mut self,
            experience: NewWorkExperience,
        ) -> Result<WorkExperience, StoreError> {
            self.calls.push(Call::WorkExperience(experience.clone()));
            if let Some(err) = self.fail_work_experience.clone() {
                return Err(err);
            }
            Ok(WorkExperience {
                id: self.calls.len() as i32,
                company: experience.company,
                position: experience.position,
                description: experience.description,
                start_date: experience.start_date,
                end_date: experience.end_date,
                candidate_id: experience.candidate_id,
            })
        }
    }

    #[async_trait]
    impl ResumeRepository for RecordingStores {
        async fn save_resume(&mut self, resume: NewResume) -> Result<Resume, StoreError> {
            self.calls.push(Call::Resume(resume.clone()));
            if let Some(err) = self.fail_resume.clone() {
                return Err(err);
            }
            Ok(Resume {
                id: self.calls.len() as i32,
                file_path: resume.file_path,
                file_type: resume.file_type,
                upload_date: resume.upload_date,
                candidate_id: resume.candidate_id,
            })
        }
    }

    pub fn john_doe() -> CandidatePayload {
        CandidatePayload {
            name: Some("John Doe".to_string()),
            email: Some("john@example.com".to_string()),
            phone: None,
            address: None,
            educations: Some(vec![EducationPayload {
                institution: Some("University A".to_string()),
                title: Some("Bachelor".to_string()),
                start_date: Some("2012-09-01".to_string()),
                end_date: Some("2016-06-30".to_string()),
            }]),
            work_experiences: Some(vec![WorkExperiencePayload {
                company: Some("Company X".to_string()),
                position: Some("Developer".to_string()),
                description: None,
                start_date: Some("2016-09-01".to_string()),
                end_date: None,
            }]),
            cv: Some(CvPayload {
                file_path: Some("uploads/1700000000000-resume.pdf".to_string()),
                file_type: Some("application/pdf".to_string()),
            }),
        }
    }

    #[tokio::test]
    async fn test_creates_candidate_then_children_tagged_with_its_id() {
        let mut stores = RecordingStores::with_id(123);

        let saved = add_candidate(&mut stores, john_doe()).await.unwrap();

        assert_eq!(
            saved,
            Candidate {
                id: 123,
                name: "John Doe".to_string(),
                email: "john@example.com".to_string(),
                phone: None,
                address: None,
            }
        );
        assert_eq!(stores.calls.len(), 4);
        assert!(matches!(&stores.calls[0], Call::Candidate(c) if c.email == "john@example.com"));
        assert!(matches!(&stores.calls[1], Call::Education(e) if e.candidate_id == 123 && e.institution == "University A"));
        assert!(matches!(&stores.calls[2], Call::WorkExperience(w) if w.candidate_id == 123 && w.company == "Company X"));
        assert!(matches!(&stores.calls[3], Call::Resume(r) if r.candidate_id == 123 && r.file_type == "application/pdf"));
    }

    #[tokio::test]
    async fn test_returns_exactly_what_the_candidate_store_returned() {
        let mut stores = RecordingStores::with_id(9);
        let mut payload = john_doe();
        payload.name = Some("  John Doe  ".to_string());

        let saved = add_candidate(&mut stores, payload).await.unwrap();

        assert_eq!(saved.id, 9);
        assert_eq!(saved.name, "John Doe");
    }

    #[tokio::test]
    async fn test_one_education_save_per_entry() {
        let mut stores = RecordingStores::with_id(5);
        let mut payload = john_doe();
        let first = payload.educations.as_ref().unwrap()[0].clone();
        payload.educations = Some(vec![
            first.clone(),
            EducationPayload {
                institution: Some("University B".to_string()),
                ..first.clone()
            },
            EducationPayload {
                institution: Some("University C".to_string()),
                ..first
            },
        ]);

        add_candidate(&mut stores, payload).await.unwrap();

        let educations: Vec<_> = stores
            .calls
            .iter()
            .filter_map(|c| match c {
                Call::Education(e) => Some(e),
                _ => None,
            })
            .collect();
        assert_eq!(educations.len(), 3);
        assert!(educations.iter().all(|e| e.candidate_id == 5));
        assert_eq!(educations[2].institution, "University C");
    }

    #[tokio::test]
    async fn test_absent_sections_are_never_saved() {
        let mut stores = RecordingStores::with_id(1);
        let payload = CandidatePayload {
            educations: None,
            work_experiences: None,
            cv: None,
            ..john_doe()
        };

        add_candidate(&mut stores, payload).await.unwrap();

        assert_eq!(stores.calls.len(), 1);
        assert!(matches!(stores.calls[0], Call::Candidate(_)));
    }

    #[tokio::test]
    async fn test_missing_education_skips_only_education() {
        let mut stores = RecordingStores::with_id(1);
        let payload = CandidatePayload {
            educations: None,
            ..john_doe()
        };

        add_candidate(&mut stores, payload).await.unwrap();

        assert_eq!(stores.count(|c| matches!(c, Call::Education(_))), 0);
        assert_eq!(stores.count(|c| matches!(c, Call::WorkExperience(_))), 1);
        assert_eq!(stores.count(|c| matches!(c, Call::Resume(_))), 1);
    }

    #[tokio::test]
    async fn test_missing_cv_skips_resume() {
        let mut stores = RecordingStores::with_id(1);
        let payload = CandidatePayload {
            cv: None,
            ..john_doe()
        };

        add_candidate(&mut stores, payload).await.unwrap();

        assert_eq!(stores.count(|c| matches!(c, Call::Resume(_))), 0);
    }

    #[tokio::test]
    async fn test_missing_name_fails_before_any_save() {
        let mut stores = RecordingStores::with_id(1);
        let payload = CandidatePayload {
            name: None,
            ..john_doe()
        };

        let err = add_candidate(&mut stores, payload).await.unwrap_err();

        assert_eq!(
            err,
            CandidateError::Validation(ValidationError::MissingField("name"))
        );
        assert!(stores.calls.is_empty());
    }

    #[tokio::test]
    async fn test_missing_email_fails_before_any_save() {
        let mut stores = RecordingStores::with_id(1);
        let payload = CandidatePayload {
            email: None,
            ..john_doe()
        };

        assert!(add_candidate(&mut stores, payload).await.is_err());
        assert!(stores.calls.is_empty());
    }

    #[tokio::test]
    async fn test_validator_error_propagates_unchanged() {
        let mut stores = RecordingStores::with_id(1);

        let err = add_candidate_with(&mut stores, john_doe(), |_| {
            Err(ValidationError::InvalidCv)
        })
        .await
        .unwrap_err();

        assert_eq!(err, CandidateError::Validation(ValidationError::InvalidCv));
        assert_eq!(err.to_string(), "Invalid CV data");
        assert!(stores.calls.is_empty());
    }

    #[tokio::test]
    async fn test_custom_validator_can_admit_payloads() {
        let mut stores = RecordingStores::with_id(77);
        let payload = CandidatePayload {
            name: Some("X".to_string()),
            email: Some("not-an-email".to_string()),
            ..Default::default()
        };

        let saved = add_candidate_with(&mut stores, payload, |_| Ok(())).await.unwrap();

        assert_eq!(saved.id, 77);
    }

    #[tokio::test]
    async fn test_permissive_validator_still_writes_nothing_for_an_undated_entry() {
        let mut stores = RecordingStores::with_id(1);
        let mut payload = john_doe();
        payload.educations = Some(vec![EducationPayload {
            institution: Some("U".to_string()),
            title: Some("B".to_string()),
            ..Default::default()
        }]);

        let err = add_candidate_with(&mut stores, payload, |_| Ok(()))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            CandidateError::Validation(ValidationError::InvalidEducation {
                index: 0,
                field: "startDate"
            })
        );
        assert!(stores.calls.is_empty());
    }

    #[tokio::test]
    async fn test_unique_violation_becomes_duplicate_email() {
        let mut stores = RecordingStores {
            fail_candidate: Some(StoreError::UniqueViolation("candidates_email_key".to_string())),
            ..RecordingStores::with_id(1)
        };

        let err = add_candidate(&mut stores, john_doe()).await.unwrap_err();

        assert_eq!(err, CandidateError::DuplicateEmail);
        assert_eq!(err.to_string(), DUPLICATE_EMAIL_MESSAGE);
        assert_eq!(stores.calls.len(), 1);
    }

    #[tokio::test]
    async fn test_other_candidate_failures_keep_their_message() {
        let mut stores = RecordingStores {
            fail_candidate: Some(StoreError::Unavailable(
                "Database connection failed".to_string(),
            )),
            ..RecordingStores::with_id(1)
        };

        let err = add_candidate(&mut stores, john_doe()).await.unwrap_err();

        assert_eq!(err.to_string(), "Database connection failed");
        assert_eq!(stores.calls.len(), 1);
    }

    #[tokio::test]
    async fn test_child_failures_propagate_and_stop_the_sequence() {
        let mut stores = RecordingStores {
            fail_education: Some(StoreError::Unavailable("Database error".to_string())),
            ..RecordingStores::with_id(1)
        };

        let err = add_candidate(&mut stores, john_doe()).await.unwrap_err();

        assert_eq!(err.to_string(), "Database error");
        // candidate + the failing education; nothing after it
        assert_eq!(stores.calls.len(), 2);
    }

    #[tokio::test]
    async fn test_unique_violation_on_a_child_is_not_a_duplicate_email() {
        let mut stores = RecordingStores {
            fail_resume: Some(StoreError::UniqueViolation("resumes_pkey".to_string())),
            ..RecordingStores::with_id(1)
        };

        let err = add_candidate(&mut stores, john_doe()).await.unwrap_err();

        assert!(matches!(err, CandidateError::Persistence(StoreError::UniqueViolation(_))));
    }

    #[tokio::test]
    async fn test_work_experience_failure_propagates() {
        let mut stores = RecordingStores {
            fail_work_experience: Some(StoreError::Unavailable("Database error".to_string())),
            ..RecordingStores::with_id(1)
        };

        let err = add_candidate(&mut stores, john_doe()).await.unwrap_err();

        assert_eq!(err.to_string(), "Database error");
        assert_eq!(stores.count(|c| matches!(c, Call::Resume(_))), 0);
    }
}
