//! Persistence seam for the candidate aggregate.
//!
//! One trait per entity type. The Postgres adapter implements all of them on
//! `PgConnection`, so a `Transaction` (which derefs to a connection) can be
//! handed to the orchestrator and every write lands in the same transaction.

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};
use thiserror::Error;

use crate::candidates::models::{
    Candidate, CandidateDetail, CandidateId, Education, NewCandidate, NewEducation, NewResume,
    NewWorkExperience, Resume, WorkExperience,
};

/// Store failure as seen by the orchestrator, independent of the driver.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// An insert would duplicate a unique column. Carries the constraint name.
    #[error("Unique constraint failed: {0}")]
    UniqueViolation(String),

    #[error("record not found")]
    NotFound,

    /// Any other failure, message kept verbatim.
    #[error("{0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                StoreError::UniqueViolation(db_err.constraint().unwrap_or("unknown").to_string())
            }
            _ => StoreError::Unavailable(err.to_string()),
        }
    }
}

#[async_trait]
pub trait CandidateRepository: Send {
    async fn save_candidate(&mut self, candidate: NewCandidate) -> Result<Candidate, StoreError>;
}

#[async_trait]
pub trait EducationRepository: Send {
    async fn save_education(&mut self, education: NewEducation) -> Result<Education, StoreError>;
}

#[async_trait]
pub trait WorkExperienceRepository: Send {
    async fn save_work_experience(
        &mut self,
        experience: NewWorkExperience,
    ) -> Result<WorkExperience, StoreError>;
}

#[async_trait]
pub trait ResumeRepository: Send {
    async fn save_resume(&mut self, resume: NewResume) -> Result<Resume, StoreError>;
}

/// Everything `add_candidate` writes to.
pub trait CandidateStores:
    CandidateRepository + EducationRepository + WorkExperienceRepository + ResumeRepository
{
}

impl<T> CandidateStores for T where
    T: CandidateRepository + EducationRepository + WorkExperienceRepository + ResumeRepository
{
}

// ────────────────────────────────────────────────────────────────────────────
// Postgres adapter
// ────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl CandidateRepository for PgConnection {
    async fn save_candidate(&mut self, candidate: NewCandidate) -> Result<Candidate, StoreError> {
        let row = sqlx::query_as::<_, Candidate>(
            r#"
            INSERT INTO candidates (name, email, phone, address)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, email, phone, address
            "#,
        )
        .bind(&candidate.name)
        .bind(&candidate.email)
        .bind(&candidate.phone)
        .bind(&candidate.address)
        .fetch_one(&mut *self)
        .await?;
        Ok(row)
    }
}

#[async_trait]
impl EducationRepository for PgConnection {
    async fn save_education(&mut self, education: NewEducation) -> Result<Education, StoreError> {
        let row = sqlx::query_as::<_, Education>(
            r#"
            INSERT INTO educations (institution, title, start_date, end_date, candidate_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, institution, title, start_date, end_date, candidate_id
            "#,
        )
        .bind(&education.institution)
        .bind(&education.title)
        .bind(education.start_date)
        .bind(education.end_date)
        .bind(education.candidate_id)
        .fetch_one(&mut *self)
        .await?;
        Ok(row)
    }
}

#[async_trait]
impl WorkExperienceRepository for PgConnection {
    async fn save_work_experience(
        &mut self,
        experience: NewWorkExperience,
    ) -> Result<WorkExperience, StoreError> {
        let row = sqlx::query_as::<_, WorkExperience>(
            r#"
            INSERT INTO work_experiences
                (company, position, description, start_date, end_date, candidate_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, company, position, description, start_date, end_date, candidate_id
            "#,
        )
        .bind(&experience.company)
        .bind(&experience.position)
        .bind(&experience.description)
        .bind(experience.start_date)
        .bind(experience.end_date)
        .bind(experience.candidate_id)
        .fetch_one(&mut *self)
        .await?;
        Ok(row)
    }
}

#[async_trait]
impl ResumeRepository for PgConnection {
    async fn save_resume(&mut self, resume: NewResume) -> Result<Resume, StoreError> {
        let row = sqlx::query_as::<_, Resume>(
            r#"
            INSERT INTO resumes (file_path, file_type, upload_date, candidate_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, file_path, file_type, upload_date, candidate_id
            "#,
        )
        .bind(&resume.file_path)
        .bind(&resume.file_type)
        .bind(resume.upload_date)
        .bind(resume.candidate_id)
        .fetch_one(&mut *self)
        .await?;
        Ok(row)
    }
}

/// Loads a candidate and all of its child rows.
pub async fn find_candidate(pool: &PgPool, id: CandidateId) -> Result<CandidateDetail, StoreError> {
    let candidate = sqlx::query_as::<_, Candidate>(
        "SELECT id, name, email, phone, address FROM candidates WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(StoreError::NotFound)?;

    let educations = sqlx::query_as::<_, Education>(
        r#"
        SELECT id, institution, title, start_date, end_date, candidate_id
        FROM educations
        WHERE candidate_id = $1
        ORDER BY start_date DESC, id
        "#,
    )
    .bind(id)
    .fetch_all(pool)
    .await?;

    let work_experiences = sqlx::query_as::<_, WorkExperience>(
        r#"
        SELECT id, company, position, description, start_date, end_date, candidate_id
        FROM work_experiences
        WHERE candidate_id = $1
        ORDER BY start_date DESC, id
        "#,
    )
    .bind(id)
    .fetch_all(pool)
    .await?;

    let resumes = sqlx::query_as::<_, Resume>(
        r#"
        SELECT id, file_path, file_type, upload_date, candidate_id
        FROM resumes
        WHERE candidate_id = $1
        ORDER BY upload_date DESC, id
        "#,
    )
    .bind(id)
    .fetch_all(pool)
    .await?;

    Ok(CandidateDetail {
        candidate,
        educations,
        work_experiences,
        resumes,
    })
}
