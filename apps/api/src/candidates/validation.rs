use chrono::NaiveDate;
use thiserror::Error;

use crate::candidates::models::{
    CandidateDraft, CandidatePayload, CvPayload, EducationDraft, EducationPayload, NewCandidate,
    ResumeDraft, WorkExperienceDraft, WorkExperiencePayload,
};

const NAME_MIN_CHARS: usize = 2;
const NAME_MAX_CHARS: usize = 100;
const EMAIL_MAX_CHARS: usize = 255;
const ADDRESS_MAX_CHARS: usize = 100;
const SHORT_TEXT_MAX_CHARS: usize = 100;
const DESCRIPTION_MAX_CHARS: usize = 200;
const FILE_PATH_MAX_CHARS: usize = 500;
const FILE_TYPE_MAX_CHARS: usize = 100;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Why a candidate payload was rejected. Raised before any write happens.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid name")]
    InvalidName,

    #[error("Invalid email")]
    InvalidEmail,

    #[error("Invalid phone")]
    InvalidPhone,

    #[error("Invalid address")]
    InvalidAddress,

    #[error("Invalid {field} in educations[{index}]")]
    InvalidEducation { index: usize, field: &'static str },

    #[error("Invalid {field} in workExperiences[{index}]")]
    InvalidWorkExperience { index: usize, field: &'static str },

    #[error("Invalid CV data")]
    InvalidCv,
}

/// Checks a candidate payload without touching any store.
///
/// Required: `name` and `email`. Everything else is checked only when present.
pub fn validate_candidate(payload: &CandidatePayload) -> Result<(), ValidationError> {
    let draft = build_draft(payload)?;
    let candidate = &draft.candidate;

    validate_name(&candidate.name)?;
    validate_email(&candidate.email)?;
    if let Some(phone) = candidate.phone.as_deref() {
        validate_phone(phone)?;
    }
    if let Some(address) = candidate.address.as_deref() {
        if address.chars().count() > ADDRESS_MAX_CHARS {
            return Err(ValidationError::InvalidAddress);
        }
    }

    for (index, education) in draft.educations.iter().enumerate() {
        validate_education(index, education)?;
    }
    for (index, experience) in draft.work_experiences.iter().enumerate() {
        validate_work_experience(index, experience)?;
    }
    if let Some(resume) = &draft.resume {
        validate_resume(resume)?;
    }

    Ok(())
}

/// Pulls the required values out of a payload and parses its dates.
///
/// Only shape is checked here; content rules live in [`validate_candidate`].
pub fn build_draft(payload: &CandidatePayload) -> Result<CandidateDraft, ValidationError> {
    let name = payload
        .name
        .as_deref()
        .ok_or(ValidationError::MissingField("name"))?;
    let email = payload
        .email
        .as_deref()
        .ok_or(ValidationError::MissingField("email"))?;

    let educations = payload
        .educations
        .iter()
        .flatten()
        .enumerate()
        .map(|(index, education)| education_draft(index, education))
        .collect::<Result<Vec<_>, _>>()?;
    let work_experiences = payload
        .work_experiences
        .iter()
        .flatten()
        .enumerate()
        .map(|(index, experience)| work_experience_draft(index, experience))
        .collect::<Result<Vec<_>, _>>()?;
    let resume = payload.cv.as_ref().map(resume_draft).transpose()?;

    Ok(CandidateDraft {
        candidate: NewCandidate {
            name: name.trim().to_string(),
            email: email.trim().to_string(),
            phone: payload.phone.clone(),
            address: payload.address.clone(),
        },
        educations,
        work_experiences,
        resume,
    })
}

fn education_draft(
    index: usize,
    education: &EducationPayload,
) -> Result<EducationDraft, ValidationError> {
    let invalid = |field| ValidationError::InvalidEducation { index, field };

    Ok(EducationDraft {
        institution: required_text(&education.institution).ok_or(invalid("institution"))?,
        title: required_text(&education.title).ok_or(invalid("title"))?,
        start_date: required_date(&education.start_date).ok_or(invalid("startDate"))?,
        end_date: optional_date(&education.end_date).map_err(|_| invalid("endDate"))?,
    })
}

fn work_experience_draft(
    index: usize,
    experience: &WorkExperiencePayload,
) -> Result<WorkExperienceDraft, ValidationError> {
    let invalid = |field| ValidationError::InvalidWorkExperience { index, field };

    Ok(WorkExperienceDraft {
        company: required_text(&experience.company).ok_or(invalid("company"))?,
        position: required_text(&experience.position).ok_or(invalid("position"))?,
        description: experience.description.clone(),
        start_date: required_date(&experience.start_date).ok_or(invalid("startDate"))?,
        end_date: optional_date(&experience.end_date).map_err(|_| invalid("endDate"))?,
    })
}

fn resume_draft(cv: &CvPayload) -> Result<ResumeDraft, ValidationError> {
    Ok(ResumeDraft {
        file_path: required_text(&cv.file_path).ok_or(ValidationError::InvalidCv)?,
        file_type: required_text(&cv.file_type).ok_or(ValidationError::InvalidCv)?,
    })
}

fn required_text(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn required_date(value: &Option<String>) -> Option<NaiveDate> {
    value
        .as_deref()
        .and_then(|v| NaiveDate::parse_from_str(v.trim(), DATE_FORMAT).ok())
}

/// Absent is fine; present but unparseable is not.
fn optional_date(value: &Option<String>) -> Result<Option<NaiveDate>, chrono::ParseError> {
    value
        .as_deref()
        .map(|v| NaiveDate::parse_from_str(v.trim(), DATE_FORMAT))
        .transpose()
}

fn validate_name(name: &str) -> Result<(), ValidationError> {
    let len = name.chars().count();
    if len < NAME_MIN_CHARS || len > NAME_MAX_CHARS {
        return Err(ValidationError::InvalidName);
    }
    if !name.chars().all(|c| c.is_alphabetic() || c == ' ') {
        return Err(ValidationError::InvalidName);
    }
    Ok(())
}

/// `local@domain.tld`, no whitespace anywhere.
fn validate_email(email: &str) -> Result<(), ValidationError> {
    if email.is_empty()
        || email.chars().count() > EMAIL_MAX_CHARS
        || email.chars().any(char::is_whitespace)
    {
        return Err(ValidationError::InvalidEmail);
    }
    let (local, domain) = email.split_once('@').ok_or(ValidationError::InvalidEmail)?;
    if local.is_empty() || domain.contains('@') {
        return Err(ValidationError::InvalidEmail);
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) if !host.is_empty() && !tld.is_empty() => Ok(()),
        _ => Err(ValidationError::InvalidEmail),
    }
}

/// Nine digits, leading 6, 7 or 9.
fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    let valid = phone.len() == 9
        && phone.chars().all(|c| c.is_ascii_digit())
        && matches!(phone.as_bytes()[0], b'6' | b'7' | b'9');
    if valid {
        Ok(())
    } else {
        Err(ValidationError::InvalidPhone)
    }
}

fn validate_education(index: usize, education: &EducationDraft) -> Result<(), ValidationError> {
    let invalid = |field| ValidationError::InvalidEducation { index, field };

    if !is_short_text(&education.institution) {
        return Err(invalid("institution"));
    }
    if !is_short_text(&education.title) {
        return Err(invalid("title"));
    }
    if !dates_in_order(education.start_date, education.end_date) {
        return Err(invalid("endDate"));
    }
    Ok(())
}

fn validate_work_experience(
    index: usize,
    experience: &WorkExperienceDraft,
) -> Result<(), ValidationError> {
    let invalid = |field| ValidationError::InvalidWorkExperience { index, field };

    if !is_short_text(&experience.company) {
        return Err(invalid("company"));
    }
    if !is_short_text(&experience.position) {
        return Err(invalid("position"));
    }
    if let Some(description) = experience.description.as_deref() {
        if description.chars().count() > DESCRIPTION_MAX_CHARS {
            return Err(invalid("description"));
        }
    }
    if !dates_in_order(experience.start_date, experience.end_date) {
        return Err(invalid("endDate"));
    }
    Ok(())
}

fn validate_resume(resume: &ResumeDraft) -> Result<(), ValidationError> {
    if resume.file_path.chars().count() > FILE_PATH_MAX_CHARS
        || resume.file_type.chars().count() > FILE_TYPE_MAX_CHARS
    {
        return Err(ValidationError::InvalidCv);
    }
    Ok(())
}

fn is_short_text(value: &str) -> bool {
    value.chars().count() <= SHORT_TEXT_MAX_CHARS
}

fn dates_in_order(start: NaiveDate, end: Option<NaiveDate>) -> bool {
    end.map_or(true, |end| end >= start)
}
