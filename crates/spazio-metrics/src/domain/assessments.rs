use crate::domain::types::{AssessmentId, EvaluationType, RentalId, Score, SpaceId, UserId};
use crate::error::{MetricsError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Longest accepted review comment.
const MAX_COMMENT_CHARS: usize = 500;

/// A rating/review record in the assessment ledger.
///
/// At most one assessment may exist per (rental, author, evaluation type)
/// triple; the ledger enforces this at insert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentRecord {
    pub id: AssessmentId,
    /// Who is being rated
    pub subject_user_id: UserId,
    pub space_id: SpaceId,
    /// The completed stay the rating is about
    pub rental_id: RentalId,
    /// Who wrote the rating
    pub author_id: UserId,
    pub score: Score,
    pub comment: Option<String>,
    pub evaluation_type: EvaluationType,
    pub is_owner_evaluation: bool,
    pub evaluation_date: DateTime<Utc>,
}

/// A validated request to create an assessment.
#[derive(Debug, Clone)]
pub struct NewAssessment {
    pub subject_user_id: UserId,
    pub space_id: SpaceId,
    pub rental_id: RentalId,
    pub author_id: UserId,
    pub score: Score,
    pub comment: Option<String>,
    pub evaluation_type: EvaluationType,
}

impl NewAssessment {
    pub fn validate(&self) -> Result<()> {
        if self.author_id == self.subject_user_id {
            return Err(MetricsError::authorization("You cannot assess yourself"));
        }
        if let Some(comment) = &self.comment {
            validate_comment(comment)?;
        }
        Ok(())
    }

    pub fn into_record(self) -> AssessmentRecord {
        let is_owner_evaluation = self.evaluation_type == EvaluationType::OwnerToTenant;
        AssessmentRecord {
            id: AssessmentId::new(),
            subject_user_id: self.subject_user_id,
            space_id: self.space_id,
            rental_id: self.rental_id,
            author_id: self.author_id,
            score: self.score,
            comment: self.comment,
            evaluation_type: self.evaluation_type,
            is_owner_evaluation,
            evaluation_date: Utc::now(),
        }
    }
}

pub fn validate_comment(comment: &str) -> Result<()> {
    if comment.chars().count() > MAX_COMMENT_CHARS {
        return Err(MetricsError::validation(format!(
            "Comment may not exceed {MAX_COMMENT_CHARS} characters"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_assessment() -> NewAssessment {
        NewAssessment {
            subject_user_id: UserId::new(),
            space_id: SpaceId::new(),
            rental_id: RentalId::new(),
            author_id: UserId::new(),
            score: Score::new(4).unwrap(),
            comment: Some("Great space".to_string()),
            evaluation_type: EvaluationType::UserToUser,
        }
    }

    #[test]
    fn test_self_assessment_forbidden() {
        let mut assessment = new_assessment();
        assessment.author_id = assessment.subject_user_id;
        assert!(matches!(
            assessment.validate(),
            Err(MetricsError::Authorization { .. })
        ));
    }

    #[test]
    fn test_comment_length_cap() {
        let mut assessment = new_assessment();
        assessment.comment = Some("x".repeat(501));
        assert!(assessment.validate().is_err());

        assessment.comment = Some("x".repeat(500));
        assert!(assessment.validate().is_ok());
    }

    #[test]
    fn test_owner_evaluation_flag_derived_from_type() {
        let mut assessment = new_assessment();
        assessment.evaluation_type = EvaluationType::OwnerToTenant;
        assert!(assessment.into_record().is_owner_evaluation);

        assert!(!new_assessment().into_record().is_owner_evaluation);
    }
}
