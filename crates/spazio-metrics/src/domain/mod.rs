pub mod assessments;
pub mod recurrence;
pub mod rentals;
pub mod types;

pub use assessments::{validate_comment, AssessmentRecord, NewAssessment};
pub use recurrence::RecurrenceSchedule;
pub use rentals::{BookingRequest, RecurrenceRequest, RentalRecord};
pub use types::{
    AssessmentId, DateRange, EvaluationType, Money, RecurrenceKind, RentalId, Score, SpaceId,
    TimeOfDay, UserId,
};
