use crate::error::MetricsError;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// User identifier (tenant, owner or assessment author)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(Uuid);

/// Space identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpaceId(Uuid);

/// Rental identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RentalId(Uuid);

/// Assessment identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssessmentId(Uuid);

macro_rules! uuid_id {
    ($name:ident) => {
        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            pub fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

uuid_id!(UserId);
uuid_id!(SpaceId);
uuid_id!(RentalId);
uuid_id!(AssessmentId);

/// Assessment score, an integer between 1 and 5 stars
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Score(u8);

impl Score {
    pub fn new(value: u8) -> Result<Self, MetricsError> {
        if !(1..=5).contains(&value) {
            return Err(MetricsError::validation(
                "Score must be an integer between 1 and 5 stars",
            ));
        }
        Ok(Self(value))
    }

    /// Validate a wire-level score: must be integral and within 1..=5.
    pub fn try_from_f64(value: f64) -> Result<Self, MetricsError> {
        if value.fract() != 0.0 || !value.is_finite() {
            return Err(MetricsError::validation(
                "Score must be an integer between 1 and 5 stars",
            ));
        }
        if !(1.0..=5.0).contains(&value) {
            return Err(MetricsError::validation(
                "Score must be an integer between 1 and 5 stars",
            ));
        }
        Ok(Self(value as u8))
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Score {
    type Error = MetricsError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Score> for u8 {
    fn from(score: Score) -> Self {
        score.0
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Time of day in 24h HH:MM form
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay(String);

static TIME_OF_DAY_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-1]\d|2[0-3]):([0-5]\d)$").unwrap());

impl TimeOfDay {
    pub fn new(value: impl Into<String>) -> Result<Self, MetricsError> {
        let value = value.into();
        if !TIME_OF_DAY_REGEX.is_match(&value) {
            return Err(MetricsError::validation(format!(
                "Invalid time of day '{value}', expected HH:MM"
            )));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = MetricsError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TimeOfDay> for String {
    fn from(t: TimeOfDay) -> Self {
        t.0
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Monetary value with two-decimal precision
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Money(Decimal);

impl Money {
    pub fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    pub fn from_decimal(amount: Decimal) -> Self {
        Self(amount.round_dp(2))
    }

    /// Parse a rental value; must be a positive finite number.
    pub fn try_from_f64(amount: f64) -> Result<Self, MetricsError> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(MetricsError::validation(
                "Value must be a positive finite number",
            ));
        }
        Decimal::from_f64(amount)
            .map(|d| Self(d.round_dp(2)))
            .ok_or_else(|| MetricsError::validation("Value must be a positive finite number"))
    }

    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    pub fn add(&self, other: Money) -> Self {
        Self::from_decimal(self.0 + other.0)
    }

    pub fn multiply(&self, factor: u32) -> Self {
        Self::from_decimal(self.0 * Decimal::from(factor))
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Who rated whom
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationType {
    UserToUser,
    OwnerToTenant,
    TenantToSpace,
}

impl EvaluationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EvaluationType::UserToUser => "user_to_user",
            EvaluationType::OwnerToTenant => "owner_to_tenant",
            EvaluationType::TenantToSpace => "tenant_to_space",
        }
    }
}

impl fmt::Display for EvaluationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EvaluationType {
    type Err = MetricsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user_to_user" => Ok(EvaluationType::UserToUser),
            "owner_to_tenant" => Ok(EvaluationType::OwnerToTenant),
            "tenant_to_space" => Ok(EvaluationType::TenantToSpace),
            other => Err(MetricsError::validation(format!(
                "Unknown evaluation type '{other}'"
            ))),
        }
    }
}

/// Booking recurrence period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecurrenceKind {
    Weekly,
    Monthly,
}

impl fmt::Display for RecurrenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecurrenceKind::Weekly => write!(f, "weekly"),
            RecurrenceKind::Monthly => write!(f, "monthly"),
        }
    }
}

/// Optional inclusive date bounds applied to rental queries.
///
/// `start` filters on the rental start date (>=), `end` on the rental end
/// date (<=); either bound may be open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    /// Check whether a rental with the given start/end dates passes the filter.
    pub fn matches(&self, rental_start: NaiveDate, rental_end: NaiveDate) -> bool {
        if let Some(start) = self.start {
            if rental_start < start {
                return false;
            }
        }
        if let Some(end) = self.end {
            if rental_end > end {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_bounds() {
        assert!(Score::new(1).is_ok());
        assert!(Score::new(5).is_ok());
        assert!(Score::new(0).is_err());
        assert!(Score::new(6).is_err());
    }

    #[test]
    fn test_score_from_f64_rejects_fractional() {
        assert!(Score::try_from_f64(4.5).is_err());
        assert!(Score::try_from_f64(f64::NAN).is_err());
        assert_eq!(Score::try_from_f64(3.0).unwrap().value(), 3);
    }

    #[test]
    fn test_time_of_day_format() {
        assert!(TimeOfDay::new("14:00").is_ok());
        assert!(TimeOfDay::new("23:59").is_ok());
        assert!(TimeOfDay::new("24:00").is_err());
        assert!(TimeOfDay::new("9:00").is_err());
        assert!(TimeOfDay::new("09:60").is_err());
    }

    #[test]
    fn test_money_rejects_non_positive() {
        assert!(Money::try_from_f64(0.0).is_err());
        assert!(Money::try_from_f64(-10.0).is_err());
        assert!(Money::try_from_f64(f64::INFINITY).is_err());
        assert_eq!(
            Money::try_from_f64(150.5).unwrap().as_decimal(),
            Decimal::new(15050, 2)
        );
    }

    #[test]
    fn test_date_range_matches() {
        let range = DateRange::new(
            Some(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()),
            Some(NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()),
        );
        let d = |m: u32, day: u32| NaiveDate::from_ymd_opt(2024, m, day).unwrap();
        assert!(range.matches(d(2, 1), d(2, 3)));
        assert!(!range.matches(d(2, 1), d(7, 1)));
        assert!(DateRange::default().matches(d(1, 1), d(12, 31)));
    }

    #[test]
    fn test_evaluation_type_round_trip() {
        for t in [
            EvaluationType::UserToUser,
            EvaluationType::OwnerToTenant,
            EvaluationType::TenantToSpace,
        ] {
            assert_eq!(t.as_str().parse::<EvaluationType>().unwrap(), t);
        }
    }
}
