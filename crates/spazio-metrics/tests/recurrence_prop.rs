//! Property tests for the recurring-reservation expander.

use chrono::{Duration, NaiveDate};
use proptest::prelude::*;
use spazio_metrics::domain::types::{Money, RecurrenceKind};
use spazio_metrics::domain::RecurrenceSchedule;

fn base_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

prop_compose! {
    fn arb_schedule()(
        start_offset in 0i64..730,
        stay_days in 0i64..=3,
        span_days in 1i64..=365,
        weekly in any::<bool>(),
    ) -> RecurrenceSchedule {
        let start = base_date() + Duration::days(start_offset);
        let end = start + Duration::days(stay_days);
        let kind = if weekly {
            RecurrenceKind::Weekly
        } else {
            RecurrenceKind::Monthly
        };
        // Keep recurrence_end strictly after the stay end and within the cap
        let recurrence_end = start + Duration::days(span_days.max(stay_days + 1));
        RecurrenceSchedule::new(start, end, kind, recurrence_end).unwrap()
    }
}

proptest! {
    #[test]
    fn first_instance_is_the_request_itself(
        start_offset in 0i64..730,
        stay_days in 0i64..=3,
        span_days in 1i64..=365,
        weekly in any::<bool>(),
    ) {
        let start = base_date() + Duration::days(start_offset);
        let end = start + Duration::days(stay_days);
        let kind = if weekly {
            RecurrenceKind::Weekly
        } else {
            RecurrenceKind::Monthly
        };
        let schedule = RecurrenceSchedule::new(
            start,
            end,
            kind,
            start + Duration::days(span_days.max(stay_days + 1)),
        ).unwrap();
        let instances = schedule.instances();
        prop_assert!(!instances.is_empty());
        prop_assert_eq!(instances[0], (start, end));
    }

    #[test]
    fn no_instance_starts_past_the_recurrence_end(schedule in arb_schedule()) {
        for (start, _) in schedule.instances() {
            prop_assert!(start <= schedule.recurrence_end());
        }
    }

    #[test]
    fn instances_are_strictly_ordered(schedule in arb_schedule()) {
        let instances = schedule.instances();
        for pair in instances.windows(2) {
            prop_assert!(pair[0].0 < pair[1].0);
        }
    }

    #[test]
    fn weekly_instances_are_seven_days_apart(
        start_offset in 0i64..730,
        span_days in 1i64..=365,
    ) {
        let start = base_date() + Duration::days(start_offset);
        let schedule = RecurrenceSchedule::new(
            start,
            start,
            RecurrenceKind::Weekly,
            start + Duration::days(span_days),
        ).unwrap();
        let instances = schedule.instances();
        for (i, (instance_start, instance_end)) in instances.iter().enumerate() {
            prop_assert_eq!(*instance_start, start + Duration::days(7 * i as i64));
            prop_assert_eq!(instance_end, instance_start);
        }
        prop_assert_eq!(instances.len() as i64, span_days / 7 + 1);
    }

    #[test]
    fn series_total_is_count_times_base(schedule in arb_schedule()) {
        let base = Money::try_from_f64(120.5).unwrap();
        let expected = base.multiply(schedule.instance_count());
        prop_assert_eq!(schedule.series_total(base), expected);
    }

    #[test]
    fn recurrence_end_not_after_stay_end_is_rejected(
        start_offset in 0i64..730,
        stay_days in 0i64..=3,
        backwards in 0i64..=30,
    ) {
        let start = base_date() + Duration::days(start_offset);
        let end = start + Duration::days(stay_days);
        let result = RecurrenceSchedule::new(
            start,
            end,
            RecurrenceKind::Weekly,
            end - Duration::days(backwards),
        );
        prop_assert!(result.is_err());
    }

    #[test]
    fn spans_past_one_year_are_rejected(
        start_offset in 0i64..730,
        extra in 1i64..=100,
    ) {
        let start = base_date() + Duration::days(start_offset);
        let result = RecurrenceSchedule::new(
            start,
            start,
            RecurrenceKind::Monthly,
            start + Duration::days(365 + extra),
        );
        prop_assert!(result.is_err());
    }
}
