//! Recurrence rules for repeating schedulable items.
//!
//! A rule knows how to advance a due moment by exactly one period.
//! Weekly advancement lands on the same weekday by construction; monthly
//! advancement clamps to the last day of shorter target months
//! (Jan 31 -> Feb 28/29).

use chrono::{DateTime, Duration, Months, Utc};
use serde::{Deserialize, Serialize};

/// How often a schedulable item repeats.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RecurrenceRule {
    /// One-off item, never repeats.
    None,
    Daily,
    Weekly,
    Monthly,
}

impl Default for RecurrenceRule {
    fn default() -> Self {
        RecurrenceRule::None
    }
}

impl RecurrenceRule {
    /// Advance `from` by one period.
    ///
    /// Returns `None` for the `None` rule, or when the result would fall
    /// outside chrono's representable range. For every representable input
    /// the result is strictly greater than `from`.
    pub fn next_occurrence(&self, from: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            RecurrenceRule::None => None,
            RecurrenceRule::Daily => from.checked_add_signed(Duration::days(1)),
            RecurrenceRule::Weekly => from.checked_add_signed(Duration::days(7)),
            RecurrenceRule::Monthly => from.checked_add_months(Months::new(1)),
        }
    }

    pub fn is_recurring(&self) -> bool {
        !matches!(self, RecurrenceRule::None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, TimeZone, Weekday};
    use proptest::prelude::*;

    fn date(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 9, 30, 0).unwrap()
    }

    #[test]
    fn none_rule_never_advances() {
        assert_eq!(RecurrenceRule::None.next_occurrence(date(2025, 1, 1)), None);
        assert!(!RecurrenceRule::None.is_recurring());
    }

    #[test]
    fn daily_adds_one_day() {
        let next = RecurrenceRule::Daily.next_occurrence(date(2025, 1, 1)).unwrap();
        assert_eq!(next, date(2025, 1, 2));
    }

    #[test]
    fn weekly_lands_on_same_weekday() {
        let from = date(2025, 1, 1); // a Wednesday
        assert_eq!(from.weekday(), Weekday::Wed);
        let next = RecurrenceRule::Weekly.next_occurrence(from).unwrap();
        assert_eq!(next, date(2025, 1, 8));
        assert_eq!(next.weekday(), Weekday::Wed);
    }

    #[test]
    fn monthly_clamps_to_short_month() {
        // Non-leap year: Jan 31 -> Feb 28.
        let next = RecurrenceRule::Monthly.next_occurrence(date(2025, 1, 31)).unwrap();
        assert_eq!(next, date(2025, 2, 28));

        // Leap year: Jan 31 -> Feb 29.
        let next = RecurrenceRule::Monthly.next_occurrence(date(2024, 1, 31)).unwrap();
        assert_eq!(next, date(2024, 2, 29));
    }

    #[test]
    fn monthly_keeps_day_when_it_exists() {
        let next = RecurrenceRule::Monthly.next_occurrence(date(2025, 3, 15)).unwrap();
        assert_eq!(next, date(2025, 4, 15));
    }

    fn recurring_rule() -> impl Strategy<Value = RecurrenceRule> {
        prop_oneof![
            Just(RecurrenceRule::Daily),
            Just(RecurrenceRule::Weekly),
            Just(RecurrenceRule::Monthly),
        ]
    }

    proptest! {
        // advance(d) > d for every non-None rule.
        #[test]
        fn next_occurrence_is_strictly_later(
            rule in recurring_rule(),
            secs in 0i64..4_000_000_000,
        ) {
            let from = DateTime::<Utc>::from_timestamp(secs, 0).unwrap();
            let next = rule.next_occurrence(from).unwrap();
            prop_assert!(next > from);
        }
    }
}
