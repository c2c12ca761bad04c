//! Property-based tests for spend windows.

use chrono::{DateTime, Datelike, Duration, Utc, Weekday};
use proptest::prelude::*;

use super::window::{SpendPeriod, SpendWindow};

/// Instants between 1990 and 2100, millisecond resolution.
fn arb_instant() -> impl Strategy<Value = DateTime<Utc>> {
    (631_152_000_000i64..4_102_444_800_000i64)
        .prop_map(|millis| DateTime::from_timestamp_millis(millis).unwrap())
}

fn arb_accumulating_period() -> impl Strategy<Value = SpendPeriod> {
    prop_oneof![
        Just(SpendPeriod::Daily),
        Just(SpendPeriod::Weekly),
        Just(SpendPeriod::Monthly),
        Just(SpendPeriod::Yearly),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Every window contains its anchor and is well ordered.
    #[test]
    fn prop_window_contains_anchor(anchor in arb_instant(), period in arb_accumulating_period()) {
        let window = SpendWindow::compute(anchor, period);
        prop_assert!(window.start <= window.end);
        prop_assert!(window.contains(anchor));
    }

    /// Windows tile time: the instant after `end` starts the next window.
    #[test]
    fn prop_windows_are_contiguous(anchor in arb_instant(), period in arb_accumulating_period()) {
        let window = SpendWindow::compute(anchor, period);
        let next = SpendWindow::compute(window.end + Duration::milliseconds(1), period);
        prop_assert_eq!(next.start, window.end + Duration::milliseconds(1));
    }

    /// Any instant inside a window maps back to the same window.
    #[test]
    fn prop_window_is_stable(anchor in arb_instant(), period in arb_accumulating_period()) {
        let window = SpendWindow::compute(anchor, period);
        prop_assert_eq!(SpendWindow::compute(window.start, period), window);
        prop_assert_eq!(SpendWindow::compute(window.end, period), window);
    }

    /// Weekly windows always run Monday to Sunday.
    #[test]
    fn prop_weekly_runs_monday_to_sunday(anchor in arb_instant()) {
        let window = SpendWindow::compute(anchor, SpendPeriod::Weekly);
        prop_assert_eq!(window.start.weekday(), Weekday::Mon);
        prop_assert_eq!(window.end.weekday(), Weekday::Sun);
        prop_assert_eq!((window.end.date_naive() - window.start.date_naive()).num_days(), 6);
    }

    /// Monthly windows end the day before the next month's first day.
    #[test]
    fn prop_monthly_ends_on_last_day(anchor in arb_instant()) {
        let window = SpendWindow::compute(anchor, SpendPeriod::Monthly);
        prop_assert_eq!(window.start.day(), 1);
        prop_assert_eq!(window.start.month(), anchor.month());
        prop_assert_eq!((window.end + Duration::milliseconds(1)).day(), 1);
    }
}
