use std::collections::BTreeSet;

use chrono::{Datelike, DateTime, NaiveDate, NaiveTime, TimeDelta, TimeZone, Utc, Weekday};
use chrono_tz::Tz;

use super::*;
use crate::recurrence::model::{DayOccurrence, DayOfWeek, Month, MonthlySchedule, SlotLength};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
}

fn rule(tz: Tz, start: NaiveDate, end: NaiveDate, pattern: RecurrencePattern) -> RecurrenceRule {
    RecurrenceRule {
        timezone: tz,
        range_start: start.and_time(NaiveTime::MIN),
        range_end: end.and_time(NaiveTime::MIN),
        pattern,
    }
}

fn starts(occurrences: &[Occurrence]) -> Vec<DateTime<Utc>> {
    occurrences.iter().map(|o| o.start).collect()
}

fn daily(duration_seconds: u32) -> RecurrencePattern {
    RecurrencePattern::Daily {
        time: time(0, 0),
        duration_seconds,
    }
}

fn weekly(days: &[DayOfWeek], length: EventLength) -> RecurrencePattern {
    RecurrencePattern::Weekly {
        time: time(9, 0),
        length,
        days_of_week: days.iter().copied().collect(),
    }
}

fn monthday(days: &[i8]) -> MonthlySchedule {
    MonthlySchedule::Monthday {
        days_of_month: days.iter().copied().collect(),
    }
}

#[test]
fn daily_week_in_utc() {
    let rule = rule(Tz::UTC, date(2019, 1, 1), date(2019, 1, 7), daily(0));
    let occurrences = generate(&rule, &[]);

    assert_eq!(occurrences.len(), 7);
    assert_eq!(occurrences[0].start, utc(2019, 1, 1, 0, 0));
    assert_eq!(occurrences[6].start, utc(2019, 1, 7, 0, 0));
    assert!(occurrences.iter().all(|o| o.end == o.start));
}

#[test]
fn daily_duration_sets_end() {
    let rule = rule(Tz::UTC, date(2019, 1, 1), date(2019, 1, 2), daily(5400));
    let occurrences = generate(&rule, &[]);
    assert_eq!(occurrences.len(), 2);
    assert_eq!(occurrences[0].duration(), TimeDelta::minutes(90));
}

#[test_log::test]
fn inverted_range_is_empty_for_every_kind() {
    let patterns = vec![
        daily(60),
        weekly(&[DayOfWeek::Monday], EventLength::Duration(60)),
        RecurrencePattern::Monthly {
            time: time(9, 0),
            length: EventLength::Duration(60),
            schedule: monthday(&[1]),
        },
        RecurrencePattern::Yearly {
            time: time(9, 0),
            length: EventLength::Duration(60),
            schedule: monthday(&[1]),
            year_interval: 1,
            months: Month::ALL.into_iter().collect(),
        },
        RecurrencePattern::Consecutive {
            time: time(9, 0),
            end_time: time(12, 0),
            duration: SlotLength::minutes(30),
            buffer: SlotLength::minutes(0),
        },
        RecurrencePattern::Custom {
            dates: vec![Occurrence::new(utc(2020, 1, 5, 9, 0), utc(2020, 1, 5, 10, 0))],
        },
    ];

    for pattern in patterns {
        let inverted = rule(Tz::UTC, date(2020, 2, 1), date(2020, 1, 1), pattern.clone());
        assert!(generate(&inverted, &[]).is_empty(), "{} was not empty", inverted.kind());

        // Same day, ending two hours before it starts
        let same_day = RecurrenceRule {
            timezone: Tz::UTC,
            range_start: date(2020, 1, 5).and_time(time(12, 0)),
            range_end: date(2020, 1, 5).and_time(time(10, 0)),
            pattern,
        };
        assert!(same_day.is_inverted());
        assert!(generate(&same_day, &[]).is_empty(), "{} was not empty", same_day.kind());
    }
}

#[test]
fn generation_is_idempotent() {
    let rule = rule(
        Tz::Europe__Berlin,
        date(2022, 1, 1),
        date(2022, 12, 31),
        weekly(&[DayOfWeek::Monday, DayOfWeek::Friday], EventLength::Duration(3600)),
    );
    assert_eq!(generate(&rule, &[]), generate(&rule, &[]));
}

#[test]
fn weekly_matches_local_weekday() {
    // 23:30 on a Monday in Los Angeles is Tuesday in UTC
    let pattern = RecurrencePattern::Weekly {
        time: time(23, 30),
        length: EventLength::Duration(1800),
        days_of_week: BTreeSet::from([DayOfWeek::Monday]),
    };
    let rule = rule(Tz::America__Los_Angeles, date(2022, 3, 1), date(2022, 3, 31), pattern);
    let occurrences = generate(&rule, &[]);

    assert_eq!(occurrences.len(), 4);
    assert_eq!(occurrences[0].start, utc(2022, 3, 8, 7, 30));
    assert!(
        occurrences
            .iter()
            .all(|o| o.local_date(Tz::America__Los_Angeles).weekday() == Weekday::Mon)
    );
}

#[test]
fn weekly_follows_dst() {
    let rule = rule(
        Tz::America__New_York,
        date(2021, 3, 8),
        date(2021, 3, 16),
        weekly(&[DayOfWeek::Tuesday], EventLength::Duration(3600)),
    );
    assert_eq!(
        starts(&generate(&rule, &[])),
        vec![utc(2021, 3, 9, 14, 0), utc(2021, 3, 16, 13, 0)]
    );
}

#[test]
fn weekly_without_days_is_empty() {
    let rule = rule(
        Tz::UTC,
        date(2022, 1, 1),
        date(2022, 1, 31),
        weekly(&[], EventLength::Duration(3600)),
    );
    assert!(generate(&rule, &[]).is_empty());
}

#[test]
fn weekly_end_time_on_same_day() {
    let rule = rule(
        Tz::UTC,
        date(2022, 1, 3),
        date(2022, 1, 3),
        weekly(&[DayOfWeek::Monday], EventLength::EndTime(time(10, 15))),
    );
    let occurrences = generate(&rule, &[]);
    assert_eq!(occurrences.len(), 1);
    assert_eq!(occurrences[0].end, utc(2022, 1, 3, 10, 15));
}

#[test_log::test]
fn weekly_end_time_before_start_is_dropped() {
    let rule = rule(
        Tz::UTC,
        date(2022, 1, 3),
        date(2022, 1, 17),
        weekly(&[DayOfWeek::Monday], EventLength::EndTime(time(8, 0))),
    );
    assert!(generate(&rule, &[]).is_empty());
}

#[test]
fn monthly_weekday_combinations() {
    let pattern = RecurrencePattern::Monthly {
        time: time(18, 0),
        length: EventLength::Duration(7200),
        schedule: MonthlySchedule::Weekday {
            day_occurrences: BTreeSet::from([DayOccurrence::First, DayOccurrence::Last]),
            days_of_week: BTreeSet::from([DayOfWeek::Tuesday]),
        },
    };
    let rule = rule(Tz::UTC, date(2022, 3, 1), date(2022, 4, 30), pattern);

    assert_eq!(
        starts(&generate(&rule, &[])),
        vec![
            utc(2022, 3, 1, 18, 0),
            utc(2022, 3, 29, 18, 0),
            utc(2022, 4, 5, 18, 0),
            utc(2022, 4, 26, 18, 0),
        ]
    );
}

#[test]
fn monthly_monthday_skips_missing_days_and_clips_range() {
    let pattern = RecurrencePattern::Monthly {
        time: time(12, 0),
        length: EventLength::Duration(0),
        schedule: monthday(&[15, 31, -1]),
    };
    let rule = rule(Tz::UTC, date(2023, 1, 20), date(2023, 3, 15), pattern);

    assert_eq!(
        starts(&generate(&rule, &[])),
        vec![
            utc(2023, 1, 31, 12, 0),
            utc(2023, 2, 15, 12, 0),
            utc(2023, 2, 28, 12, 0),
            utc(2023, 3, 15, 12, 0),
        ]
    );
}

#[test]
fn yearly_interval_and_months() {
    let pattern = RecurrencePattern::Yearly {
        time: time(10, 0),
        length: EventLength::Duration(3600),
        schedule: monthday(&[1]),
        year_interval: 2,
        months: BTreeSet::from([Month::Jan, Month::Jul]),
    };
    let rule = rule(Tz::UTC, date(2020, 1, 1), date(2025, 1, 1), pattern);

    assert_eq!(
        starts(&generate(&rule, &[])),
        vec![
            utc(2020, 1, 1, 10, 0),
            utc(2020, 7, 1, 10, 0),
            utc(2022, 1, 1, 10, 0),
            utc(2022, 7, 1, 10, 0),
            utc(2024, 1, 1, 10, 0),
            utc(2024, 7, 1, 10, 0),
        ]
    );
}

#[test]
fn yearly_weekday_thanksgiving() {
    let pattern = RecurrencePattern::Yearly {
        time: time(15, 0),
        length: EventLength::Duration(3600),
        schedule: MonthlySchedule::Weekday {
            day_occurrences: BTreeSet::from([DayOccurrence::Fourth]),
            days_of_week: BTreeSet::from([DayOfWeek::Thursday]),
        },
        year_interval: 1,
        months: BTreeSet::from([Month::Nov]),
    };
    let rule = rule(Tz::UTC, date(2021, 1, 1), date(2023, 12, 31), pattern);

    assert_eq!(
        starts(&generate(&rule, &[])),
        vec![
            utc(2021, 11, 25, 15, 0),
            utc(2022, 11, 24, 15, 0),
            utc(2023, 11, 23, 15, 0),
        ]
    );
}

#[test]
fn yearly_without_months_is_empty() {
    let pattern = RecurrencePattern::Yearly {
        time: time(10, 0),
        length: EventLength::Duration(3600),
        schedule: monthday(&[1]),
        year_interval: 1,
        months: BTreeSet::new(),
    };
    let rule = rule(Tz::UTC, date(2020, 1, 1), date(2025, 1, 1), pattern);
    assert!(generate(&rule, &[]).is_empty());
}

#[test]
fn consecutive_slots_with_buffer() {
    let pattern = RecurrencePattern::Consecutive {
        time: time(9, 0),
        end_time: time(10, 0),
        duration: SlotLength::minutes(20),
        buffer: SlotLength::minutes(10),
    };
    let rule = rule(Tz::UTC, date(2022, 5, 2), date(2022, 5, 3), pattern);
    let occurrences = generate(&rule, &[]);

    assert_eq!(
        starts(&occurrences),
        vec![
            utc(2022, 5, 2, 9, 0),
            utc(2022, 5, 2, 9, 30),
            utc(2022, 5, 2, 10, 0),
            utc(2022, 5, 3, 9, 0),
            utc(2022, 5, 3, 9, 30),
            utc(2022, 5, 3, 10, 0),
        ]
    );
    assert!(occurrences.iter().all(|o| o.duration() == TimeDelta::minutes(20)));
}

#[test]
fn consecutive_zero_duration_is_empty() {
    let pattern = RecurrencePattern::Consecutive {
        time: time(9, 0),
        end_time: time(10, 0),
        duration: SlotLength::hours(0),
        buffer: SlotLength::minutes(10),
    };
    let rule = rule(Tz::UTC, date(2022, 5, 2), date(2022, 5, 3), pattern);
    assert!(generate(&rule, &[]).is_empty());
}

#[test]
fn custom_is_sorted_pass_through() {
    let later = Occurrence::new(utc(2022, 5, 9, 9, 0), utc(2022, 5, 9, 10, 0));
    let earlier = Occurrence::new(utc(2022, 5, 2, 9, 0), utc(2022, 5, 2, 10, 0));
    let pattern = RecurrencePattern::Custom {
        dates: vec![later, earlier],
    };
    let rule = rule(Tz::UTC, date(2022, 5, 1), date(2022, 5, 31), pattern);

    // Exclusions do not touch literal dates
    assert_eq!(generate(&rule, &[date(2022, 5, 2)]), vec![earlier, later]);
}

#[test_log::test]
fn excluded_dates_ignore_time_of_day() {
    let pattern = RecurrencePattern::Daily {
        time: time(23, 0),
        duration_seconds: 3600,
    };
    let rule = rule(Tz::Asia__Tokyo, date(2022, 6, 1), date(2022, 6, 3), pattern);
    let occurrences = generate(&rule, &[date(2022, 6, 2)]);

    assert_eq!(occurrences.len(), 2);
    assert!(
        occurrences
            .iter()
            .all(|o| o.local_date(Tz::Asia__Tokyo) != date(2022, 6, 2))
    );
}

#[test]
fn hook_can_drop_and_shift() {
    let rule = rule(Tz::UTC, date(2019, 1, 1), date(2019, 1, 7), daily(600));
    let occurrences = generate_with(&rule, &[], |occurrence| {
        if occurrence.start == utc(2019, 1, 3, 0, 0) {
            return None;
        }
        // Moving the first occurrence past the last must not break ordering
        if occurrence.start == utc(2019, 1, 1, 0, 0) {
            let shift = TimeDelta::days(10);
            return Some(Occurrence::new(occurrence.start + shift, occurrence.end + shift));
        }
        Some(occurrence)
    });

    assert_eq!(occurrences.len(), 6);
    assert!(occurrences.windows(2).all(|pair| pair[0] < pair[1]));
    assert_eq!(occurrences.last().map(|o| o.start), Some(utc(2019, 1, 11, 0, 0)));
}

#[test]
fn included_dates_use_rule_time() {
    let rule = rule(
        Tz::America__New_York,
        date(2022, 1, 1),
        date(2022, 1, 31),
        weekly(&[DayOfWeek::Monday], EventLength::Duration(3600)),
    );
    let included = included_occurrences(&rule, &[date(2022, 2, 15)]);
    assert_eq!(
        included,
        vec![Occurrence::new(utc(2022, 2, 15, 14, 0), utc(2022, 2, 15, 15, 0))]
    );
}

#[test]
fn included_dates_for_custom_follow_first_entry() {
    let first = Occurrence::new(utc(2022, 5, 2, 9, 0), utc(2022, 5, 2, 9, 45));
    let rule = rule(
        Tz::UTC,
        date(2022, 5, 1),
        date(2022, 5, 31),
        RecurrencePattern::Custom { dates: vec![first] },
    );
    let included = included_occurrences(&rule, &[date(2022, 6, 1)]);
    assert_eq!(
        included,
        vec![Occurrence::new(utc(2022, 6, 1, 9, 0), utc(2022, 6, 1, 9, 45))]
    );

    let empty = RecurrenceRule {
        pattern: RecurrencePattern::Custom { dates: Vec::new() },
        ..rule
    };
    assert!(included_occurrences(&empty, &[date(2022, 6, 1)]).is_empty());
}

#[test_log::test]
fn expander_merges_and_caps() {
    let mut series = SeriesDocument::new(rule(Tz::UTC, date(2019, 1, 1), date(2019, 1, 7), daily(0)));
    series.excluded_dates = vec![date(2019, 1, 2)];
    series.included_dates = vec![date(2019, 1, 10)];

    let full = Expander::new(100).expand(&series);
    assert_eq!(full.occurrences.len(), 7);
    assert!(!full.truncated);
    assert_eq!(full.occurrences.last().map(|o| o.start), Some(utc(2019, 1, 10, 0, 0)));

    let capped = Expander::new(3).expand(&series);
    assert_eq!(capped.occurrences.len(), 3);
    assert!(capped.truncated);
    assert_eq!(capped.occurrences.as_slice(), &full.occurrences[..3]);
}

#[test]
fn generate_first_matches_prefix_of_full_generation() {
    let rule = rule(
        Tz::Europe__Berlin,
        date(2022, 1, 1),
        date(2022, 12, 31),
        weekly(&[DayOfWeek::Monday, DayOfWeek::Friday], EventLength::Duration(3600)),
    );
    let excluded = [date(2022, 1, 3), date(2022, 3, 28)];

    let full = generate(&rule, &excluded);
    let first = generate_first(&rule, &excluded, 20);
    assert_eq!(first.as_slice(), &full[..20]);
    assert_eq!(generate_first(&rule, &excluded, usize::MAX), full);
}

#[test_log::test]
fn expander_stops_early_on_long_ranges() {
    // A century of daily 15 minute slots would be millions of occurrences
    let series = SeriesDocument::new(rule(
        Tz::UTC,
        date(2000, 1, 1),
        date(2099, 12, 31),
        RecurrencePattern::Consecutive {
            time: time(0, 0),
            end_time: time(23, 45),
            duration: SlotLength::minutes(15),
            buffer: SlotLength::minutes(0),
        },
    ));

    let expansion = Expander::new(10).expand(&series);
    assert!(expansion.truncated);
    assert_eq!(expansion.occurrences.len(), 10);
    assert_eq!(expansion.occurrences[0].start, utc(2000, 1, 1, 0, 0));
    assert_eq!(expansion.occurrences[9].start, utc(2000, 1, 1, 2, 15));
}
