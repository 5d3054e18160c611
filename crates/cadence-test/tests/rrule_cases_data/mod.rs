use cadence_test::recurrence::{generate, import_rrule};
use cadence_test::{compact_local, date};
use chrono::{DateTime, FixedOffset, NaiveDate, TimeDelta};
use rrule::RRuleSet;

/// One rule checked against the `rrule` crate.
pub struct OracleCase {
    pub name: &'static str,
    pub tzid: &'static str,
    /// Local start of the first occurrence, `YYYYMMDDTHHMMSS`.
    pub start: &'static str,
    pub rule: &'static str,
    /// Local dates removed from both sides before comparing.
    pub excluded: &'static [&'static str],
    pub expected: Option<&'static [&'static str]>,
    pub expected_len: Option<usize>,
    pub limit: u16,
}

#[expect(clippy::too_many_lines)]
pub fn oracle_cases() -> Vec<OracleCase> {
    vec![
        OracleCase {
            name: "daily_across_dst_new_york",
            tzid: "America/New_York",
            start: "20210313T090000",
            rule: "FREQ=DAILY;COUNT=3",
            excluded: &[],
            expected: Some(&[
                "2021-03-13T09:00:00-05:00",
                "2021-03-14T09:00:00-04:00",
                "2021-03-15T09:00:00-04:00",
            ]),
            expected_len: None,
            limit: 100,
        },
        OracleCase {
            name: "daily_until_date_time",
            tzid: "Europe/Berlin",
            start: "20261020T073000",
            rule: "FREQ=DAILY;UNTIL=20261102T120000Z",
            excluded: &[],
            expected: None,
            expected_len: Some(14),
            limit: 100,
        },
        OracleCase {
            name: "weekly_basic",
            tzid: "UTC",
            start: "19970902T090000",
            rule: "FREQ=WEEKLY;COUNT=3;BYDAY=TU,TH",
            excluded: &[],
            expected: Some(&[
                "1997-09-02T09:00:00+00:00",
                "1997-09-04T09:00:00+00:00",
                "1997-09-09T09:00:00+00:00",
            ]),
            expected_len: None,
            limit: 100,
        },
        OracleCase {
            name: "weekly_tuesday_detroit",
            tzid: "America/Detroit",
            start: "20220719T120000",
            rule: "FREQ=WEEKLY;BYDAY=TU;UNTIL=20220802T180000Z",
            excluded: &[],
            expected: Some(&[
                "2022-07-19T16:00:00+00:00",
                "2022-07-26T16:00:00+00:00",
                "2022-08-02T16:00:00+00:00",
            ]),
            expected_len: None,
            limit: 100,
        },
        OracleCase {
            name: "weekly_three_days_across_dst_berlin",
            tzid: "Europe/Berlin",
            start: "20260302T183000",
            rule: "FREQ=WEEKLY;BYDAY=MO,WE,FR;COUNT=15",
            excluded: &["2026-03-11", "2026-03-30"],
            expected: None,
            expected_len: Some(13),
            limit: 100,
        },
        OracleCase {
            name: "daily_with_byday_tokyo",
            tzid: "Asia/Tokyo",
            start: "20260105T080000",
            rule: "FREQ=DAILY;BYDAY=MO,TH;COUNT=6",
            excluded: &[],
            expected: None,
            expected_len: Some(6),
            limit: 100,
        },
        OracleCase {
            name: "monthly_basic",
            tzid: "UTC",
            start: "20120101T090000",
            rule: "FREQ=MONTHLY;COUNT=3;BYMONTHDAY=1",
            excluded: &[],
            expected: Some(&[
                "2012-01-01T09:00:00+00:00",
                "2012-02-01T09:00:00+00:00",
                "2012-03-01T09:00:00+00:00",
            ]),
            expected_len: None,
            limit: 100,
        },
        OracleCase {
            name: "monthly_31st_skips_short_months",
            tzid: "America/Los_Angeles",
            start: "20220131T080000",
            rule: "FREQ=MONTHLY;BYMONTHDAY=31;COUNT=6",
            excluded: &[],
            expected: None,
            expected_len: Some(6),
            limit: 100,
        },
        OracleCase {
            name: "monthly_last_day_leap_year",
            tzid: "Europe/London",
            start: "20240131T170000",
            rule: "FREQ=MONTHLY;BYMONTHDAY=-1;COUNT=13",
            excluded: &[],
            expected: None,
            expected_len: Some(13),
            limit: 100,
        },
        OracleCase {
            name: "monthly_last_friday",
            tzid: "America/Chicago",
            start: "20220128T150000",
            rule: "FREQ=MONTHLY;BYDAY=-1FR;COUNT=12",
            excluded: &[],
            expected: None,
            expected_len: Some(12),
            limit: 100,
        },
        OracleCase {
            name: "monthly_second_and_fourth_mo_we",
            tzid: "Asia/Tokyo",
            start: "20220103T190000",
            rule: "FREQ=MONTHLY;BYDAY=2MO,2WE,4MO,4WE;COUNT=16",
            excluded: &[],
            expected: None,
            expected_len: Some(16),
            limit: 100,
        },
        OracleCase {
            name: "monthly_every_tuesday",
            tzid: "UTC",
            start: "20220104T090000",
            rule: "FREQ=MONTHLY;BYDAY=TU;UNTIL=20220630T235959Z",
            excluded: &["2022-02-01"],
            expected: None,
            expected_len: Some(25),
            limit: 100,
        },
        OracleCase {
            name: "yearly_basic",
            tzid: "UTC",
            start: "20120101T090000",
            rule: "FREQ=YEARLY;COUNT=3",
            excluded: &[],
            expected: Some(&[
                "2012-01-01T09:00:00+00:00",
                "2013-01-01T09:00:00+00:00",
                "2014-01-01T09:00:00+00:00",
            ]),
            expected_len: None,
            limit: 100,
        },
        OracleCase {
            name: "yearly_thanksgiving",
            tzid: "America/New_York",
            start: "20221124T160000",
            rule: "FREQ=YEARLY;BYMONTH=11;BYDAY=4TH;COUNT=5",
            excluded: &[],
            expected: Some(&[
                "2022-11-24T16:00:00-05:00",
                "2023-11-23T16:00:00-05:00",
                "2024-11-28T16:00:00-05:00",
                "2025-11-27T16:00:00-05:00",
                "2026-11-26T16:00:00-05:00",
            ]),
            expected_len: None,
            limit: 100,
        },
        OracleCase {
            name: "yearly_biennial_sydney",
            tzid: "Australia/Sydney",
            start: "20200704T100000",
            rule: "FREQ=YEARLY;INTERVAL=2;BYMONTH=7;BYMONTHDAY=4;COUNT=4",
            excluded: &[],
            expected: None,
            expected_len: Some(4),
            limit: 100,
        },
        OracleCase {
            name: "yearly_quarter_ends_paris",
            tzid: "Europe/Paris",
            start: "20230131T120000",
            rule: "FREQ=YEARLY;BYMONTH=1,4,7,10;BYMONTHDAY=-1;COUNT=8",
            excluded: &[],
            expected: None,
            expected_len: Some(8),
            limit: 100,
        },
        OracleCase {
            name: "yearly_every_day_in_january",
            tzid: "America/New_York",
            start: "19980101T090000",
            rule: "FREQ=YEARLY;UNTIL=20000131T140000Z;BYMONTH=1;BYDAY=SU,MO,TU,WE,TH,FR,SA",
            excluded: &[],
            expected: None,
            expected_len: Some(93),
            limit: 1000,
        },
    ]
}

/// ## Summary
/// Imports the case's rule, generates it, and checks the starts against what
/// the `rrule` crate produces for the same DTSTART and RRULE.
pub fn assert_case(case: &OracleCase) {
    let tz: chrono_tz::Tz = case
        .tzid
        .parse()
        .unwrap_or_else(|err| panic!("Case {} has a bad timezone: {err}", case.name));
    let start = compact_local(case.start);
    let dtstart = if tz == chrono_tz::UTC {
        format!("DTSTART:{}Z", case.start)
    } else {
        format!("DTSTART;TZID={}:{}", case.tzid, case.start)
    };
    let text = format!("{dtstart}\nRRULE:{}", case.rule);
    let excluded: Vec<NaiveDate> = case.excluded.iter().map(|value| date(value)).collect();

    let oracle: RRuleSet = text
        .parse()
        .unwrap_or_else(|err| panic!("Failed to parse {}: {}", case.name, err));
    let oracle_result = oracle.all(case.limit);
    assert!(!oracle_result.limited, "Case {} hit the oracle limit", case.name);
    let expected_timestamps: Vec<i64> = oracle_result
        .dates
        .iter()
        .filter(|dt| !excluded.contains(&dt.naive_local().date()))
        .map(DateTime::timestamp)
        .collect();

    let series = import_rrule(&text, start, Some(start + TimeDelta::hours(1)), tz)
        .unwrap_or_else(|err| panic!("Failed to import {}: {err}", case.name));
    let occurrences = generate(&series.rule, &excluded);
    let actual_timestamps: Vec<i64> = occurrences
        .iter()
        .map(|occurrence| occurrence.start.timestamp())
        .collect();

    assert_eq!(
        actual_timestamps, expected_timestamps,
        "Case {} diverged from rrule",
        case.name
    );
    assert!(
        occurrences
            .iter()
            .all(|occurrence| occurrence.duration() == TimeDelta::hours(1)),
        "Case {} has a wrong duration",
        case.name
    );

    if let Some(expected) = case.expected {
        let expected: Vec<i64> = expected
            .iter()
            .map(|value| parse_rfc3339(value).timestamp())
            .collect();
        assert_eq!(actual_timestamps, expected, "Case {} did not match", case.name);
    }

    if let Some(expected_len) = case.expected_len {
        assert_eq!(
            actual_timestamps.len(),
            expected_len,
            "Case {} expected {} occurrences",
            case.name,
            expected_len
        );
    }
}

fn parse_rfc3339(value: &str) -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339(value).unwrap_or_else(|err| {
        panic!("Failed to parse rfc3339 value {value}: {err}")
    })
}
