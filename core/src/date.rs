//! Parsing of the date strings stored on lots, records, purchases and actors.
//!
//! Dates are kept as the strings the UI wrote (`2024-03-01`, occasionally a
//! full `2024-03-01T08:30:00Z` timestamp). Aggregations only need two things
//! from them: a chronological sort key and the calendar month they fall in.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveTime};
use nom::{
    branch::alt,
    bytes::complete::take_while_m_n,
    character::complete::{char, digit1, one_of},
    combinator::{all_consuming, map_opt, map_res, opt, value},
    IResult, Parser,
};
use serde::Deserialize;

use crate::error::DateError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MonthLocale {
    /// `ene 2024`, the short Spanish form the dashboard has always shown.
    #[default]
    Es,
    /// `Jan 2024`.
    En,
}

const MONTHS_ES: [&str; 12] = [
    "ene", "feb", "mar", "abr", "may", "jun", "jul", "ago", "sept", "oct", "nov", "dic",
];

const MONTHS_EN: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Label used for dates that cannot be parsed.
pub const INVALID_DATE_LABEL: &str = "Invalid Date";

impl MonthLocale {
    /// Month and year of `date` as written, ignoring any offset.
    pub fn month_label<D: Datelike>(&self, date: &D) -> String {
        let names = match self {
            MonthLocale::Es => &MONTHS_ES,
            MonthLocale::En => &MONTHS_EN,
        };
        format!("{} {}", names[date.month0() as usize], date.year())
    }
}

/// Parse a stored date string. Plain dates are read as midnight UTC.
pub fn parse(input: &str) -> Result<DateTime<FixedOffset>, DateError> {
    let trimmed = input.trim();
    match all_consuming(timestamp).parse(trimmed) {
        Ok((_, parsed)) => Ok(parsed),
        Err(_) => Err(range_error(trimmed)
            .unwrap_or_else(|| DateError::Malformed(input.to_string()))),
    }
}

/// Month label for a stored date, or [`INVALID_DATE_LABEL`].
pub fn month_label(input: &str, locale: MonthLocale) -> String {
    match parse(input) {
        Ok(parsed) => locale.month_label(&parsed),
        Err(_) => INVALID_DATE_LABEL.to_string(),
    }
}

/// Sort key: parseable dates in chronological order, unparseable ones after.
pub fn sort_key(input: &str) -> (bool, i64) {
    match parse(input) {
        Ok(parsed) => (false, parsed.timestamp()),
        Err(_) => (true, 0),
    }
}

fn range_error(input: &str) -> Option<DateError> {
    let (_, (year, month, day)) = date_fields(input).ok()?;
    let year = year as i32;
    match NaiveDate::from_ymd_opt(year, month, day) {
        Some(_) => None,
        None => Some(DateError::OutOfRange { year, month, day }),
    }
}

fn number<'a>(
    digits: usize,
) -> impl Parser<&'a str, Output = u32, Error = nom::error::Error<&'a str>> {
    map_res(
        take_while_m_n(digits, digits, |c: char| c.is_ascii_digit()),
        |s: &str| s.parse::<u32>(),
    )
}

fn date_fields(input: &str) -> IResult<&str, (u32, u32, u32)> {
    let (input, (year, _, month, _, day)) =
        (number(4), char('-'), number(2), char('-'), number(2)).parse(input)?;
    Ok((input, (year, month, day)))
}

fn calendar_date(input: &str) -> IResult<&str, NaiveDate> {
    map_opt(date_fields, |(year, month, day)| {
        NaiveDate::from_ymd_opt(year as i32, month, day)
    })
    .parse(input)
}

/// Fractional seconds are accepted and dropped.
fn time_of_day(input: &str) -> IResult<&str, NaiveTime> {
    let (input, _) = one_of("T ").parse(input)?;
    map_opt(
        (
            number(2),
            char(':'),
            number(2),
            opt((char(':'), number(2), opt((char('.'), digit1)))),
        ),
        |(hour, _, minute, second)| {
            let second = second.map(|(_, s, _)| s).unwrap_or(0);
            NaiveTime::from_hms_opt(hour, minute, second)
        },
    )
    .parse(input)
}

fn utc_offset(input: &str) -> IResult<&str, FixedOffset> {
    alt((
        map_opt(value(0, char('Z')), FixedOffset::east_opt),
        map_opt(
            (one_of("+-"), number(2), opt(char(':')), number(2)),
            |(sign, hours, _, minutes)| {
                if hours > 23 || minutes > 59 {
                    return None;
                }
                let seconds = (hours * 3600 + minutes * 60) as i32;
                FixedOffset::east_opt(if sign == '-' { -seconds } else { seconds })
            },
        ),
    ))
    .parse(input)
}

fn timestamp(input: &str) -> IResult<&str, DateTime<FixedOffset>> {
    map_opt(
        (calendar_date, opt((time_of_day, opt(utc_offset)))),
        |(date, time)| {
            let (time, offset) = match time {
                Some((time, offset)) => (time, offset),
                None => (NaiveTime::from_hms_opt(0, 0, 0)?, None),
            };
            let offset = offset.or_else(|| FixedOffset::east_opt(0))?;
            date.and_time(time).and_local_timezone(offset).single()
        },
    )
    .parse(input)
}
