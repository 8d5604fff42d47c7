//! Conversions from `xs:dateTime` and `xs:date` element text.
//!
//! EWS carries three kinds of temporal values, and they must not be mixed up:
//!
//!  - instants, written with an explicit offset or in UTC, which are shown in the caller's
//!    local time zone ([`as_local_instant`]);
//!  - calendar dates such as the start of an all-day event, whose day must not move when the
//!    offset differs from the viewer's ([`as_unbiased_calendar_date`]);
//!  - wall-clock times that the server has already expressed in the mailbox's time zone
//!    ([`as_unbiased_instant_in_zone`]).

use std::fmt;

use chrono::format::{self, Parsed, StrftimeItems};
use chrono::{
    DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, TimeZone, Utc,
};

use crate::error::{ParseError, Result};

/// Resolves naive date-times against a time zone.
///
/// Implemented for every [`chrono::TimeZone`], so [`chrono::Local`], [`chrono::Utc`] and
/// [`chrono::FixedOffset`] can be used directly.
pub trait TimeZoneResolver: fmt::Debug + Send + Sync {
    /// The instant at the given UTC date-time, expressed with this zone's offset.
    fn instant_from_utc(&self, utc: &NaiveDateTime) -> DateTime<FixedOffset>;

    /// The instant at which clocks in this zone show the given wall-clock time. For ambiguous
    /// times the earlier instant is returned; `None` if the time is skipped by a transition.
    fn instant_from_local(&self, local: &NaiveDateTime) -> Option<DateTime<FixedOffset>>;
}

impl<Tz> TimeZoneResolver for Tz
where
    Tz: TimeZone + fmt::Debug + Send + Sync,
{
    fn instant_from_utc(&self, utc: &NaiveDateTime) -> DateTime<FixedOffset> {
        self.from_utc_datetime(utc).fixed_offset()
    }

    fn instant_from_local(&self, local: &NaiveDateTime) -> Option<DateTime<FixedOffset>> {
        self.from_local_datetime(local)
            .earliest()
            .map(|dt| dt.fixed_offset())
    }
}

/// The fields of an `xs:dateTime` or `xs:date` literal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct XsDateTime {
    pub(crate) date: NaiveDate,
    pub(crate) time: NaiveTime,
    pub(crate) offset: Option<FixedOffset>,
}

impl XsDateTime {
    pub(crate) fn naive(&self) -> NaiveDateTime {
        self.date.and_time(self.time)
    }

    /// The instant this literal denotes, taking a missing offset to mean UTC.
    pub(crate) fn instant(&self) -> Option<DateTime<FixedOffset>> {
        match self.offset {
            Some(offset) => offset.from_local_datetime(&self.naive()).single(),
            None => Some(Utc.from_utc_datetime(&self.naive()).fixed_offset()),
        }
    }
}

/// `Z`, or a `+hh:mm`/`-hh:mm` offset.
fn parse_offset(text: &str) -> Option<FixedOffset> {
    if text == "Z" {
        return FixedOffset::east_opt(0);
    }
    let mut parsed = Parsed::new();
    format::parse(&mut parsed, text, StrftimeItems::new("%:z")).ok()?;
    parsed.to_fixed_offset().ok()
}

/// Split a date-time literal into its fields. Time defaults to midnight.
pub(crate) fn parse_xs_date_time(text: &str) -> Result<XsDateTime> {
    let invalid = || ParseError::DateTime(text.to_owned());

    let (date, rest) =
        NaiveDate::parse_and_remainder(text.trim(), "%Y-%m-%d").map_err(|_| invalid())?;
    let (time, rest) = match rest.strip_prefix('T') {
        Some(time) => NaiveTime::parse_and_remainder(time, "%H:%M:%S%.f")
            .or_else(|_| NaiveTime::parse_and_remainder(time, "%H:%M"))
            .map_err(|_| invalid())?,
        None => (NaiveTime::from_hms_opt(0, 0, 0).ok_or_else(invalid)?, rest),
    };
    let offset = match rest {
        "" => None,
        offset => Some(parse_offset(offset).ok_or_else(invalid)?),
    };

    Ok(XsDateTime { date, time, offset })
}

/// Interpret `text` as a server date-time and express it in `zone`.
///
/// A value without an offset is in UTC. Empty text yields `None`.
pub fn as_local_instant(
    text: &str,
    zone: &dyn TimeZoneResolver,
) -> Result<Option<DateTime<FixedOffset>>> {
    if text.trim().is_empty() {
        return Ok(None);
    }
    let instant = parse_xs_date_time(text)?
        .instant()
        .ok_or_else(|| ParseError::DateTime(text.to_owned()))?;
    Ok(Some(zone.instant_from_utc(&instant.naive_utc())))
}

/// Interpret `text` as a calendar date, ignoring any offset written with it.
///
/// `2024-01-01T00:00:00+05:00` and `2024-01-01` are both the first of January. Empty text
/// yields `None`.
pub fn as_unbiased_calendar_date(text: &str) -> Result<Option<NaiveDate>> {
    if text.trim().is_empty() {
        return Ok(None);
    }
    Ok(Some(parse_xs_date_time(text)?.date))
}

/// Interpret `text` as a wall-clock date-time in `zone`.
///
/// Any offset written with the value is ignored. Unlike the other conversions the value is
/// mandatory: empty text is an error.
pub fn as_unbiased_instant_in_zone(
    text: &str,
    zone: &dyn TimeZoneResolver,
) -> Result<DateTime<FixedOffset>> {
    if text.trim().is_empty() {
        return Err(ParseError::DateTime(text.to_owned()).into());
    }
    let naive = parse_xs_date_time(text)?.naive();
    zone.instant_from_local(&naive)
        .ok_or_else(|| ParseError::NonExistentLocalTime(text.to_owned()).into())
}

/// Format an instant the way EWS writes `xs:dateTime` values.
pub fn format_xs_date_time(value: &DateTime<FixedOffset>) -> String {
    value.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Duration, Timelike};

    fn east(hours: i32) -> FixedOffset {
        FixedOffset::east_opt(hours * 3600).unwrap()
    }

    #[test]
    fn lexes_date_times() {
        let parsed = parse_xs_date_time("2009-01-01T08:30:15.1234567Z").unwrap();
        assert_eq!(parsed.date, NaiveDate::from_ymd_opt(2009, 1, 1).unwrap());
        assert_eq!(parsed.time.hour(), 8);
        assert_eq!(parsed.time.second(), 15);
        assert_eq!(parsed.time.nanosecond(), 123_456_700);
        assert_eq!(parsed.offset, Some(east(0)));

        let parsed = parse_xs_date_time("2024-03-10-08:00").unwrap();
        assert_eq!(parsed.time, NaiveTime::from_hms_opt(0, 0, 0).unwrap());
        assert_eq!(parsed.offset, Some(FixedOffset::west_opt(8 * 3600).unwrap()));

        assert!(parse_xs_date_time("2024-13-01T00:00:00").is_err());
        assert!(parse_xs_date_time("yesterday").is_err());
        assert!(parse_xs_date_time("2024-01-01T25:00:00").is_err());
    }

    #[test]
    fn non_ascii_digits_are_rejected() {
        for text in [
            "2024-01-01T00:00:00+0\u{0665}:00",
            "2024-01-01T0\u{0665}:00:00Z",
            "\u{0662}024-01-01",
        ] {
            assert!(matches!(
                as_local_instant(text, &Utc),
                Err(crate::Error::Parse(ParseError::DateTime(_)))
            ));
            assert!(as_unbiased_calendar_date(text).is_err());
            assert!(as_unbiased_instant_in_zone(text, &Utc).is_err());
        }
    }

    #[test]
    fn minutes_without_seconds() {
        let parsed = parse_xs_date_time("2024-05-06T07:08+02:00").unwrap();
        assert_eq!(parsed.time, NaiveTime::from_hms_opt(7, 8, 0).unwrap());
        assert_eq!(parsed.offset, Some(east(2)));
    }

    #[test]
    fn local_instant_honors_offset() {
        let plain = as_local_instant("2024-01-01T00:00:00", &Utc).unwrap().unwrap();
        let biased = as_local_instant("2024-01-01T00:00:00+05:00", &Utc)
            .unwrap()
            .unwrap();
        assert_eq!(plain - biased, Duration::hours(5));
    }

    #[test]
    fn local_instant_is_expressed_in_zone() {
        let instant = as_local_instant("2024-06-01T12:00:00Z", &east(2))
            .unwrap()
            .unwrap();
        assert_eq!(instant.offset(), &east(2));
        assert_eq!(instant.hour(), 14);
    }

    #[test]
    fn calendar_date_ignores_offset() {
        let plain = as_unbiased_calendar_date("2024-01-01T00:00:00").unwrap();
        let biased = as_unbiased_calendar_date("2024-01-01T00:00:00+05:00").unwrap();
        assert_eq!(plain, biased);
        assert_eq!(plain, NaiveDate::from_ymd_opt(2024, 1, 1));

        let late = as_unbiased_calendar_date("2024-01-01T23:30:00-10:00").unwrap();
        assert_eq!(late.map(|d| d.day()), Some(1));
    }

    #[test]
    fn absent_text_is_none() {
        assert_eq!(as_local_instant("", &Utc).unwrap(), None);
        assert_eq!(as_unbiased_calendar_date("  ").unwrap(), None);
    }

    #[test]
    fn malformed_text_is_an_error() {
        assert!(as_local_instant("not a date", &Utc).is_err());
        assert!(as_unbiased_calendar_date("2024/01/01").is_err());
    }

    #[test]
    fn unbiased_instant_is_anchored_in_zone() {
        let instant = as_unbiased_instant_in_zone("2009-01-01T08:00:00", &east(-5)).unwrap();
        assert_eq!(instant.hour(), 8);
        assert_eq!(instant.offset(), &east(-5));
        assert_eq!(instant.naive_utc().hour(), 13);
    }

    #[test]
    fn unbiased_instant_is_mandatory() {
        assert!(as_unbiased_instant_in_zone("", &Utc).is_err());
        assert!(as_unbiased_instant_in_zone("08:00", &Utc).is_err());
    }

    #[test]
    fn formats_round_trip_through_lexer() {
        let value = east(1).with_ymd_and_hms(2023, 7, 4, 9, 15, 0).unwrap();
        let text = format_xs_date_time(&value);
        assert_eq!(text, "2023-07-04T09:15:00+01:00");
        assert_eq!(parse_xs_date_time(&text).unwrap().instant(), Some(value));
    }
}
