//! Conversion of raw catalogue rows into [`Event`] values.
//!
//! Column order is fixed:
//!
//! | # | column | # | column |
//! |---|---|---|---|
//! | 0 | time | 8 | dmin |
//! | 1 | latitude | 9 | rms |
//! | 2 | longitude | 10 | net |
//! | 3 | depth (km) | 11 | id |
//! | 4 | magnitude | 12 | updated |
//! | 5 | magnitude type | 13 | place |
//! | 6 | nst | 14 | type |
//! | 7 | gap | | |

use std::ops::Range;

use chrono::{DateTime, NaiveDate, Utc};
use quakeview_types::{Event, EventMetadata, GeoPoint};

use crate::error::StoreError;

/// Number of columns every data row must provide.
pub const COLUMN_COUNT: usize = 15;

const TIME: usize = 0;
const LATITUDE: usize = 1;
const LONGITUDE: usize = 2;
const DEPTH: usize = 3;
const MAGNITUDE: usize = 4;
const MAGNITUDE_TYPE: usize = 5;
const NST: usize = 6;
const GAP: usize = 7;
const DMIN: usize = 8;
const RMS: usize = 9;
const NET: usize = 10;
const ID: usize = 11;
const UPDATED: usize = 12;
const PLACE: usize = 13;
const TYPE: usize = 14;

/// Parse a fixed-width `YYYY-MM-DD?HH:MM:SS` timestamp as UTC.
///
/// Only the first 19 characters are read, so fractional seconds and zone
/// suffixes (`.250Z`) are ignored. Separator characters are not checked;
/// every digit group must be exactly as wide as its slot.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let year = i32::try_from(digits(raw, 0..4)?).ok()?;
    let month = digits(raw, 5..7)?;
    let day = digits(raw, 8..10)?;
    let hour = digits(raw, 11..13)?;
    let minute = digits(raw, 14..16)?;
    let second = digits(raw, 17..19)?;

    NaiveDate::from_ymd_opt(year, month, day)?
        .and_hms_opt(hour, minute, second)
        .map(|naive| naive.and_utc())
}

fn digits(raw: &str, range: Range<usize>) -> Option<u32> {
    let slice = raw.as_bytes().get(range)?;
    slice.iter().try_fold(0_u32, |acc, byte| {
        let digit = char::from(*byte).to_digit(10)?;
        acc.checked_mul(10)?.checked_add(digit)
    })
}

/// Convert one data row into an [`Event`].
///
/// `row` is the 1-based row number in the file, used only for error
/// reporting.
///
/// # Errors
///
/// Returns a [`StoreError`] describing the first problem found.
pub fn event_from_row<S: AsRef<str>>(row: usize, fields: &[S]) -> Result<Event, StoreError> {
    if fields.len() < COLUMN_COUNT {
        return Err(StoreError::MissingColumns {
            row,
            expected: COLUMN_COUNT,
            found: fields.len(),
        });
    }
    let field = |idx: usize| fields.get(idx).map_or("", AsRef::as_ref);

    let time = timestamp(row, "time", field(TIME))?;
    let lat = number(row, "latitude", field(LATITUDE))?;
    let lon = number(row, "longitude", field(LONGITUDE))?;
    if !(-90.0..=90.0).contains(&lat) {
        return Err(StoreError::OutOfRange {
            row,
            column: "latitude",
            value: lat,
        });
    }
    if !(-180.0..=180.0).contains(&lon) {
        return Err(StoreError::OutOfRange {
            row,
            column: "longitude",
            value: lon,
        });
    }
    let location = GeoPoint::new(lat, lon);
    let depth_km = number(row, "depth", field(DEPTH))?;
    let magnitude = number(row, "magnitude", field(MAGNITUDE))?;

    let metadata = EventMetadata {
        magnitude_type: field(MAGNITUDE_TYPE).to_owned(),
        nst: optional_count(row, "nst", field(NST))?,
        gap: optional_number(row, "gap", field(GAP))?,
        dmin: optional_number(row, "dmin", field(DMIN))?,
        rms: optional_number(row, "rms", field(RMS))?,
        network: field(NET).to_owned(),
        id: field(ID).to_owned(),
        updated: timestamp(row, "updated", field(UPDATED))?,
        place: field(PLACE).to_owned(),
        event_type: field(TYPE).to_owned(),
    };

    Ok(Event::new(time, location, depth_km, magnitude, metadata))
}

fn timestamp(row: usize, column: &'static str, raw: &str) -> Result<DateTime<Utc>, StoreError> {
    parse_timestamp(raw.trim()).ok_or_else(|| StoreError::MalformedTimestamp {
        row,
        column,
        value: raw.to_owned(),
    })
}

fn number(row: usize, column: &'static str, raw: &str) -> Result<f64, StoreError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| StoreError::MalformedField {
            row,
            column,
            value: raw.to_owned(),
        })
}

fn optional_number(row: usize, column: &'static str, raw: &str) -> Result<Option<f64>, StoreError> {
    if raw.trim().is_empty() {
        return Ok(None);
    }
    number(row, column, raw).map(Some)
}

fn optional_count(row: usize, column: &'static str, raw: &str) -> Result<Option<u32>, StoreError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<u32>()
        .map(Some)
        .map_err(|_err| StoreError::MalformedField {
            row,
            column,
            value: raw.to_owned(),
        })
}
