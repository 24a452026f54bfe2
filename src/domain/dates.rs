// src/domain/dates.rs

use chrono::{DateTime, Datelike, Days, FixedOffset, NaiveDate, Utc};

/// Unix timestamp (seconds) rendered in the utility's local offset.
pub fn to_local(ts: i64, offset: FixedOffset) -> DateTime<FixedOffset> {
    DateTime::<Utc>::from_timestamp(ts, 0)
        .unwrap_or_default()
        .with_timezone(&offset)
}

/// Calendar date of a timestamp in the local offset.
pub fn local_date(ts: i64, offset: FixedOffset) -> NaiveDate {
    to_local(ts, offset).date_naive()
}

/// First second of `date` (local midnight) as a unix timestamp.
pub fn local_midnight(date: NaiveDate, offset: FixedOffset) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp())
        .unwrap_or_default()
        - i64::from(offset.local_minus_utc())
}

/// Local midnight of the day after `date`; the exclusive bound for "on or before `date`".
pub fn local_end_of_day(date: NaiveDate, offset: FixedOffset) -> i64 {
    let next = date.checked_add_days(Days::new(1)).unwrap_or(date);
    local_midnight(next, offset)
}

/// (year, month) of a timestamp in the local offset.
pub fn local_month(ts: i64, offset: FixedOffset) -> (i32, u32) {
    let d = local_date(ts, offset);
    (d.year(), d.month())
}
